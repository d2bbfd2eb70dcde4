//! # fleetctl: fleet record management
//!
//! `fleetctl` keeps the records behind a transport fleet: drivers and their licences and
//! certifications, vehicles and vehicle types, and the user accounts drivers belong to. Every
//! entity is stored through one engine that handles id allocation, filtered listing, cursor
//! pagination, field-mask updates, guarded status transitions and soft deletion.
//!
//! ## Architecture
//!
//! - **HTTP layer** ([`api`]): Axum handlers under `/api/v1`, documented by [`openapi::ApiDoc`]
//! - **Services** ([`services`]): business rules that need more than one read
//! - **Database layer** ([`db`]): repositories over PostgreSQL and the shared engine
//! - **Errors** ([`errors`]): one error type for handlers, mapped onto HTTP status codes
//!
//! ## Getting started
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/fleet fleetctl -f config.yaml
//! ```
//!
//! ```no_run
//! # use fleetctl::{Application, Config};
//! # async fn run(config: Config) -> anyhow::Result<()> {
//! let app = Application::new(config).await?;
//! app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod services;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use db::engine::IdAllocator;
use openapi::ApiDoc;

/// Application state shared across all request handlers.
///
/// - `db`: PostgreSQL connection pool
/// - `config`: configuration loaded from file and environment
/// - `ids`: the process-wide id allocator, seeded with the configured node id
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .ids(Arc::new(IdAllocator::new(config.node_id)?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub ids: Arc<IdAllocator>,
}

/// Get the fleetctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect to the database and apply pending migrations.
pub async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.acquire_timeout)
        .connect(&config.database_url)
        .await?;

    migrator().run(&pool).await?;
    debug!("Database migrations applied");
    Ok(pool)
}

async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Build the application router with every route and middleware layer.
pub fn build_router(state: AppState) -> Router {
    use api::handlers::{drivers, users, vehicles};

    let api_routes = Router::new()
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/authenticate", post(users::authenticate))
        .route("/users/by-sso/{sso_id}", get(users::get_user_by_sso_id))
        .route(
            "/users/{id}",
            get(users::get_user).patch(users::update_user).delete(users::delete_user),
        )
        .route("/users/{id}/status", patch(users::update_user_status))
        .route("/users/{id}/driver", get(users::get_user_driver))
        // Vehicles
        .route(
            "/transport/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route("/transport/vehicles/available", get(vehicles::list_available_vehicles))
        .route(
            "/transport/vehicles/{id}",
            get(vehicles::get_vehicle)
                .patch(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route("/transport/vehicles/{id}/status", patch(vehicles::update_vehicle_status))
        .route(
            "/transport/vehicle-types",
            get(vehicles::list_vehicle_types).post(vehicles::create_vehicle_type),
        )
        .route("/transport/vehicle-types/{id}/vehicles", get(vehicles::list_vehicles_by_type))
        // Drivers
        .route("/transport/drivers", get(drivers::list_drivers).post(drivers::create_driver))
        .route("/transport/drivers/active", get(drivers::list_active_drivers))
        .route("/transport/drivers/expiring-licenses", get(drivers::list_expiring_licenses))
        .route(
            "/transport/drivers/{id}",
            get(drivers::get_driver)
                .patch(drivers::update_driver)
                .delete(drivers::delete_driver),
        )
        .route("/transport/drivers/{id}/status", patch(drivers::update_driver_status))
        .route("/transport/drivers/{id}/verify-license", post(drivers::verify_license))
        .route(
            "/transport/drivers/{id}/certifications",
            get(drivers::list_certifications).post(drivers::add_certification),
        )
        // Certifications
        .route(
            "/transport/certifications/expired",
            get(drivers::list_expired_certifications),
        )
        .route(
            "/transport/certifications/{id}",
            patch(drivers::update_certification).delete(drivers::delete_certification),
        );

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/readyz", get(readiness))
        .nest("/api/v1", api_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    if let Some(timeout) = state.config.request_timeout {
        router = router.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout));
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// A configured server, ready to bind.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Connect to the database, migrate it and build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting fleetctl with configuration: {:#?}", config);
        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Build the application around an existing, already migrated pool.
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let ids = IdAllocator::new(config.node_id)?;
        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .ids(Arc::new(ids))
            .build();

        Ok(Self {
            router: build_router(state),
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "fleetctl listening on http://{}, API docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::StatusCode;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_health_and_readiness(pool: PgPool) {
        let server = create_test_app(pool).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        server.get("/readyz").await.assert_status_ok();
        server.get("/docs").await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_readiness_fails_without_database(pool: PgPool) {
        pool.close().await;
        let server = super::Application::new_with_pool(create_test_config(), pool)
            .unwrap()
            .into_test_server();

        server.get("/readyz").await.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        server.get("/healthz").await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_error_taxonomy_over_http(pool: PgPool) {
        let server = create_test_app(pool).await;

        // malformed id in the path never reaches the store
        server
            .get("/api/v1/transport/vehicles/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .get(&format!("/api/v1/transport/drivers/{}", uuid::Uuid::new_v4()))
            .await;
        response.assert_status_not_found();

        server
            .get("/api/v1/users")
            .add_query_param("page_token", "%%%")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_request_timeout_answers_408(pool: PgPool) {
        // a single-connection pool whose only connection is held keeps /readyz waiting
        let starved = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect_with((*pool.connect_options()).clone())
            .await
            .unwrap();
        let _held = starved.acquire().await.unwrap();

        let mut config = create_test_config();
        config.request_timeout = Some(std::time::Duration::from_millis(100));
        let server = super::Application::new_with_pool(config, starved.clone())
            .unwrap()
            .into_test_server();

        server.get("/readyz").await.assert_status(StatusCode::REQUEST_TIMEOUT);
        server.get("/healthz").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_invalid_node_id_is_rejected() {
        let mut config = create_test_config();
        config.node_id = 5000;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        assert!(super::Application::new_with_pool(config, pool).is_err());
    }
}
