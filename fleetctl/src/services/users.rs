//! User accounts and password sign-in.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use super::{acquire, not_found};
use crate::AppState;
use crate::api::models::users::{Credentials, UserCreate, UserUpdate};
use crate::auth::password;
use crate::db::engine::{IdAllocator, Page, PageRequest, Presence, check_transition};
use crate::db::errors::DbError;
use crate::db::handlers::{Drivers, Repository, Users};
use crate::db::models::drivers::DriverDBResponse;
use crate::db::models::users::{AuthMethod, UserCreateDBRequest, UserDBResponse, UserField, UserFilter, UserStatus};
use crate::errors::{Error, Result};
use crate::types::{UserId, abbrev_uuid};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    }
}

pub struct UserService<'a> {
    db: &'a PgPool,
    ids: &'a IdAllocator,
}

impl<'a> UserService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            ids: &state.ids,
        }
    }

    /// Register a user with exactly one authentication method. Passwords are hashed here and
    /// never stored or returned in plaintext.
    #[instrument(skip_all, err)]
    pub async fn create(&self, request: UserCreate) -> Result<UserDBResponse> {
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();
        let email = normalize_email(&request.email);
        if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(DbError::invalid_argument("first_name, last_name and email are required").into());
        }

        let auth = match (request.password, request.sso_id) {
            (Some(password), None) if !password.is_empty() => {
                let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password hashing task: {e}"),
                    })??;
                AuthMethod::Password(hash)
            }
            (None, Some(sso_id)) if !sso_id.trim().is_empty() => AuthMethod::Sso(sso_id.trim().to_string()),
            _ => {
                return Err(DbError::invalid_argument("exactly one of password and sso_id is required").into());
            }
        };

        let mut conn = acquire(self.db).await?;
        let mut users = Users::new(&mut conn);

        if users.get_by_email(&email).await?.is_some() {
            return Err(DbError::already_exists("users", "users_email_unique", "email is already in use").into());
        }
        if let Some(sso_id) = auth.sso_id() {
            if users.get_by_sso_id(sso_id).await?.is_some() {
                return Err(DbError::already_exists("users", "users_sso_id_unique", "sso id is already linked").into());
            }
        }

        let (internal_id, external_id) = self.ids.allocate()?;
        let user = users
            .create(&UserCreateDBRequest {
                internal_id,
                external_id,
                first_name,
                last_name,
                email,
                auth,
                terms_accepted_at: request.terms_accepted.then(Utc::now),
            })
            .await?;

        info!(user_id = %abbrev_uuid(&user.id), auth = user.auth.kind(), "User created");
        Ok(user)
    }

    /// Password sign-in. Unknown emails, SSO accounts, wrong passwords and accounts that are
    /// not active all fail the same way.
    #[instrument(skip_all, err)]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<UserDBResponse> {
        let mut conn = acquire(self.db).await?;
        let user = Users::new(&mut conn)
            .get_by_email(&normalize_email(&credentials.email))
            .await?
            .ok_or_else(invalid_credentials)?;

        let AuthMethod::Password(hash) = &user.auth else {
            return Err(invalid_credentials());
        };

        let password = credentials.password;
        let hash = hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })??;

        if !is_valid || user.status != UserStatus::Active {
            return Err(invalid_credentials());
        }
        Ok(user)
    }

    pub async fn get(&self, id: UserId) -> Result<UserDBResponse> {
        let mut conn = acquire(self.db).await?;
        Users::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("User", id))
    }

    pub async fn get_by_sso_id(&self, sso_id: &str) -> Result<UserDBResponse> {
        let mut conn = acquire(self.db).await?;
        Users::new(&mut conn)
            .get_by_sso_id(sso_id)
            .await?
            .ok_or_else(|| not_found("User with SSO identity", sso_id))
    }

    /// The driver record belonging to a user.
    pub async fn get_driver(&self, id: UserId) -> Result<DriverDBResponse> {
        let mut conn = acquire(self.db).await?;
        Users::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("User", id))?;
        Drivers::new(&mut conn)
            .get_by_user_id(id)
            .await?
            .ok_or_else(|| not_found("Driver for user", id))
    }

    pub async fn list(&self, filter: &UserFilter, page: &PageRequest) -> Result<Page<UserDBResponse>> {
        let mut conn = acquire(self.db).await?;
        Ok(Users::new(&mut conn).list(filter, page).await?)
    }

    #[instrument(skip(self, update), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<UserDBResponse> {
        let mut request = update.into_db_request()?;
        request.email = request.email.as_deref().map(normalize_email);

        let mut conn = acquire(self.db).await?;
        let mut users = Users::new(&mut conn);

        let existing = users.get_by_id(id).await?.ok_or_else(|| not_found("User", id))?;

        let email_change = request
            .email
            .as_deref()
            .filter(|email| *email != existing.email && request.mask.includes(UserField::Email, request.email.is_present()));
        if let Some(email) = email_change {
            if users.get_by_email(email).await?.is_some_and(|other| other.id != id) {
                return Err(DbError::already_exists("users", "users_email_unique", "email is already in use").into());
            }
        }

        Ok(users.update(id, &request).await?)
    }

    #[instrument(skip(self, reason), fields(user_id = %abbrev_uuid(&id), to = %to), err)]
    pub async fn update_status(&self, id: UserId, to: UserStatus, reason: &str) -> Result<UserDBResponse> {
        let mut conn = acquire(self.db).await?;
        let mut users = Users::new(&mut conn);

        let current = users.get_by_id(id).await?.ok_or_else(|| not_found("User", id))?;
        check_transition(current.status, to)?;

        let user = users.update_status(id, current.status, to).await?;
        info!(from = %current.status, to = %to, reason, "User status updated");
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        let mut conn = acquire(self.db).await?;
        Users::new(&mut conn).delete(id).await?;
        Ok(())
    }
}
