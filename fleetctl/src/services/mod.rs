//! Business rules layered above the repositories.
//!
//! Repositories enforce what the schema and the engine can see on their own. Services add the
//! rules that need more than one read: reference checks, friendly duplicate detection ahead of
//! the unique constraint, and status guards that depend on other columns. Every status change
//! reads the current status, checks the edge and the guard, then writes with a compare-and-set
//! against the status it checked.

use sqlx::{PgPool, Postgres, pool::PoolConnection};

use crate::errors::{Error, Result};

pub mod drivers;
pub mod users;
pub mod vehicles;

pub use drivers::DriverService;
pub use users::UserService;
pub use vehicles::VehicleService;

async fn acquire(db: &PgPool) -> Result<PoolConnection<Postgres>> {
    db.acquire().await.map_err(|e| Error::Database(e.into()))
}

fn not_found(resource: &str, id: impl ToString) -> Error {
    Error::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}
