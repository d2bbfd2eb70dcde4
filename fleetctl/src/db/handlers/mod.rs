//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed connection (or transaction) and implements the
//! [`Repository`] trait for its entity, plus entity-specific lookups. Every write that touches
//! more than one statement runs in its own transaction; status writes go through
//! [`crate::db::engine::lifecycle`].
//!
//! # Available Repositories
//!
//! - [`Vehicles`]: fleet vehicles
//! - [`VehicleTypes`]: vehicle type reference data
//! - [`Drivers`]: driver records
//! - [`Certifications`]: driver certifications, listed per driver
//! - [`Users`]: user accounts and their authentication method
//!
//! ```ignore
//! use fleetctl::db::handlers::{Repository, Vehicles};
//!
//! let mut conn = pool.acquire().await?;
//! let mut repo = Vehicles::new(&mut conn);
//! let page = repo.list(&VehicleFilter::default(), &PageRequest::default()).await?;
//! ```

pub mod certifications;
pub mod drivers;
pub mod repository;
pub mod users;
pub mod vehicle_types;
pub mod vehicles;

pub use certifications::{Certifications, DriverCertificationFilter};
pub use drivers::Drivers;
pub use repository::Repository;
pub use users::Users;
pub use vehicle_types::VehicleTypes;
pub use vehicles::Vehicles;
