//! Database layer for data persistence and access.
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (business rules, status guards)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries per entity)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │   Engine    │  (db::engine - ids, filters, pages, masks, transitions)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`]: the persistence pattern shared by every entity table
//! - [`handlers`]: repository implementations
//! - [`models`]: request and response records per entity
//! - [`errors`]: store error type and its coarse [`errors::ErrorKind`]
//!
//! Migrations live in `migrations/` and are applied through [`crate::migrator`].

pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
