//! Database record types and repository request/response structs.
//!
//! Create requests carry identifiers already allocated by the caller. Responses expose only
//! the external id; the snowflake `internal_id` stays inside the repositories.

pub mod drivers;
pub mod users;
pub mod vehicle_types;
pub mod vehicles;
