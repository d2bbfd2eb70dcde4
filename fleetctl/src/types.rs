//! Common type definitions.
//!
//! All identifiers handed to or accepted from callers are external ids (UUIDv4). Internal
//! snowflake ids never leave the `db` module.

use uuid::Uuid;

pub type DriverId = Uuid;
pub type CertificationId = Uuid;
pub type VehicleId = Uuid;
pub type VehicleTypeId = Uuid;
pub type UserId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
