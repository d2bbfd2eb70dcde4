//! Database models for vehicle types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::VehicleTypeId;

/// Vehicle types are reference data: no status, no updates.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VehicleTypeCreateDBRequest {
    pub name: String,
    pub description: String,
}

/// Names seeded by the initial migration.
pub const STANDARD_VEHICLE_TYPES: &[&str] = &["cab", "bus", "matatu", "bodaboda", "truck", "van", "pickup"];
