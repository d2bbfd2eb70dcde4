//! API request/response models for vehicles and vehicle types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

use super::pagination::PageQuery;
use crate::db::engine::FieldMask;
use crate::db::errors::Result;
use crate::db::models::vehicle_types::VehicleType;
use crate::db::models::vehicles::{FuelType, VehicleDBResponse, VehicleFilter, VehicleStatus, VehicleUpdateDBRequest};
use crate::types::{VehicleId, VehicleTypeId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleCreate {
    #[schema(value_type = String, format = "uuid")]
    pub vehicle_type_id: VehicleTypeId,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub seating_capacity: i32,
    pub fuel_type: FuelType,
    #[serde(default)]
    pub engine_number: String,
    #[serde(default)]
    pub chassis_number: String,
    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
}

/// Partial update. With `update_mask` set, exactly the named fields are written, and a named
/// field left out of the body is cleared; an empty mask writes nothing. Without it, every
/// non-empty field is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VehicleUpdate {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub vehicle_type_id: Option<VehicleTypeId>,
    pub license_plate: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub seating_capacity: Option<i32>,
    pub fuel_type: Option<FuelType>,
    pub engine_number: Option<String>,
    pub chassis_number: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    /// Field names to write, e.g. `["color", "make"]`
    pub update_mask: Option<Vec<String>>,
}

impl VehicleUpdate {
    pub fn into_db_request(self) -> Result<VehicleUpdateDBRequest> {
        Ok(VehicleUpdateDBRequest {
            mask: FieldMask::parse(self.update_mask.as_deref())?,
            vehicle_type_id: self.vehicle_type_id,
            license_plate: self.license_plate,
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            seating_capacity: self.seating_capacity,
            fuel_type: self.fuel_type,
            engine_number: self.engine_number,
            chassis_number: self.chassis_number,
            registration_date: self.registration_date,
            insurance_expiry: self.insurance_expiry,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleStatusUpdate {
    pub status: VehicleStatus,
    /// Free text recorded in the service log
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VehicleId,
    #[schema(value_type = String, format = "uuid")]
    pub vehicle_type_id: VehicleTypeId,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub seating_capacity: i32,
    pub fuel_type: FuelType,
    pub engine_number: String,
    pub chassis_number: String,
    pub registration_date: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleDBResponse> for VehicleResponse {
    fn from(v: VehicleDBResponse) -> Self {
        Self {
            id: v.id,
            vehicle_type_id: v.vehicle_type_id,
            license_plate: v.license_plate,
            make: v.make,
            model: v.model,
            year: v.year,
            color: v.color,
            seating_capacity: v.seating_capacity,
            fuel_type: v.fuel_type,
            engine_number: v.engine_number,
            chassis_number: v.chassis_number,
            registration_date: v.registration_date,
            insurance_expiry: v.insurance_expiry,
            status: v.status,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Query parameters for listing vehicles
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListVehiclesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    pub status: Option<VehicleStatus>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub vehicle_type_id: Option<VehicleTypeId>,
    /// Case-insensitive substring of the make
    pub make: Option<String>,
}

impl ListVehiclesQuery {
    pub fn filter(&self) -> VehicleFilter {
        VehicleFilter {
            status: self.status,
            vehicle_type_id: self.vehicle_type_id,
            make: self.make.clone(),
        }
    }
}

/// Query parameters for listing vehicles available for assignment
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AvailableVehiclesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PageQuery,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub vehicle_type_id: Option<VehicleTypeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleTypeCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleTypeResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VehicleTypeId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<VehicleType> for VehicleTypeResponse {
    fn from(t: VehicleType) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            created_at: t.created_at,
        }
    }
}
