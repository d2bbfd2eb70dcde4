//! Database models for vehicles.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::engine::{FieldMask, MaskField, StatusEnum};
use crate::stored_enum;
use crate::types::{VehicleId, VehicleTypeId};

stored_enum! {
    /// Vehicle lifecycle status. `RETIRED` is terminal and is also the soft-deleted state.
    pub enum VehicleStatus {
        Active => "ACTIVE",
        Assigned => "ASSIGNED",
        Maintenance => "MAINTENANCE",
        Retired => "RETIRED",
    }
}

impl StatusEnum for VehicleStatus {
    const INITIAL: Self = VehicleStatus::Active;
    const SOFT_DELETED: Self = VehicleStatus::Retired;
    const TABLE: &'static str = "vehicles";

    fn successors(self) -> &'static [Self] {
        use VehicleStatus::*;
        match self {
            Active => &[Assigned, Maintenance, Retired],
            Assigned => &[Active, Maintenance],
            Maintenance => &[Active, Retired],
            Retired => &[],
        }
    }
}

stored_enum! {
    pub enum FuelType {
        Petrol => "PETROL",
        Diesel => "DIESEL",
        Electric => "ELECTRIC",
        Hybrid => "HYBRID",
        Lpg => "LPG",
    }
}

/// Updatable vehicle fields. Names double as column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleField {
    VehicleTypeId,
    LicensePlate,
    Make,
    Model,
    Year,
    Color,
    SeatingCapacity,
    FuelType,
    EngineNumber,
    ChassisNumber,
    RegistrationDate,
    InsuranceExpiry,
}

impl MaskField for VehicleField {
    const ALL: &'static [Self] = &[
        VehicleField::VehicleTypeId,
        VehicleField::LicensePlate,
        VehicleField::Make,
        VehicleField::Model,
        VehicleField::Year,
        VehicleField::Color,
        VehicleField::SeatingCapacity,
        VehicleField::FuelType,
        VehicleField::EngineNumber,
        VehicleField::ChassisNumber,
        VehicleField::RegistrationDate,
        VehicleField::InsuranceExpiry,
    ];

    fn name(self) -> &'static str {
        match self {
            VehicleField::VehicleTypeId => "vehicle_type_id",
            VehicleField::LicensePlate => "license_plate",
            VehicleField::Make => "make",
            VehicleField::Model => "model",
            VehicleField::Year => "year",
            VehicleField::Color => "color",
            VehicleField::SeatingCapacity => "seating_capacity",
            VehicleField::FuelType => "fuel_type",
            VehicleField::EngineNumber => "engine_number",
            VehicleField::ChassisNumber => "chassis_number",
            VehicleField::RegistrationDate => "registration_date",
            VehicleField::InsuranceExpiry => "insurance_expiry",
        }
    }
}

/// Insert request. Identifiers are allocated by the caller.
#[derive(Debug, Clone)]
pub struct VehicleCreateDBRequest {
    pub internal_id: i64,
    pub external_id: VehicleId,
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
}

#[derive(Debug, Clone, Default)]
pub struct VehicleUpdateDBRequest {
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
    pub mask: FieldMask<VehicleField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDBResponse {
    pub id: VehicleId,
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

/// Optional list filters; `None` means unfiltered.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub vehicle_type_id: Option<VehicleTypeId>,
    pub make: Option<String>,
}
