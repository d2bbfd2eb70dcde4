//! Vehicle and vehicle type operations.

use sqlx::PgPool;
use tracing::{info, instrument};

use super::{acquire, not_found};
use crate::AppState;
use crate::api::models::vehicles::{VehicleCreate, VehicleTypeCreate, VehicleUpdate};
use crate::db::engine::{IdAllocator, Page, PageRequest, Presence, check_transition};
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, VehicleTypes, Vehicles};
use crate::db::models::vehicle_types::{VehicleType, VehicleTypeCreateDBRequest};
use crate::db::models::vehicles::{
    VehicleCreateDBRequest, VehicleDBResponse, VehicleField, VehicleFilter, VehicleStatus,
};
use crate::errors::Result;
use crate::types::{VehicleId, VehicleTypeId, abbrev_uuid};

pub struct VehicleService<'a> {
    db: &'a PgPool,
    ids: &'a IdAllocator,
}

impl<'a> VehicleService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            db: &state.db,
            ids: &state.ids,
        }
    }

    #[instrument(skip_all, fields(license_plate = %request.license_plate), err)]
    pub async fn create(&self, request: VehicleCreate) -> Result<VehicleDBResponse> {
        let mut conn = acquire(self.db).await?;

        if VehicleTypes::new(&mut conn).get_by_id(request.vehicle_type_id).await?.is_none() {
            return Err(DbError::invalid_argument(format!("vehicle type not found: {}", request.vehicle_type_id)).into());
        }

        let mut vehicles = Vehicles::new(&mut conn);
        if vehicles.get_by_license_plate(&request.license_plate).await?.is_some() {
            return Err(DbError::already_exists(
                "vehicles",
                "vehicles_license_plate_unique",
                format!("vehicle with license plate {} already exists", request.license_plate),
            )
            .into());
        }

        let (internal_id, external_id) = self.ids.allocate()?;
        let vehicle = vehicles
            .create(&VehicleCreateDBRequest {
                internal_id,
                external_id,
                vehicle_type_id: request.vehicle_type_id,
                license_plate: request.license_plate,
                make: request.make,
                model: request.model,
                year: request.year,
                color: request.color,
                seating_capacity: request.seating_capacity,
                fuel_type: request.fuel_type,
                engine_number: request.engine_number,
                chassis_number: request.chassis_number,
                registration_date: request.registration_date,
                insurance_expiry: request.insurance_expiry,
            })
            .await?;

        info!(vehicle_id = %abbrev_uuid(&vehicle.id), "Vehicle created");
        Ok(vehicle)
    }

    pub async fn get(&self, id: VehicleId) -> Result<VehicleDBResponse> {
        let mut conn = acquire(self.db).await?;
        Vehicles::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Vehicle", id))
    }

    pub async fn list(&self, filter: &VehicleFilter, page: &PageRequest) -> Result<Page<VehicleDBResponse>> {
        let mut conn = acquire(self.db).await?;
        Ok(Vehicles::new(&mut conn).list(filter, page).await?)
    }

    /// Active vehicles, optionally of one type. An unknown type is `NotFound`.
    pub async fn list_available(
        &self,
        vehicle_type_id: Option<VehicleTypeId>,
        page: &PageRequest,
    ) -> Result<Page<VehicleDBResponse>> {
        let mut conn = acquire(self.db).await?;
        if let Some(type_id) = vehicle_type_id {
            VehicleTypes::new(&mut conn)
                .get_by_id(type_id)
                .await?
                .ok_or_else(|| not_found("Vehicle type", type_id))?;
        }

        let filter = VehicleFilter {
            status: Some(VehicleStatus::Active),
            vehicle_type_id,
            ..Default::default()
        };
        Ok(Vehicles::new(&mut conn).list(&filter, page).await?)
    }

    pub async fn list_by_type(
        &self,
        vehicle_type_id: VehicleTypeId,
        status: Option<VehicleStatus>,
        page: &PageRequest,
    ) -> Result<Page<VehicleDBResponse>> {
        let mut conn = acquire(self.db).await?;
        VehicleTypes::new(&mut conn)
            .get_by_id(vehicle_type_id)
            .await?
            .ok_or_else(|| not_found("Vehicle type", vehicle_type_id))?;

        let filter = VehicleFilter {
            status,
            vehicle_type_id: Some(vehicle_type_id),
            ..Default::default()
        };
        Ok(Vehicles::new(&mut conn).list(&filter, page).await?)
    }

    #[instrument(skip(self, update), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&self, id: VehicleId, update: VehicleUpdate) -> Result<VehicleDBResponse> {
        let request = update.into_db_request()?;
        let mut conn = acquire(self.db).await?;

        let existing = Vehicles::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found("Vehicle", id))?;

        let type_change = request
            .vehicle_type_id
            .filter(|_| request.mask.includes(VehicleField::VehicleTypeId, request.vehicle_type_id.is_present()));
        if let Some(type_id) = type_change {
            if VehicleTypes::new(&mut conn).get_by_id(type_id).await?.is_none() {
                return Err(DbError::invalid_argument(format!("vehicle type not found: {type_id}")).into());
            }
        }

        let mut vehicles = Vehicles::new(&mut conn);
        let plate_change = request.license_plate.as_deref().filter(|plate| {
            *plate != existing.license_plate
                && request.mask.includes(VehicleField::LicensePlate, request.license_plate.is_present())
        });
        if let Some(plate) = plate_change {
            if vehicles.get_by_license_plate(plate).await?.is_some_and(|other| other.id != id) {
                return Err(DbError::already_exists(
                    "vehicles",
                    "vehicles_license_plate_unique",
                    format!("vehicle with license plate {plate} already exists"),
                )
                .into());
            }
        }

        Ok(vehicles.update(id, &request).await?)
    }

    #[instrument(skip(self, reason), fields(vehicle_id = %abbrev_uuid(&id), to = %to), err)]
    pub async fn update_status(&self, id: VehicleId, to: VehicleStatus, reason: &str) -> Result<VehicleDBResponse> {
        let mut conn = acquire(self.db).await?;
        let mut vehicles = Vehicles::new(&mut conn);

        let current = vehicles.get_by_id(id).await?.ok_or_else(|| not_found("Vehicle", id))?;
        check_transition(current.status, to)?;

        let vehicle = vehicles.update_status(id, current.status, to).await?;
        info!(from = %current.status, to = %to, reason, "Vehicle status updated");
        Ok(vehicle)
    }

    /// Retire a vehicle. Assigned vehicles must be unassigned first.
    #[instrument(skip(self), fields(vehicle_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&self, id: VehicleId) -> Result<()> {
        let mut conn = acquire(self.db).await?;
        let mut vehicles = Vehicles::new(&mut conn);

        let current = vehicles.get_by_id(id).await?.ok_or_else(|| not_found("Vehicle", id))?;
        if current.status == VehicleStatus::Assigned {
            return Err(DbError::failed_precondition("cannot delete assigned vehicle. Unassign vehicle first").into());
        }

        vehicles.retire_from(id, current.status).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(name = %request.name), err)]
    pub async fn create_vehicle_type(&self, request: VehicleTypeCreate) -> Result<VehicleType> {
        let mut conn = acquire(self.db).await?;
        let mut types = VehicleTypes::new(&mut conn);

        if types.get_by_name(&request.name).await?.is_some() {
            return Err(DbError::already_exists(
                "vehicle_types",
                "vehicle_types_name_unique",
                format!("vehicle type {} already exists", request.name),
            )
            .into());
        }

        Ok(types
            .create(&VehicleTypeCreateDBRequest {
                name: request.name,
                description: request.description,
            })
            .await?)
    }

    pub async fn list_vehicle_types(&self, page: &PageRequest) -> Result<Page<VehicleType>> {
        let mut conn = acquire(self.db).await?;
        Ok(VehicleTypes::new(&mut conn).list(page).await?)
    }
}
