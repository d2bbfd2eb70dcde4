//! Shared fixtures for database and HTTP tests.

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::AppState;
use crate::config::{Config, PoolSettings};
use crate::db::engine::IdAllocator;
use crate::db::handlers::{Drivers, Repository, Users, VehicleTypes, Vehicles};
use crate::db::models::{
    drivers::{CertificationCreateDBRequest, DriverCreateDBRequest, DriverDBResponse, LicenseClass},
    users::{AuthMethod, UserCreateDBRequest, UserDBResponse},
    vehicles::{FuelType, VehicleCreateDBRequest, VehicleDBResponse},
};
use crate::types::{DriverId, VehicleTypeId};

pub fn test_ids() -> IdAllocator {
    IdAllocator::new(1).expect("node id 1 is valid")
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: PoolSettings {
            max_connections: 2,
            min_connections: 0,
            ..Default::default()
        },
        node_id: 1,
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder()
        .db(pool)
        .config(create_test_config())
        .ids(Arc::new(test_ids()))
        .build()
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    crate::Application::new_with_pool(create_test_config(), pool)
        .expect("Failed to create application")
        .into_test_server()
}

/// Id of one of the vehicle types seeded by the migrations.
pub async fn standard_vehicle_type(conn: &mut PgConnection, name: &str) -> VehicleTypeId {
    VehicleTypes::new(conn)
        .get_by_name(name)
        .await
        .expect("Failed to look up vehicle type")
        .unwrap_or_else(|| panic!("vehicle type {name} is not seeded"))
        .id
}

pub fn vehicle_request(ids: &IdAllocator, vehicle_type_id: VehicleTypeId, license_plate: &str) -> VehicleCreateDBRequest {
    let (internal_id, external_id) = ids.allocate().expect("Failed to allocate ids");
    let today = Utc::now().date_naive();
    VehicleCreateDBRequest {
        internal_id,
        external_id,
        vehicle_type_id,
        license_plate: license_plate.to_string(),
        make: "Toyota".to_string(),
        model: "Hiace".to_string(),
        year: 2020,
        color: "Silver".to_string(),
        seating_capacity: 14,
        fuel_type: FuelType::Diesel,
        engine_number: "1KD-4471920".to_string(),
        chassis_number: "JTFSS22P0L0012345".to_string(),
        registration_date: Some(today - Duration::days(700)),
        insurance_expiry: Some(today + Duration::days(180)),
    }
}

pub async fn create_test_vehicle(
    conn: &mut PgConnection,
    ids: &IdAllocator,
    vehicle_type_id: VehicleTypeId,
    license_plate: &str,
) -> VehicleDBResponse {
    Vehicles::new(conn)
        .create(&vehicle_request(ids, vehicle_type_id, license_plate))
        .await
        .expect("Failed to create test vehicle")
}

/// A driver for a fresh user, with a licence valid for about a year.
pub fn driver_request(ids: &IdAllocator, license_number: &str) -> DriverCreateDBRequest {
    let (internal_id, external_id) = ids.allocate().expect("Failed to allocate ids");
    let today = Utc::now().date_naive();
    DriverCreateDBRequest {
        internal_id,
        external_id,
        user_id: Uuid::new_v4(),
        license_number: license_number.to_string(),
        license_class: LicenseClass::ClassB,
        license_expiry: today + Duration::days(365),
        experience_years: 5,
        phone_number: "+254712000000".to_string(),
        emergency_contact_name: "Jane Wambui".to_string(),
        emergency_contact_phone: "+254722000000".to_string(),
        hire_date: Some(today - Duration::days(30)),
    }
}

pub async fn create_test_driver(conn: &mut PgConnection, ids: &IdAllocator, license_number: &str) -> DriverDBResponse {
    Drivers::new(conn)
        .create(&driver_request(ids, license_number))
        .await
        .expect("Failed to create test driver")
}

pub fn certification_request(ids: &IdAllocator, driver_id: DriverId, name: &str) -> CertificationCreateDBRequest {
    let (internal_id, external_id) = ids.allocate().expect("Failed to allocate ids");
    let today = Utc::now().date_naive();
    CertificationCreateDBRequest {
        internal_id,
        external_id,
        driver_id,
        certification_name: name.to_string(),
        issued_by: "NTSA".to_string(),
        issue_date: today - Duration::days(30),
        expiry_date: Some(today + Duration::days(365)),
    }
}

pub fn user_request(ids: &IdAllocator, email: &str) -> UserCreateDBRequest {
    let (internal_id, external_id) = ids.allocate().expect("Failed to allocate ids");
    UserCreateDBRequest {
        internal_id,
        external_id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        auth: AuthMethod::Password("$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$dGVzdGhhc2g".to_string()),
        terms_accepted_at: Some(Utc::now()),
    }
}

pub async fn create_test_user(conn: &mut PgConnection, ids: &IdAllocator, email: &str) -> UserDBResponse {
    Users::new(conn)
        .create(&user_request(ids, email))
        .await
        .expect("Failed to create test user")
}

