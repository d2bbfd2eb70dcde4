//! OpenAPI document for the `/api/v1` surface, served by Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api::{handlers, models};
use crate::db::models::{
    drivers::{CertificationStatus, DriverStatus, LicenseClass},
    users::UserStatus,
    vehicles::{FuelType, VehicleStatus},
};

#[derive(OpenApi)]
#[openapi(
    servers((url = "/api/v1")),
    paths(
        handlers::users::create_user,
        handlers::users::authenticate,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::get_user_by_sso_id,
        handlers::users::update_user,
        handlers::users::update_user_status,
        handlers::users::delete_user,
        handlers::users::get_user_driver,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::list_vehicles,
        handlers::vehicles::list_available_vehicles,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::update_vehicle,
        handlers::vehicles::update_vehicle_status,
        handlers::vehicles::delete_vehicle,
        handlers::vehicles::list_vehicles_by_type,
        handlers::vehicles::create_vehicle_type,
        handlers::vehicles::list_vehicle_types,
        handlers::drivers::create_driver,
        handlers::drivers::list_drivers,
        handlers::drivers::list_active_drivers,
        handlers::drivers::list_expiring_licenses,
        handlers::drivers::get_driver,
        handlers::drivers::update_driver,
        handlers::drivers::update_driver_status,
        handlers::drivers::delete_driver,
        handlers::drivers::verify_license,
        handlers::drivers::add_certification,
        handlers::drivers::list_certifications,
        handlers::drivers::list_expired_certifications,
        handlers::drivers::update_certification,
        handlers::drivers::delete_certification,
    ),
    components(schemas(
        models::users::UserCreate,
        models::users::UserUpdate,
        models::users::UserStatusUpdate,
        models::users::UserResponse,
        models::users::Credentials,
        models::vehicles::VehicleCreate,
        models::vehicles::VehicleUpdate,
        models::vehicles::VehicleStatusUpdate,
        models::vehicles::VehicleResponse,
        models::vehicles::VehicleTypeCreate,
        models::vehicles::VehicleTypeResponse,
        models::drivers::DriverCreate,
        models::drivers::DriverUpdate,
        models::drivers::DriverStatusUpdate,
        models::drivers::DriverResponse,
        models::drivers::VerifyLicenseRequest,
        models::drivers::LicenseVerification,
        models::drivers::CertificationCreate,
        models::drivers::CertificationUpdate,
        models::drivers::CertificationResponse,
        models::pagination::PageResponse<models::users::UserResponse>,
        models::pagination::PageResponse<models::vehicles::VehicleResponse>,
        models::pagination::PageResponse<models::vehicles::VehicleTypeResponse>,
        models::pagination::PageResponse<models::drivers::DriverResponse>,
        models::pagination::PageResponse<models::drivers::CertificationResponse>,
        UserStatus,
        VehicleStatus,
        FuelType,
        DriverStatus,
        LicenseClass,
        CertificationStatus,
    )),
    tags(
        (name = "users", description = "User accounts. Each user signs in with either a password or one linked SSO identity."),
        (name = "vehicles", description = "Fleet vehicles. Deleting a vehicle retires it; retired vehicles stay readable."),
        (name = "vehicle_types", description = "Vehicle categories such as bus, matatu and bodaboda."),
        (name = "drivers", description = "Drivers and their licences. A driver must hold a valid licence to be activated."),
        (name = "certifications", description = "Certifications held by drivers."),
    ),
    info(
        title = "Fleet API",
        version = "1.0.0",
        description = "Records for drivers, vehicles and users.

## Pagination

List endpoints return `items` and, when more results exist, a `next_page_token`. Pass it back as
`page_token` to fetch the next page. `page_size` defaults to 50 and is capped at 100.

## Partial updates

`PATCH` bodies accept an optional `update_mask` naming the fields to write. Masked fields absent
from the body are cleared, and an empty mask writes nothing. Without a mask, every non-empty field
in the body is written.

## Errors

Errors are returned as plain text with a status code:

| Status | Meaning |
|--------|---------|
| 400 | Malformed argument, mask, page token, or a status change the entity does not allow |
| 401 | Invalid credentials |
| 404 | Entity not found, or already deleted |
| 409 | Unique field already in use |
| 412 | A business rule blocked the operation, or the status changed concurrently |
| 500 | Internal error |"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/users",
            "/users/authenticate",
            "/users/{id}/driver",
            "/transport/vehicles/{id}/status",
            "/transport/vehicle-types/{id}/vehicles",
            "/transport/drivers/{id}/verify-license",
            "/transport/certifications/expired",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI document");
        }
        assert_eq!(doc.servers.unwrap()[0].url, "/api/v1");
    }
}
