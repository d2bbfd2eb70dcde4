use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        drivers::{
            CertificationCreate, CertificationResponse, CertificationUpdate, DriverCreate, DriverResponse, DriverStatusUpdate,
            DriverUpdate, ExpiredCertificationsQuery, ExpiringLicensesQuery, LicenseVerification, ListCertificationsQuery,
            ListDriversQuery, VerifyLicenseRequest,
        },
        pagination::PageResponse,
    },
    errors::Result,
    services::DriverService,
    types::{CertificationId, DriverId},
};

#[utoipa::path(
    post,
    path = "/transport/drivers",
    tag = "drivers",
    summary = "Register driver",
    request_body = DriverCreate,
    responses(
        (status = 201, description = "Driver registered", body = DriverResponse),
        (status = 400, description = "Invalid data or expired license"),
        (status = 409, description = "License number or user already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_driver(
    State(state): State<AppState>,
    Json(data): Json<DriverCreate>,
) -> Result<(StatusCode, Json<DriverResponse>)> {
    let driver = DriverService::new(&state).create(data).await?;
    Ok((StatusCode::CREATED, Json(driver.into())))
}

#[utoipa::path(
    get,
    path = "/transport/drivers",
    tag = "drivers",
    summary = "List drivers",
    params(ListDriversQuery),
    responses(
        (status = 200, description = "One page of drivers, newest first", body = PageResponse<DriverResponse>),
        (status = 400, description = "Invalid page token"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<ListDriversQuery>,
) -> Result<Json<PageResponse<DriverResponse>>> {
    let page = DriverService::new(&state)
        .list(
            query.status,
            query.license_class,
            query.license_expiring_soon.unwrap_or(false),
            &query.pagination.into(),
        )
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/drivers/active",
    tag = "drivers",
    summary = "List active drivers",
    params(ListDriversQuery),
    responses(
        (status = 200, description = "Active drivers", body = PageResponse<DriverResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_active_drivers(
    State(state): State<AppState>,
    Query(query): Query<ListDriversQuery>,
) -> Result<Json<PageResponse<DriverResponse>>> {
    let page = DriverService::new(&state)
        .list_active(query.license_class, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/drivers/expiring-licenses",
    tag = "drivers",
    summary = "List active drivers whose license expires soon",
    params(ExpiringLicensesQuery),
    responses(
        (status = 200, description = "Drivers ordered by license expiry", body = PageResponse<DriverResponse>),
        (status = 400, description = "Non-positive window"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_expiring_licenses(
    State(state): State<AppState>,
    Query(query): Query<ExpiringLicensesQuery>,
) -> Result<Json<PageResponse<DriverResponse>>> {
    let page = DriverService::new(&state)
        .list_expiring_licenses(query.days_ahead, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/drivers/{id}",
    tag = "drivers",
    summary = "Get driver",
    params(("id" = String, Path, description = "Driver ID")),
    responses(
        (status = 200, description = "Driver", body = DriverResponse),
        (status = 404, description = "Driver not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_driver(State(state): State<AppState>, Path(id): Path<DriverId>) -> Result<Json<DriverResponse>> {
    let driver = DriverService::new(&state).get(id).await?;
    Ok(Json(driver.into()))
}

#[utoipa::path(
    patch,
    path = "/transport/drivers/{id}",
    tag = "drivers",
    summary = "Update driver",
    description = "Partial update. `update_mask` lists the fields to write; without it, every non-empty field in the body is written.",
    params(("id" = String, Path, description = "Driver ID")),
    request_body = DriverUpdate,
    responses(
        (status = 200, description = "Driver as stored after the update", body = DriverResponse),
        (status = 400, description = "Unknown mask field or missing required value"),
        (status = 404, description = "Driver not found"),
        (status = 409, description = "License number already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<DriverId>,
    Json(data): Json<DriverUpdate>,
) -> Result<Json<DriverResponse>> {
    let driver = DriverService::new(&state).update(id, data).await?;
    Ok(Json(driver.into()))
}

#[utoipa::path(
    patch,
    path = "/transport/drivers/{id}/status",
    tag = "drivers",
    summary = "Change driver status",
    params(("id" = String, Path, description = "Driver ID")),
    request_body = DriverStatusUpdate,
    responses(
        (status = 200, description = "Driver with its new status", body = DriverResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Driver not found"),
        (status = 412, description = "License expired or status changed concurrently"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_driver_status(
    State(state): State<AppState>,
    Path(id): Path<DriverId>,
    Json(data): Json<DriverStatusUpdate>,
) -> Result<Json<DriverResponse>> {
    let driver = DriverService::new(&state)
        .update_status(id, data.status, &data.reason)
        .await?;
    Ok(Json(driver.into()))
}

#[utoipa::path(
    delete,
    path = "/transport/drivers/{id}",
    tag = "drivers",
    summary = "Terminate driver",
    params(("id" = String, Path, description = "Driver ID")),
    responses(
        (status = 204, description = "Driver terminated"),
        (status = 404, description = "Driver not found or already terminated"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_driver(State(state): State<AppState>, Path(id): Path<DriverId>) -> Result<StatusCode> {
    DriverService::new(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/transport/drivers/{id}/verify-license",
    tag = "drivers",
    summary = "Verify driver license",
    params(("id" = String, Path, description = "Driver ID")),
    request_body = VerifyLicenseRequest,
    responses(
        (status = 200, description = "Verification result", body = LicenseVerification),
        (status = 404, description = "Driver not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn verify_license(
    State(state): State<AppState>,
    Path(id): Path<DriverId>,
    Json(data): Json<VerifyLicenseRequest>,
) -> Result<Json<LicenseVerification>> {
    Ok(Json(DriverService::new(&state).verify_license(id, data).await?))
}

#[utoipa::path(
    post,
    path = "/transport/drivers/{id}/certifications",
    tag = "certifications",
    summary = "Add certification",
    params(("id" = String, Path, description = "Driver ID")),
    request_body = CertificationCreate,
    responses(
        (status = 201, description = "Certification added", body = CertificationResponse),
        (status = 400, description = "Expiry before issue date"),
        (status = 404, description = "Driver not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn add_certification(
    State(state): State<AppState>,
    Path(id): Path<DriverId>,
    Json(data): Json<CertificationCreate>,
) -> Result<(StatusCode, Json<CertificationResponse>)> {
    let certification = DriverService::new(&state).add_certification(id, data).await?;
    Ok((StatusCode::CREATED, Json(certification.into())))
}

#[utoipa::path(
    get,
    path = "/transport/drivers/{id}/certifications",
    tag = "certifications",
    summary = "List driver certifications",
    params(("id" = String, Path, description = "Driver ID"), ListCertificationsQuery),
    responses(
        (status = 200, description = "One page of certifications", body = PageResponse<CertificationResponse>),
        (status = 404, description = "Driver not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_certifications(
    State(state): State<AppState>,
    Path(id): Path<DriverId>,
    Query(query): Query<ListCertificationsQuery>,
) -> Result<Json<PageResponse<CertificationResponse>>> {
    let filter = query.filter();
    let page = DriverService::new(&state)
        .list_certifications(id, filter, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/certifications/expired",
    tag = "certifications",
    summary = "List expired certifications",
    params(ExpiredCertificationsQuery),
    responses(
        (status = 200, description = "One page of expired certifications", body = PageResponse<CertificationResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_expired_certifications(
    State(state): State<AppState>,
    Query(query): Query<ExpiredCertificationsQuery>,
) -> Result<Json<PageResponse<CertificationResponse>>> {
    let page = DriverService::new(&state)
        .list_expired_certifications(query.expired_since_days, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    patch,
    path = "/transport/certifications/{id}",
    tag = "certifications",
    summary = "Update certification",
    params(("id" = String, Path, description = "Certification ID")),
    request_body = CertificationUpdate,
    responses(
        (status = 200, description = "Certification as stored after the update", body = CertificationResponse),
        (status = 400, description = "Unknown mask field"),
        (status = 404, description = "Certification not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_certification(
    State(state): State<AppState>,
    Path(id): Path<CertificationId>,
    Json(data): Json<CertificationUpdate>,
) -> Result<Json<CertificationResponse>> {
    let certification = DriverService::new(&state).update_certification(id, data).await?;
    Ok(Json(certification.into()))
}

#[utoipa::path(
    delete,
    path = "/transport/certifications/{id}",
    tag = "certifications",
    summary = "Revoke certification",
    params(("id" = String, Path, description = "Certification ID")),
    responses(
        (status = 204, description = "Certification revoked"),
        (status = 404, description = "Certification not found or already revoked"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_certification(State(state): State<AppState>, Path(id): Path<CertificationId>) -> Result<StatusCode> {
    DriverService::new(&state).delete_certification(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
