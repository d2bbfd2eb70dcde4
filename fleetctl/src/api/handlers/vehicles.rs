use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        pagination::{PageQuery, PageResponse},
        vehicles::{
            AvailableVehiclesQuery, ListVehiclesQuery, VehicleCreate, VehicleResponse, VehicleStatusUpdate, VehicleTypeCreate,
            VehicleTypeResponse, VehicleUpdate,
        },
    },
    errors::Result,
    services::VehicleService,
    types::{VehicleId, VehicleTypeId},
};

#[utoipa::path(
    post,
    path = "/transport/vehicles",
    tag = "vehicles",
    summary = "Register vehicle",
    request_body = VehicleCreate,
    responses(
        (status = 201, description = "Vehicle registered", body = VehicleResponse),
        (status = 400, description = "Invalid data or unknown vehicle type"),
        (status = 409, description = "License plate already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(data): Json<VehicleCreate>,
) -> Result<(StatusCode, Json<VehicleResponse>)> {
    let vehicle = VehicleService::new(&state).create(data).await?;
    Ok((StatusCode::CREATED, Json(vehicle.into())))
}

#[utoipa::path(
    get,
    path = "/transport/vehicles",
    tag = "vehicles",
    summary = "List vehicles",
    params(ListVehiclesQuery),
    responses(
        (status = 200, description = "One page of vehicles, newest first", body = PageResponse<VehicleResponse>),
        (status = 400, description = "Invalid page token"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ListVehiclesQuery>,
) -> Result<Json<PageResponse<VehicleResponse>>> {
    let filter = query.filter();
    let page = VehicleService::new(&state).list(&filter, &query.pagination.into()).await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/vehicles/available",
    tag = "vehicles",
    summary = "List vehicles available for assignment",
    params(AvailableVehiclesQuery),
    responses(
        (status = 200, description = "Active vehicles", body = PageResponse<VehicleResponse>),
        (status = 404, description = "Vehicle type not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailableVehiclesQuery>,
) -> Result<Json<PageResponse<VehicleResponse>>> {
    let page = VehicleService::new(&state)
        .list_available(query.vehicle_type_id, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/transport/vehicles/{id}",
    tag = "vehicles",
    summary = "Get vehicle",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = VehicleResponse),
        (status = 404, description = "Vehicle not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_vehicle(State(state): State<AppState>, Path(id): Path<VehicleId>) -> Result<Json<VehicleResponse>> {
    let vehicle = VehicleService::new(&state).get(id).await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    patch,
    path = "/transport/vehicles/{id}",
    tag = "vehicles",
    summary = "Update vehicle",
    description = "Partial update. `update_mask` lists the fields to write; without it, every non-empty field in the body is written.",
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = VehicleUpdate,
    responses(
        (status = 200, description = "Vehicle as stored after the update", body = VehicleResponse),
        (status = 400, description = "Unknown mask field or missing required value"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "License plate already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
    Json(data): Json<VehicleUpdate>,
) -> Result<Json<VehicleResponse>> {
    let vehicle = VehicleService::new(&state).update(id, data).await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    patch,
    path = "/transport/vehicles/{id}/status",
    tag = "vehicles",
    summary = "Change vehicle status",
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = VehicleStatusUpdate,
    responses(
        (status = 200, description = "Vehicle with its new status", body = VehicleResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Vehicle not found"),
        (status = 412, description = "Status changed concurrently"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
    Json(data): Json<VehicleStatusUpdate>,
) -> Result<Json<VehicleResponse>> {
    let vehicle = VehicleService::new(&state)
        .update_status(id, data.status, &data.reason)
        .await?;
    Ok(Json(vehicle.into()))
}

#[utoipa::path(
    delete,
    path = "/transport/vehicles/{id}",
    tag = "vehicles",
    summary = "Retire vehicle",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 204, description = "Vehicle retired"),
        (status = 404, description = "Vehicle not found or already retired"),
        (status = 412, description = "Vehicle is assigned"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_vehicle(State(state): State<AppState>, Path(id): Path<VehicleId>) -> Result<StatusCode> {
    VehicleService::new(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/transport/vehicle-types/{id}/vehicles",
    tag = "vehicles",
    summary = "List vehicles of one type",
    params(("id" = String, Path, description = "Vehicle type ID"), ListVehiclesQuery),
    responses(
        (status = 200, description = "One page of vehicles", body = PageResponse<VehicleResponse>),
        (status = 404, description = "Vehicle type not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_vehicles_by_type(
    State(state): State<AppState>,
    Path(id): Path<VehicleTypeId>,
    Query(query): Query<ListVehiclesQuery>,
) -> Result<Json<PageResponse<VehicleResponse>>> {
    let page = VehicleService::new(&state)
        .list_by_type(id, query.status, &query.pagination.into())
        .await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    post,
    path = "/transport/vehicle-types",
    tag = "vehicle_types",
    summary = "Create vehicle type",
    request_body = VehicleTypeCreate,
    responses(
        (status = 201, description = "Vehicle type created", body = VehicleTypeResponse),
        (status = 409, description = "Name already taken"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_vehicle_type(
    State(state): State<AppState>,
    Json(data): Json<VehicleTypeCreate>,
) -> Result<(StatusCode, Json<VehicleTypeResponse>)> {
    let vehicle_type = VehicleService::new(&state).create_vehicle_type(data).await?;
    Ok((StatusCode::CREATED, Json(vehicle_type.into())))
}

#[utoipa::path(
    get,
    path = "/transport/vehicle-types",
    tag = "vehicle_types",
    summary = "List vehicle types",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of vehicle types", body = PageResponse<VehicleTypeResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_vehicle_types(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<VehicleTypeResponse>>> {
    let page = VehicleService::new(&state).list_vehicle_types(&query.into()).await?;
    Ok(Json(PageResponse::from_page(page)))
}
