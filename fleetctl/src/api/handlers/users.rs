use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        drivers::DriverResponse,
        pagination::PageResponse,
        users::{Credentials, ListUsersQuery, UserCreate, UserResponse, UserStatusUpdate, UserUpdate},
    },
    errors::Result,
    services::UserService,
    types::UserId,
};

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    description = "Exactly one of `password` and `sso_id` must be given.",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing name or email, or not exactly one auth method"),
        (status = 409, description = "Email or SSO identity already in use"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(data): Json<UserCreate>) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = UserService::new(&state).create(data).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/users/authenticate",
    tag = "users",
    summary = "Check email and password",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials are valid", body = UserResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn authenticate(State(state): State<AppState>, Json(credentials): Json<Credentials>) -> Result<Json<UserResponse>> {
    let user = UserService::new(&state).authenticate(credentials).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users, newest first", body = PageResponse<UserResponse>),
        (status = 400, description = "Invalid page token"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PageResponse<UserResponse>>> {
    let filter = query.filter();
    let page = UserService::new(&state).list(&filter, &query.pagination.into()).await?;
    Ok(Json(PageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    let user = UserService::new(&state).get(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/users/by-sso/{sso_id}",
    tag = "users",
    summary = "Get user by SSO identity",
    params(("sso_id" = String, Path, description = "Identity provider subject")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "No user linked to this identity"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_by_sso_id(State(state): State<AppState>, Path(sso_id): Path<String>) -> Result<Json<UserResponse>> {
    let user = UserService::new(&state).get_by_sso_id(&sso_id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    summary = "Update user",
    description = "Partial update. `update_mask` lists the fields to write; without it, every non-empty field in the body is written.",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User as stored after the update", body = UserResponse),
        (status = 400, description = "Unknown mask field or missing required value"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(data): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let user = UserService::new(&state).update(id, data).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "users",
    summary = "Change user status",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserStatusUpdate,
    responses(
        (status = 200, description = "User with its new status", body = UserResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "User not found"),
        (status = 412, description = "Status changed concurrently"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(data): Json<UserStatusUpdate>,
) -> Result<Json<UserResponse>> {
    let user = UserService::new(&state).update_status(id, data.status, &data.reason).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Deactivate user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 404, description = "User not found or already inactive"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    UserService::new(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/{id}/driver",
    tag = "users",
    summary = "Get the driver record of a user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Driver", body = DriverResponse),
        (status = 404, description = "User not found or user is not a driver"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_driver(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<DriverResponse>> {
    let driver = UserService::new(&state).get_driver(id).await?;
    Ok(Json(driver.into()))
}
