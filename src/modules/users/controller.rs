use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError};
use campusdesk_models::ids::UserId;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::auth_helpers::{resolve_scope, resource_scope};
use crate::validator::ValidatedJson;

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input or missing institution"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - school admins cannot create admins"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<ApiResponse<User>, AppError> {
    let user = UserService::create_user(&state.db, &auth_user, dto).await?;
    Ok(ApiResponse::created(user))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<UserFilterParams>,
) -> Result<ApiResponse<PaginatedUsersResponse>, AppError> {
    let scope = resolve_scope(&auth_user, filters.institution_id)?;
    let users = UserService::list_users(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let user = UserService::get_user(&state.db, id, scope).await?;
    Ok(ApiResponse::success(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<ApiResponse<User>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let user = UserService::update_user(&state.db, &auth_user, id, scope, dto).await?;
    Ok(ApiResponse::success(user))
}

/// Deactivate a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/deactivate",
    params(
        ("id" = uuid::Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let user = UserService::deactivate_user(&state.db, &auth_user, id, scope).await?;
    Ok(ApiResponse::success(user))
}
