use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError, MessageResponse};
use campusdesk_models::ids::ClassId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::classes::model::{
    Class, ClassFilterParams, ClassWithStats, CreateClassDto, PaginatedClassesResponse,
    UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::utils::auth_helpers::{resolve_scope, resolve_target_institution, resource_scope};
use crate::validator::ValidatedJson;

/// Create a class
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 409, description = "Class already exists")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<ApiResponse<Class>, AppError> {
    let institution_id = resolve_target_institution(&auth_user, dto.institution_id)?;
    let class =
        ClassService::create_class(&state.db, &state.academic_config, institution_id, dto).await?;
    Ok(ApiResponse::created(class))
}

/// List classes with student counts
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Paginated classes", body = PaginatedClassesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<ClassFilterParams>,
) -> Result<ApiResponse<PaginatedClassesResponse>, AppError> {
    let scope = resolve_scope(&auth_user, filters.institution_id)?;
    let classes = ClassService::list_classes(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(classes))
}

/// Get a class by ID
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class details", body = ClassWithStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role"),
        (status = 404, description = "Class not found")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_class_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<ClassId>,
) -> Result<ApiResponse<ClassWithStats>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let class = ClassService::get_class(&state.db, id, scope).await?;
    Ok(ApiResponse::success(class))
}

/// Update a class
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Class ID")
    ),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Invalid input or capacity below enrollment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class already exists")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_class(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<ApiResponse<Class>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let class = ClassService::update_class(&state.db, id, scope, dto).await?;
    Ok(ApiResponse::success(class))
}

/// Delete a class without students
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Students are assigned to the class")
    ),
    tag = "Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_class(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<ClassId>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let scope = resource_scope(&auth_user)?;
    ClassService::delete_class(&state.db, id, scope).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Class deleted successfully",
    )))
}
