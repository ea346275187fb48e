use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError, MessageResponse};
use campusdesk_models::ids::InstitutionId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireSuperAdmin;
use crate::modules::institutions::model::{
    CreateInstitutionDto, Institution, InstitutionFilterParams, PaginatedInstitutionsResponse,
    UpdateInstitutionDto,
};
use crate::modules::institutions::service::InstitutionService;
use crate::state::AppState;
use crate::utils::auth_helpers::resource_scope;
use crate::validator::ValidatedJson;

/// Create an institution
#[utoipa::path(
    post,
    path = "/api/v1/institutions",
    request_body = CreateInstitutionDto,
    responses(
        (status = 201, description = "Institution created", body = Institution),
        (status = 400, description = "Invalid input or inactive organization"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 409, description = "Code already in use")
    ),
    tag = "Institutions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn create_institution(
    State(state): State<AppState>,
    RequireSuperAdmin(_auth_user): RequireSuperAdmin,
    ValidatedJson(dto): ValidatedJson<CreateInstitutionDto>,
) -> Result<ApiResponse<Institution>, AppError> {
    let institution = InstitutionService::create_institution(&state.db, dto).await?;
    Ok(ApiResponse::created(institution))
}

/// List institutions
///
/// School admins only see their own institution.
#[utoipa::path(
    get,
    path = "/api/v1/institutions",
    params(InstitutionFilterParams),
    responses(
        (status = 200, description = "Paginated institutions", body = PaginatedInstitutionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role")
    ),
    tag = "Institutions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_institutions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<InstitutionFilterParams>,
) -> Result<ApiResponse<PaginatedInstitutionsResponse>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let institutions = InstitutionService::list_institutions(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(institutions))
}

/// Get an institution by ID
#[utoipa::path(
    get,
    path = "/api/v1/institutions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Institution ID")
    ),
    responses(
        (status = 200, description = "Institution details", body = Institution),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Institution not found")
    ),
    tag = "Institutions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_institution_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<InstitutionId>,
) -> Result<ApiResponse<Institution>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let institution = InstitutionService::get_institution(&state.db, id, scope).await?;
    Ok(ApiResponse::success(institution))
}

/// Update an institution
///
/// Only super admins may change `is_active`.
#[utoipa::path(
    put,
    path = "/api/v1/institutions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Institution ID")
    ),
    request_body = UpdateInstitutionDto,
    responses(
        (status = 200, description = "Institution updated", body = Institution),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Institution not found")
    ),
    tag = "Institutions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_institution(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<InstitutionId>,
    ValidatedJson(dto): ValidatedJson<UpdateInstitutionDto>,
) -> Result<ApiResponse<Institution>, AppError> {
    if dto.is_active.is_some() && !auth_user.is_super_admin() {
        return Err(AppError::forbidden(
            "Only super admins can activate or deactivate institutions",
        ));
    }

    let scope = resource_scope(&auth_user)?;
    let institution = InstitutionService::update_institution(&state.db, id, scope, dto).await?;
    Ok(ApiResponse::success(institution))
}

/// Delete an institution without admissions or users
#[utoipa::path(
    delete,
    path = "/api/v1/institutions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Institution ID")
    ),
    responses(
        (status = 200, description = "Institution deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 404, description = "Institution not found"),
        (status = 409, description = "Institution still has admissions or users")
    ),
    tag = "Institutions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn delete_institution(
    State(state): State<AppState>,
    RequireSuperAdmin(_auth_user): RequireSuperAdmin,
    Path(id): Path<InstitutionId>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    InstitutionService::delete_institution(&state.db, id).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Institution deleted successfully",
    )))
}
