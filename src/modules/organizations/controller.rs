use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError, MessageResponse};
use campusdesk_models::ids::OrganizationId;

use crate::modules::organizations::model::{
    CreateOrganizationDto, Organization, OrganizationFilterParams, PaginatedOrganizationsResponse,
    UpdateOrganizationDto,
};
use crate::modules::organizations::service::OrganizationService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create an organization
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 409, description = "Code already in use")
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_organization(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateOrganizationDto>,
) -> Result<ApiResponse<Organization>, AppError> {
    let organization = OrganizationService::create_organization(&state.db, dto).await?;
    Ok(ApiResponse::created(organization))
}

/// List organizations
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    params(OrganizationFilterParams),
    responses(
        (status = 200, description = "Paginated organizations", body = PaginatedOrganizationsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin")
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_organizations(
    State(state): State<AppState>,
    Query(filters): Query<OrganizationFilterParams>,
) -> Result<ApiResponse<PaginatedOrganizationsResponse>, AppError> {
    let organizations = OrganizationService::list_organizations(&state.db, filters).await?;
    Ok(ApiResponse::success(organizations))
}

/// Get an organization by ID
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization details", body = Organization),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 404, description = "Organization not found")
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_organization_by_id(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> Result<ApiResponse<Organization>, AppError> {
    let organization = OrganizationService::get_organization(&state.db, id).await?;
    Ok(ApiResponse::success(organization))
}

/// Update an organization
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Organization ID")
    ),
    request_body = UpdateOrganizationDto,
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 404, description = "Organization not found")
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    ValidatedJson(dto): ValidatedJson<UpdateOrganizationDto>,
) -> Result<ApiResponse<Organization>, AppError> {
    let organization = OrganizationService::update_organization(&state.db, id, dto).await?;
    Ok(ApiResponse::success(organization))
}

/// Delete an organization without institutions
#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires super admin"),
        (status = 404, description = "Organization not found"),
        (status = 409, description = "Organization still has institutions")
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    OrganizationService::delete_organization(&state.db, id).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Organization deleted successfully",
    )))
}
