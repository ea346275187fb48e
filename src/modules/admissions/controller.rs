use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError, MessageResponse};
use campusdesk_models::ids::AdmissionId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::admissions::model::{
    Admission, AdmissionFilterParams, AdmissionStatsOverview, AdmissionTrends,
    ApproveEnrollDto, ApproveEnrollResponse, CreateAdmissionDto, PaginatedAdmissionsResponse,
    RejectAdmissionDto, StatsOverviewParams, TrendParams, UpdateAdmissionDto,
    UpdateAdmissionStatusDto,
};
use crate::modules::admissions::service::AdmissionService;
use crate::state::AppState;
use crate::utils::auth_helpers::{resolve_scope, resolve_target_institution, resource_scope};
use crate::validator::ValidatedJson;

/// Submit a new admission application
#[utoipa::path(
    post,
    path = "/api/v1/admissions",
    request_body = CreateAdmissionDto,
    responses(
        (status = 201, description = "Admission created in pending status", body = Admission),
        (status = 400, description = "Invalid input, inactive institution or foreign class"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_admission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAdmissionDto>,
) -> Result<ApiResponse<Admission>, AppError> {
    let institution_id = resolve_target_institution(&auth_user, dto.institution_id)?;

    let admission = AdmissionService::create_admission(
        &state.db,
        &state.academic_config,
        institution_id,
        auth_user.user_id(),
        dto,
    )
    .await?;

    Ok(ApiResponse::created(admission))
}

/// List admissions
#[utoipa::path(
    get,
    path = "/api/v1/admissions",
    params(AdmissionFilterParams),
    responses(
        (status = 200, description = "Paginated admissions", body = PaginatedAdmissionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_admissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AdmissionFilterParams>,
) -> Result<ApiResponse<PaginatedAdmissionsResponse>, AppError> {
    let scope = resolve_scope(&auth_user, filters.institution_id)?;
    let admissions = AdmissionService::list_admissions(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(admissions))
}

/// Get an admission by ID
#[utoipa::path(
    get,
    path = "/api/v1/admissions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    responses(
        (status = 200, description = "Admission details", body = Admission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role"),
        (status = 404, description = "Admission not found")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_admission_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AdmissionId>,
) -> Result<ApiResponse<Admission>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let admission = AdmissionService::get_admission(&state.db, id, scope).await?;
    Ok(ApiResponse::success(admission))
}

/// Update applicant details
#[utoipa::path(
    put,
    path = "/api/v1/admissions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    request_body = UpdateAdmissionDto,
    responses(
        (status = 200, description = "Admission updated", body = Admission),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role"),
        (status = 404, description = "Admission not found")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_admission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<UpdateAdmissionDto>,
) -> Result<ApiResponse<Admission>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let admission = AdmissionService::update_admission(&state.db, id, scope, dto).await?;
    Ok(ApiResponse::success(admission))
}

/// Move an admission to another status
///
/// Only legal transitions are accepted. `enrolled` is never accepted here;
/// use approve-and-enroll instead.
#[utoipa::path(
    put,
    path = "/api/v1/admissions/{id}/status",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    request_body = UpdateAdmissionStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Admission),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Admission not found"),
        (status = 409, description = "Illegal status transition")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_admission_status(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<UpdateAdmissionStatusDto>,
) -> Result<ApiResponse<Admission>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let admission =
        AdmissionService::update_status(&state.db, id, scope, dto.status, auth_user.user_id())
            .await?;
    Ok(ApiResponse::success(admission))
}

/// Approve an admission and create its student record
#[utoipa::path(
    post,
    path = "/api/v1/admissions/{id}/approve-enroll",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    request_body = ApproveEnrollDto,
    responses(
        (status = 200, description = "Admission enrolled and student created", body = ApproveEnrollResponse),
        (status = 400, description = "Class does not belong to the institution"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Admission not found"),
        (status = 409, description = "Not enrollable, already enrolled, or roll number taken")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn approve_and_enroll(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<ApproveEnrollDto>,
) -> Result<ApiResponse<ApproveEnrollResponse>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let result =
        AdmissionService::approve_and_enroll(&state.db, id, scope, auth_user.user_id(), dto)
            .await?;
    Ok(ApiResponse::success(result))
}

/// Reject an admission with a reason
#[utoipa::path(
    put,
    path = "/api/v1/admissions/{id}/reject",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    request_body = RejectAdmissionDto,
    responses(
        (status = 200, description = "Admission rejected", body = Admission),
        (status = 400, description = "Missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Admission not found"),
        (status = 409, description = "Admission can no longer be rejected")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn reject_admission(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<AdmissionId>,
    ValidatedJson(dto): ValidatedJson<RejectAdmissionDto>,
) -> Result<ApiResponse<Admission>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let admission = AdmissionService::reject_admission(
        &state.db,
        id,
        scope,
        &dto.reason,
        auth_user.user_id(),
    )
    .await?;
    Ok(ApiResponse::success(admission))
}

/// Delete an admission that has no student record
#[utoipa::path(
    delete,
    path = "/api/v1/admissions/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Admission ID")
    ),
    responses(
        (status = 200, description = "Admission deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Admission not found"),
        (status = 409, description = "Admission has a student record")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_admission(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<AdmissionId>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let scope = resource_scope(&auth_user)?;
    AdmissionService::delete_admission(&state.db, id, scope).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Admission deleted successfully",
    )))
}

/// Admission counts by status
#[utoipa::path(
    get,
    path = "/api/v1/admissions/stats/overview",
    params(StatsOverviewParams),
    responses(
        (status = 200, description = "Counts per status", body = AdmissionStatsOverview),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_stats_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<StatsOverviewParams>,
) -> Result<ApiResponse<AdmissionStatsOverview>, AppError> {
    let scope = resolve_scope(&auth_user, params.institution_id)?;
    let overview = AdmissionService::stats_overview(&state.db, scope, params).await?;
    Ok(ApiResponse::success(overview))
}

/// Daily admission counts by status in the caller's time zone
#[utoipa::path(
    get,
    path = "/api/v1/admissions/stats/trends",
    params(TrendParams),
    responses(
        (status = 200, description = "Zero-filled daily series", body = AdmissionTrends),
        (status = 400, description = "Unknown timezone or days out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Admissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_stats_trends(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<TrendParams>,
) -> Result<ApiResponse<AdmissionTrends>, AppError> {
    let scope = resolve_scope(&auth_user, params.institution_id)?;
    let trends = AdmissionService::stats_trends(&state.db, scope, params).await?;
    Ok(ApiResponse::success(trends))
}
