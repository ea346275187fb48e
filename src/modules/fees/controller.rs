use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError, MessageResponse};
use campusdesk_models::ids::FeeId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::fees::model::{
    CreateFeeDto, FeeFilterParams, PaginatedFeesResponse, RecordPaymentDto, StudentFee,
};
use crate::modules::fees::service::FeeService;
use crate::state::AppState;
use crate::utils::auth_helpers::{resolve_scope, resource_scope};
use crate::validator::ValidatedJson;

/// Charge a fee to a student
#[utoipa::path(
    post,
    path = "/api/v1/fees",
    request_body = CreateFeeDto,
    responses(
        (status = 201, description = "Fee created", body = StudentFee),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Student not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_fee(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateFeeDto>,
) -> Result<ApiResponse<StudentFee>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let fee = FeeService::create_fee(&state.db, scope, dto).await?;
    Ok(ApiResponse::created(fee))
}

/// List fees
#[utoipa::path(
    get,
    path = "/api/v1/fees",
    params(FeeFilterParams),
    responses(
        (status = 200, description = "Paginated fees", body = PaginatedFeesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_fees(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<FeeFilterParams>,
) -> Result<ApiResponse<PaginatedFeesResponse>, AppError> {
    let scope = resolve_scope(&auth_user, filters.institution_id)?;
    let fees = FeeService::list_fees(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(fees))
}

/// Get a fee by ID
#[utoipa::path(
    get,
    path = "/api/v1/fees/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Fee ID")
    ),
    responses(
        (status = 200, description = "Fee details", body = StudentFee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role"),
        (status = 404, description = "Fee not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_fee_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<FeeId>,
) -> Result<ApiResponse<StudentFee>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let fee = FeeService::get_fee(&state.db, id, scope).await?;
    Ok(ApiResponse::success(fee))
}

/// Record a payment against a fee
#[utoipa::path(
    post,
    path = "/api/v1/fees/{id}/payments",
    params(
        ("id" = uuid::Uuid, Path, description = "Fee ID")
    ),
    request_body = RecordPaymentDto,
    responses(
        (status = 200, description = "Payment recorded", body = StudentFee),
        (status = 400, description = "Non-positive amount or overpayment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Fee not found")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn record_payment(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<FeeId>,
    ValidatedJson(dto): ValidatedJson<RecordPaymentDto>,
) -> Result<ApiResponse<StudentFee>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let fee = FeeService::record_payment(&state.db, id, scope, dto.amount).await?;
    Ok(ApiResponse::success(fee))
}

/// Delete an unpaid fee
#[utoipa::path(
    delete,
    path = "/api/v1/fees/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Fee ID")
    ),
    responses(
        (status = 200, description = "Fee deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Fee not found"),
        (status = 409, description = "Fee has recorded payments")
    ),
    tag = "Fees",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_fee(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<FeeId>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let scope = resource_scope(&auth_user)?;
    FeeService::delete_fee(&state.db, id, scope).await?;
    Ok(ApiResponse::success(MessageResponse::new(
        "Fee deleted successfully",
    )))
}
