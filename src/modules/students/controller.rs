use axum::extract::{Path, Query, State};
use tracing::instrument;

use campusdesk_core::{ApiResponse, AppError};
use campusdesk_models::ids::StudentId;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::students::model::{
    PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::auth_helpers::{resolve_scope, resource_scope};
use crate::validator::ValidatedJson;

/// List students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Paginated students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<StudentFilterParams>,
) -> Result<ApiResponse<PaginatedStudentsResponse>, AppError> {
    let scope = resolve_scope(&auth_user, filters.institution_id)?;
    let students = StudentService::list_students(&state.db, scope, filters).await?;
    Ok(ApiResponse::success(students))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires staff role"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<ApiResponse<Student>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let student = StudentService::get_student(&state.db, id, scope).await?;
    Ok(ApiResponse::success(student))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Invalid input or foreign class"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_student(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<ApiResponse<Student>, AppError> {
    let scope = resource_scope(&auth_user)?;
    let student = StudentService::update_student(&state.db, id, scope, dto).await?;
    Ok(ApiResponse::success(student))
}
