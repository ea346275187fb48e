use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use campusdesk_core::{MessageResponse, PaginationMeta, PaginationParams};
use campusdesk_models::admissions::TrendDay;
use campusdesk_models::{
    Admission, AdmissionStatsOverview, AdmissionStatus, AdmissionTrends, ApproveEnrollDto,
    ApproveEnrollResponse, Class, ClassWithStats, CreateAdmissionDto, CreateClassDto,
    CreateFeeDto, CreateInstitutionDto, CreateOrganizationDto, CreateUserDto, FeeStatus,
    Institution, InstitutionType, LoginRequest, LoginResponse, Organization,
    PaginatedAdmissionsResponse, PaginatedClassesResponse, PaginatedFeesResponse,
    PaginatedInstitutionsResponse, PaginatedOrganizationsResponse, PaginatedStudentsResponse,
    PaginatedUsersResponse, RecordPaymentDto, RejectAdmissionDto, StatusCounts, Student,
    StudentFee, UpdateAdmissionDto, UpdateAdmissionStatusDto, UpdateClassDto,
    UpdateInstitutionDto, UpdateOrganizationDto, UpdateStudentDto, UpdateUserDto, User,
    UserRole,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_current_user,
        crate::modules::organizations::controller::create_organization,
        crate::modules::organizations::controller::get_organizations,
        crate::modules::organizations::controller::get_organization_by_id,
        crate::modules::organizations::controller::update_organization,
        crate::modules::organizations::controller::delete_organization,
        crate::modules::institutions::controller::create_institution,
        crate::modules::institutions::controller::get_institutions,
        crate::modules::institutions::controller::get_institution_by_id,
        crate::modules::institutions::controller::update_institution,
        crate::modules::institutions::controller::delete_institution,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user_by_id,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::deactivate_user,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class_by_id,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::admissions::controller::create_admission,
        crate::modules::admissions::controller::get_admissions,
        crate::modules::admissions::controller::get_admission_by_id,
        crate::modules::admissions::controller::update_admission,
        crate::modules::admissions::controller::update_admission_status,
        crate::modules::admissions::controller::approve_and_enroll,
        crate::modules::admissions::controller::reject_admission,
        crate::modules::admissions::controller::delete_admission,
        crate::modules::admissions::controller::get_stats_overview,
        crate::modules::admissions::controller::get_stats_trends,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student_by_id,
        crate::modules::students::controller::update_student,
        crate::modules::fees::controller::create_fee,
        crate::modules::fees::controller::get_fees,
        crate::modules::fees::controller::get_fee_by_id,
        crate::modules::fees::controller::record_payment,
        crate::modules::fees::controller::delete_fee,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            PaginatedUsersResponse,
            Organization,
            CreateOrganizationDto,
            UpdateOrganizationDto,
            PaginatedOrganizationsResponse,
            Institution,
            InstitutionType,
            CreateInstitutionDto,
            UpdateInstitutionDto,
            PaginatedInstitutionsResponse,
            Class,
            ClassWithStats,
            CreateClassDto,
            UpdateClassDto,
            PaginatedClassesResponse,
            Admission,
            AdmissionStatus,
            CreateAdmissionDto,
            UpdateAdmissionDto,
            UpdateAdmissionStatusDto,
            ApproveEnrollDto,
            ApproveEnrollResponse,
            RejectAdmissionDto,
            PaginatedAdmissionsResponse,
            StatusCounts,
            AdmissionStatsOverview,
            TrendDay,
            AdmissionTrends,
            Student,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            StudentFee,
            FeeStatus,
            CreateFeeDto,
            RecordPaymentDto,
            PaginatedFeesResponse,
            MessageResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and current user"),
        (name = "Organizations", description = "Organization management (super admin)"),
        (name = "Institutions", description = "Institution management"),
        (name = "Users", description = "Staff and student accounts"),
        (name = "Classes", description = "Classes per academic year"),
        (name = "Admissions", description = "Admission lifecycle and analytics"),
        (name = "Students", description = "Enrolled students"),
        (name = "Fees", description = "Student fees and payments")
    ),
    info(
        title = "Campusdesk API",
        version = "0.1.0",
        description = "Multi-tenant school administration API built around the admission lifecycle.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_router_prefix_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/login",
            "/api/v1/organizations",
            "/api/v1/institutions/{id}",
            "/api/v1/users/{id}/deactivate",
            "/api/v1/classes",
            "/api/v1/admissions/{id}/approve-enroll",
            "/api/v1/admissions/stats/trends",
            "/api/v1/students/{id}",
            "/api/v1/fees/{id}/payments",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
