//! # Campusdesk Models
//!
//! Domain models and DTOs shared by the API server and the maintenance CLI:
//! database rows (`sqlx::FromRow`), request bodies (`validator::Validate`)
//! and response shapes (`utoipa::ToSchema`).
//!
//! - [`admissions`]: the admission lifecycle and its analytics
//! - [`students`], [`fees`]: records that exist after enrollment
//! - [`organizations`], [`institutions`], [`classes`], [`users`]: tenancy and access
//! - [`ids`]: typed UUID wrappers for every entity

pub mod admissions;
pub mod auth;
pub mod classes;
pub mod fees;
pub mod ids;
pub mod institutions;
pub mod organizations;
pub mod students;
mod text_enum;
pub mod users;
pub mod validation;

pub use text_enum::UnknownVariant;

pub use admissions::{
    Admission, AdmissionFilterParams, AdmissionStatsOverview, AdmissionStatus, AdmissionTrends,
    ApproveEnrollDto, ApproveEnrollResponse, CreateAdmissionDto, PaginatedAdmissionsResponse,
    RejectAdmissionDto, StatsOverviewParams, StatusCounts, TransitionError, TrendParams,
    UpdateAdmissionDto, UpdateAdmissionStatusDto,
};
pub use auth::{LoginRequest, LoginResponse};
pub use classes::{
    Class, ClassFilterParams, ClassWithStats, CreateClassDto, PaginatedClassesResponse,
    UpdateClassDto,
};
pub use fees::{
    CreateFeeDto, FeeFilterParams, FeeStatus, PaginatedFeesResponse, PaymentError,
    RecordPaymentDto, StudentFee,
};
pub use institutions::{
    CreateInstitutionDto, Institution, InstitutionFilterParams, InstitutionType,
    PaginatedInstitutionsResponse, UpdateInstitutionDto,
};
pub use organizations::{
    CreateOrganizationDto, Organization, OrganizationFilterParams, PaginatedOrganizationsResponse,
    UpdateOrganizationDto,
};
pub use students::{PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto};
pub use users::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams, UserRole,
};
