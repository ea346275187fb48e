//! Classes (grade + section) within an institution and academic year.

use crate::ids::{ClassId, InstitutionId};
use crate::validation::validate_academic_year;
use campusdesk_core::{PaginationMeta, PaginationParams};
use campusdesk_core::serde::{deserialize_optional_parsed, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: ClassId,
    pub institution_id: InstitutionId,
    pub name: String,
    pub section: String,
    pub academic_year: String,
    pub capacity: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A class with its current head count.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClassWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub student_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub section: String,
    /// Defaults to the current academic year
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
    #[validate(range(min = 1, max = 10000))]
    pub capacity: Option<i32>,
    /// Required for super admins, ignored for everyone else
    pub institution_id: Option<InstitutionId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub section: Option<String>,
    #[validate(range(min = 1, max = 10000))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<ClassWithStats>,
    pub meta: PaginationMeta,
}
