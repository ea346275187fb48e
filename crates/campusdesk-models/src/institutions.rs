//! Institutions are the tenant boundary. Admissions, students, classes and
//! fees all belong to exactly one institution.

use crate::ids::{InstitutionId, OrganizationId};
use crate::text_enum::{UnknownVariant, impl_text_enum};
use campusdesk_core::{PaginationMeta, PaginationParams};
use campusdesk_core::serde::{
    deserialize_optional_bool, deserialize_optional_parsed, deserialize_optional_string,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    #[default]
    School,
    College,
}

impl InstitutionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InstitutionType::School => "school",
            InstitutionType::College => "college",
        }
    }
}

impl FromStr for InstitutionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "school" => Ok(InstitutionType::School),
            "college" => Ok(InstitutionType::College),
            other => Err(UnknownVariant {
                kind: "institution type",
                value: other.to_string(),
            }),
        }
    }
}

impl_text_enum!(InstitutionType);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Institution {
    pub id: InstitutionId,
    pub organization_id: OrganizationId,
    pub name: String,
    /// Prefix of every application number issued by this institution
    pub code: String,
    pub institution_type: InstitutionType,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInstitutionDto {
    pub organization_id: OrganizationId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 2, max = 32))]
    pub code: String,
    #[serde(default)]
    pub institution_type: InstitutionType,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInstitutionDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub institution_type: Option<InstitutionType>,
    pub address: Option<String>,
    /// Only a super admin may change this
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstitutionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub organization_id: Option<OrganizationId>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedInstitutionsResponse {
    pub data: Vec<Institution>,
    pub meta: PaginationMeta,
}
