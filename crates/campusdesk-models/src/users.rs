//! User domain models and DTOs.

use crate::ids::{InstitutionId, OrganizationId, UserId};
use crate::text_enum::{UnknownVariant, impl_text_enum};
use campusdesk_core::{PaginationMeta, PaginationParams};
use campusdesk_core::serde::{deserialize_optional_bool, deserialize_optional_parsed};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Fixed set of roles. Authorization is a flat allow-list over these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    SchoolAdmin,
    Teacher,
    Student,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::SuperAdmin,
        UserRole::SchoolAdmin,
        UserRole::Teacher,
        UserRole::Student,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::SchoolAdmin => "school_admin",
            UserRole::Teacher => "teacher",
            UserRole::Student => "student",
        }
    }

    /// `super_admin` or `school_admin`.
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::SchoolAdmin)
    }

    /// Admins plus teachers.
    pub const fn is_staff(&self) -> bool {
        self.is_admin() || matches!(self, UserRole::Teacher)
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "user role",
                value: s.to_string(),
            })
    }
}

impl_text_enum!(UserRole);

/// A user row. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    pub role: UserRole,
    pub organization_id: Option<OrganizationId>,
    pub institution_id: Option<InstitutionId>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: UserRole,
    /// Ignored for school admins, who always create users in their own institution.
    pub institution_id: Option<InstitutionId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub role: Option<UserRole>,
    /// Super admins only; ignored for everyone else
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("principal".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_and_staff_sets() {
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(UserRole::SchoolAdmin.is_admin());
        assert!(!UserRole::Teacher.is_admin());
        assert!(UserRole::Teacher.is_staff());
        assert!(!UserRole::Student.is_staff());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: UserId::new(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            email: "ada@example.com".into(),
            password: "$2b$12$hash".into(),
            role: UserRole::Teacher,
            organization_id: None,
            institution_id: Some(InstitutionId::new()),
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "teacher");
    }
}
