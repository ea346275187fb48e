//! Institution scoping.
//!
//! A super admin may act on any institution. Everyone else is pinned to
//! their own, and any institution id they pass is ignored. Services take
//! the resolved scope as `Option<InstitutionId>`, where `None` means every
//! institution.

use campusdesk_core::AppError;
use campusdesk_models::ids::InstitutionId;

use crate::middleware::auth::AuthUser;

fn own_institution(auth_user: &AuthUser) -> Result<InstitutionId, AppError> {
    auth_user
        .institution_id()
        .ok_or_else(|| AppError::forbidden("User is not associated with an institution"))
}

/// Scope for reads. Super admins may narrow with `requested`.
pub fn resolve_scope(
    auth_user: &AuthUser,
    requested: Option<InstitutionId>,
) -> Result<Option<InstitutionId>, AppError> {
    if auth_user.is_super_admin() {
        return Ok(requested);
    }
    own_institution(auth_user).map(Some)
}

/// The single institution a new record is created in. Super admins must
/// name one.
pub fn resolve_target_institution(
    auth_user: &AuthUser,
    requested: Option<InstitutionId>,
) -> Result<InstitutionId, AppError> {
    if auth_user.is_super_admin() {
        return requested.ok_or_else(|| {
            AppError::validation(anyhow::anyhow!(
                "institution_id is required for super admins"
            ))
        });
    }
    own_institution(auth_user)
}

/// Scope for operations on an existing record by id.
pub fn resource_scope(auth_user: &AuthUser) -> Result<Option<InstitutionId>, AppError> {
    resolve_scope(auth_user, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use campusdesk_auth::Claims;
    use campusdesk_models::ids::UserId;
    use campusdesk_models::{User, UserRole};

    fn auth_user(role: UserRole, institution_id: Option<InstitutionId>) -> AuthUser {
        let id = UserId::new();
        AuthUser {
            claims: Claims {
                sub: id.to_string(),
                exp: 0,
                iat: 0,
            },
            user: User {
                id,
                first_name: "Test".into(),
                last_name: "User".into(),
                email: "t@example.com".into(),
                password: String::new(),
                role,
                organization_id: None,
                institution_id,
                is_active: true,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
        }
    }

    #[test]
    fn test_super_admin_scope_is_optional() {
        let admin = auth_user(UserRole::SuperAdmin, None);
        let wanted = InstitutionId::new();
        assert_eq!(resolve_scope(&admin, None).unwrap(), None);
        assert_eq!(resolve_scope(&admin, Some(wanted)).unwrap(), Some(wanted));
    }

    #[test]
    fn test_school_roles_are_pinned() {
        let own = InstitutionId::new();
        let other = InstitutionId::new();
        for role in [UserRole::SchoolAdmin, UserRole::Teacher] {
            let user = auth_user(role, Some(own));
            assert_eq!(resolve_scope(&user, Some(other)).unwrap(), Some(own));
            assert_eq!(resolve_target_institution(&user, Some(other)).unwrap(), own);
        }
    }

    #[test]
    fn test_super_admin_must_name_target() {
        let admin = auth_user(UserRole::SuperAdmin, None);
        let err = resolve_target_institution(&admin, None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unattached_user_is_forbidden() {
        let teacher = auth_user(UserRole::Teacher, None);
        let err = resolve_scope(&teacher, None).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
