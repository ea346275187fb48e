use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use campusdesk_auth::{Claims, verify_token};
use campusdesk_core::AppError;
use campusdesk_models::ids::{InstitutionId, UserId};
use campusdesk_models::{User, UserRole};

use crate::state::AppState;

/// The authenticated caller.
///
/// The token only proves who the caller is; the user row is loaded on every
/// request so role changes and deactivation apply immediately. Once loaded,
/// the value is cached in the request extensions so a role layer and the
/// handler share one lookup.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub user: User,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn institution_id(&self) -> Option<InstitutionId> {
        self.user.institution_id
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.role == UserRole::SuperAdmin
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.user.role)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<AuthUser>() {
            return Ok(cached.clone());
        }

        let claims = verify_token(bearer_token(parts)?, &state.jwt_config)?;
        let user_id = UserId::from(claims.user_id()?);

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        if !user.is_active {
            return Err(AppError::unauthorized("Account is deactivated"));
        }

        let auth_user = AuthUser { claims, user };
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}
