//! Role gates.
//!
//! Roles are a flat allow-list. Whole routers are gated with the
//! `require_*` middleware; individual handlers that need a stricter role
//! than their router take a [`RequireAdmin`] or [`RequireSuperAdmin`]
//! extractor instead of [`AuthUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use campusdesk_core::AppError;
use campusdesk_models::UserRole;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const ADMIN_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::SchoolAdmin];
pub const STAFF_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::SchoolAdmin, UserRole::Teacher];

pub fn check_any_role(auth_user: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    if auth_user.has_any_role(allowed) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Access denied for role {}",
            auth_user.role()
        )))
    }
}

/// Authenticates the request and rejects roles outside `allowed`.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    check_any_role(&auth_user, allowed)?;
    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_super_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, &[UserRole::SuperAdmin])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, ADMIN_ROLES)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, STAFF_ROLES)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// `super_admin` or `school_admin`.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        if !auth_user.is_admin() {
            return Err(AppError::forbidden("Administrator privileges required"));
        }
        Ok(RequireAdmin(auth_user))
    }
}

#[derive(Debug, Clone)]
pub struct RequireSuperAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        if !auth_user.is_super_admin() {
            return Err(AppError::forbidden("Super administrator privileges required"));
        }
        Ok(RequireSuperAdmin(auth_user))
    }
}
