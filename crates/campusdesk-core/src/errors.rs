//! Application error type.
//!
//! Every fallible handler and service returns [`AppError`], which pairs an
//! HTTP status with an [`anyhow::Error`] cause. Converting it into a response
//! produces the `{ "success": false, "message": ... }` envelope.
//!
//! Server errors (5xx) are logged with their full cause and rendered with a
//! generic message so internal details never leak to clients.
//!
//! Any error convertible into [`anyhow::Error`] can be propagated with `?`.
//! Database errors are classified on the way in:
//!
//! | `sqlx::Error`                 | Status |
//! |-------------------------------|--------|
//! | `RowNotFound`                 | 404    |
//! | unique violation              | 409    |
//! | foreign key violation         | 409    |
//! | check violation               | 400    |
//! | anything else                 | 500    |

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    /// Malformed or missing input. Rendered as 400.
    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::bad_request(err)
    }

    /// Illegal state transition or an operation blocked by dependents.
    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// The message a client will see for this error.
    pub fn client_message(&self) -> String {
        if self.status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:#}", self.status, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let err: Error = err.into();
        let status = match err.downcast_ref::<sqlx::Error>() {
            Some(db_err) => classify_sqlx_error(db_err),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let err = match status {
            StatusCode::NOT_FOUND => anyhow::anyhow!("Resource not found"),
            StatusCode::CONFLICT => anyhow::anyhow!("Operation conflicts with existing records"),
            StatusCode::BAD_REQUEST => anyhow::anyhow!("Request violates a data constraint"),
            _ => err,
        };

        AppError::new(status, err)
    }
}

fn classify_sqlx_error(err: &sqlx::Error) -> StatusCode {
    match err {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StatusCode::CONFLICT,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => StatusCode::CONFLICT,
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
