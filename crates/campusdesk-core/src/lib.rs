//! # Campusdesk Core
//!
//! Core types, errors, and utilities for the Campusdesk API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination utilities for list endpoints
//! - [`password`]: Password hashing and verification
//! - [`response`]: The `{ success, data }` response envelope
//! - [`serde`]: Custom serde deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use campusdesk_core::{AppError, ApiResponse};
//!
//! async fn handler() -> Result<ApiResponse<String>, AppError> {
//!     Err(AppError::not_found(anyhow::anyhow!("Admission not found")))
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod response;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, MessageResponse};
