//! # Campusdesk Auth
//!
//! Stateless bearer tokens. A token identifies the user and nothing else:
//! role, institution and active flag are re-read from the database on every
//! request, so deactivating a user takes effect without revoking tokens.
//!
//! ```ignore
//! use campusdesk_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//! assert_eq!(claims.user_id()?, user_id);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
