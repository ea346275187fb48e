//! # Campusdesk Config
//!
//! Configuration types loaded from environment variables:
//!
//! - [`academic`]: academic year boundaries and tag derivation
//! - [`cors`]: CORS allowed origins
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`rate_limit`]: request rate limiting for auth endpoints
//!
//! ```ignore
//! use campusdesk_config::{AcademicYearConfig, CorsConfig, JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let academic = AcademicYearConfig::from_env();
//! ```

pub mod academic;
pub mod cors;
pub mod jwt;
pub mod rate_limit;

pub use academic::{AcademicYear, AcademicYearConfig, AcademicYearError};
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
