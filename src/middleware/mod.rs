//! Authentication and authorization.
//!
//! - [`auth`]: the [`auth::AuthUser`] extractor (bearer token + live user row)
//! - [`role`]: role-gating middleware and extractors
//!
//! ```ignore
//! Router::new()
//!     .nest("/admissions", init_admissions_router()
//!         .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)))
//! ```

pub mod auth;
pub mod role;
