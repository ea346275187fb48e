//! Re-exports auth models from `campusdesk-models`.

pub use campusdesk_models::auth::*;
