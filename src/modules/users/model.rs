//! Re-exports user models from `campusdesk-models`.

pub use campusdesk_models::users::*;
