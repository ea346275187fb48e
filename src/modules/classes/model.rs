//! Re-exports class models from `campusdesk-models`.

pub use campusdesk_models::classes::*;
