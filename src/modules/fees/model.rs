//! Re-exports fee models from `campusdesk-models`.

pub use campusdesk_models::fees::*;
