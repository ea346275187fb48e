//! Re-exports student models from `campusdesk-models`.

pub use campusdesk_models::students::*;
