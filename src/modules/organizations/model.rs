//! Re-exports organization models from `campusdesk-models`.

pub use campusdesk_models::organizations::*;
