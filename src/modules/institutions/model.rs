//! Re-exports institution models from `campusdesk-models`.

pub use campusdesk_models::institutions::*;
