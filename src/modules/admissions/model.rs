//! Re-exports admission models from `campusdesk-models`.

pub use campusdesk_models::admissions::*;
pub use campusdesk_models::students::Student;
