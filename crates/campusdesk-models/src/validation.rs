//! Custom `validator` rules shared by several DTOs.

use campusdesk_config::AcademicYear;
use std::borrow::Cow;
use validator::ValidationError;

/// Accepts tags like `"2026-2027"`.
pub fn validate_academic_year(value: &str) -> Result<(), ValidationError> {
    value.parse::<AcademicYear>().map(|_| ()).map_err(|err| {
        ValidationError::new("academic_year").with_message(Cow::Owned(err.to_string()))
    })
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}
