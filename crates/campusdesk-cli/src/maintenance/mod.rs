//! Consistency checks and repairs.
//!
//! Every repair is a dry run unless `apply` is set, in which case the fixes
//! run in a single transaction.

mod academic_years;
mod orphans;
mod timestamps;

pub use academic_years::{AcademicYearReport, YearMismatch, fix_academic_years};
pub use orphans::{LinkMismatch, OrphanReport, OrphanedAdmission, StrayStudent, audit_orphans};
pub use timestamps::{TIMESTAMPED_TABLES, TimestampReport, fix_timestamps};
