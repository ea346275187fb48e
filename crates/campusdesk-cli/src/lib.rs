//! # Campusdesk CLI
//!
//! Out-of-band administration for a Campusdesk database: bootstrapping the
//! first super admin, seeding development data, and auditing or repairing
//! records that drifted out of their invariants.
//!
//! ```ignore
//! use campusdesk_cli::maintenance::audit_orphans;
//!
//! let report = audit_orphans(&pool).await?;
//! if !report.is_clean() {
//!     std::process::exit(2);
//! }
//! ```

pub mod admin;
pub mod maintenance;
pub mod seeder;
