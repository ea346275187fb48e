//! Admissions: applications moving through review into enrollment.
//!
//! The status rules live on `AdmissionStatus` in the models crate; this
//! module applies them against the database with conditional updates so
//! that a concurrent change can never be silently overwritten.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
