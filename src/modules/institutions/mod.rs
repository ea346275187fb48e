//! Institutions (schools and colleges), the tenancy boundary for
//! everything below them.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
