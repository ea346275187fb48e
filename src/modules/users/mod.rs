//! User management for administrators.
//!
//! School admins manage teachers and students of their own institution.
//! Only super admins can create or edit administrators.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
