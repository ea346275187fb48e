//! Organizations. Managed by super admins only.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
