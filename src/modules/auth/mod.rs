//! Login and the current-user endpoint.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
