//! Classes: the sections students are enrolled into for an academic year.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
