//! Enrolled students. Records are created only by approve-and-enroll,
//! so this module reads and edits but never inserts or deletes.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
