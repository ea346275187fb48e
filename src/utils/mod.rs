//! Shared helpers for controllers.
//!
//! - [`auth_helpers`]: institution scoping for the authenticated caller

pub mod auth_helpers;
