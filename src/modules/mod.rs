pub mod admissions;
pub mod auth;
pub mod classes;
pub mod fees;
pub mod institutions;
pub mod organizations;
pub mod students;
pub mod users;
