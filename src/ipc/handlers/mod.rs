pub mod assignments;
pub mod attendance;
pub mod classrooms;
pub mod core;
pub mod reports;
pub mod setup;
