pub mod attendance;
pub mod backend;
pub mod curriculum;
pub mod db;
pub mod error;
pub mod ipc;
pub mod model;
pub mod report;
pub mod roster;
