pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod log;
