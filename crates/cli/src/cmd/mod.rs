//! CLI command implementations

pub mod config;
pub mod delete;
pub mod gc;
pub mod list;
pub mod restore;
