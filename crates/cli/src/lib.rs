//! Library surface of the `trash` binary, shared with its integration tests

pub mod cmd;
pub mod locks;
pub mod session;
pub mod system_config;
pub mod util;
