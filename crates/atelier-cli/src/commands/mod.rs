//! CLI command implementations

pub mod cache;
pub mod connections;
pub mod data;
pub mod env;
pub mod hooks;
pub mod init;
pub mod results;
pub mod serve;
pub mod settings;
pub mod status;
