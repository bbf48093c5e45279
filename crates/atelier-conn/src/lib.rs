//! Atelier - Connection Factory
//!
//! Dispatches a config-declared driver name to a validated connection
//! recipe. Validation is strict and happens before any network activity;
//! opening a connection is a separate, explicit step.

pub mod config;
pub mod driver;
pub mod recipe;

pub use config::*;
pub use driver::*;
pub use recipe::*;
