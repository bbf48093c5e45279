//! Atelier - Core Library
//!
//! Settings model, config merge engine, project scaffolding, and
//! project-local utilities for reproducible data-analysis projects.

pub mod envfile;
pub mod error;
pub mod hooks;
pub mod scaffold;
pub mod settings;

pub use envfile::*;
pub use error::*;
pub use hooks::*;
pub use scaffold::*;
pub use settings::*;
