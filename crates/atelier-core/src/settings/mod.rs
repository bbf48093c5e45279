//! Settings documents: discovery, typed sections, merge, migration.

pub mod merge;
pub mod migrate;
pub mod model;

pub use merge::{effective_settings, merge, resolve_placeholders, resolve_split_files};
pub use migrate::{migrate, needs_migration, SETTINGS_VERSION};
pub use model::{AiSettings, GitSettings, Settings, SETTINGS_FILE_NAMES, SKELETON_YAML};
