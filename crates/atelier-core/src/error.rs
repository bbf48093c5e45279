//! Error types for Atelier

use thiserror::Error;

/// Main error type for Atelier
#[derive(Error, Debug)]
pub enum AtelierError {
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Settings file not found in {0}")]
    SettingsNotFound(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Connection config `{name}`: missing required field `{field}` for driver {driver}")]
    MissingField {
        name: String,
        driver: String,
        field: String,
    },

    #[error("Connection config `{name}`: {message}")]
    InvalidConnection { name: String, message: String },

    #[error("Driver not supported: {0}")]
    UnsupportedDriver(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption failed for blind result `{0}` (wrong or missing project key)")]
    Decryption(String),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AtelierError>;
