//! Error types for the metadata store

use thiserror::Error;

/// Store error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid name `{0}`: names are alphanumeric with `_`, `-`, `.`")]
    InvalidName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Blob encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Blob decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed for blind result `{0}` (wrong or missing project key)")]
    Decryption(String),

    #[error("Project key error: {0}")]
    Key(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
