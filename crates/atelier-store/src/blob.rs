//! Blob encoding and content hashing.
//!
//! Values are serialized to MessagePack blobs; every blob is addressed by
//! the hex SHA-256 of its bytes, recorded in the metadata database and
//! re-verified on read.

use crate::error::{Result, StoreError};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Hex SHA-256 of a byte slice
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 of a file's content
pub fn file_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(content_hash(&bytes))
}

/// Serialize a value to its blob form
pub fn encode_value(value: &serde_json::Value) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec(value)?)
}

/// Deserialize a blob back into a value
pub fn decode_value(bytes: &[u8]) -> Result<serde_json::Value> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Write a blob, creating parent directories as needed
pub fn write_blob(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a blob; a missing file is `None`, not an error
pub fn read_blob(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Display form of a hash: the first 12 hex chars. Anything shorter (a
/// hand-edited database row, say) passes through whole instead of panicking.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

/// Validate a record name (it becomes a file name on disk)
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_stable_hex() {
        let h = content_hash(b"atelier");
        assert_eq!(h.len(), 64);
        assert_eq!(h, content_hash(b"atelier"));
        assert_ne!(h, content_hash(b"atelier!"));
    }

    #[test]
    fn value_round_trips_through_blob() {
        let value = json!({"rows": [1, 2, 3], "label": "fit", "ok": true});
        let bytes = encode_value(&value).unwrap();
        assert_eq!(decode_value(&bytes).unwrap(), value);
    }

    #[test]
    fn missing_blob_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_blob(&dir.path().join("nope.bin")).unwrap().is_none());
    }

    #[test]
    fn short_hash_tolerates_short_input() {
        let h = content_hash(b"atelier");
        assert_eq!(short_hash(&h), &h[..12]);
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash(""), "");
    }

    #[test]
    fn names_are_validated() {
        assert!(validate_name("model_fit-v2.1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("with space").is_err());
    }
}
