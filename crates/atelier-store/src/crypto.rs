//! Blind-result encryption (XSalsa20Poly1305 secretbox).
//!
//! Each project carries a 32-byte key at `.atelier/key` (base64 on disk,
//! 0o600 on unix), created on demand. Ciphertexts carry their random
//! 24-byte nonce as a prefix.

use crate::error::{Result, StoreError};
use base64::Engine as _;
use rand::RngCore;
use std::path::{Path, PathBuf};
use xsalsa20poly1305::aead::{Aead, KeyInit, OsRng};
use xsalsa20poly1305::{Key, Nonce, XSalsa20Poly1305};

const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;

/// Per-project symmetric key
pub struct ProjectKey {
    key: [u8; KEY_LEN],
}

impl ProjectKey {
    /// Path of the key file under a project root
    pub fn path(root: &Path) -> PathBuf {
        root.join(".atelier").join("key")
    }

    /// Load the project key, generating and persisting one if absent.
    pub fn load_or_create(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if path.exists() {
            return Self::load(&path);
        }

        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(key);
        std::fs::write(&path, encoded)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(Self { key })
    }

    fn load(path: &Path) -> Result<Self> {
        let encoded = std::fs::read_to_string(path)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| StoreError::Key(format!("{}: {}", path.display(), e)))?;
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| StoreError::Key(format!("{}: wrong key length", path.display())))?;
        Ok(Self { key })
    }

    /// Build a key from raw bytes (tests and key rotation)
    pub fn from_bytes(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext; the returned bytes are nonce || ciphertext.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = XSalsa20Poly1305::new(Key::from_slice(&self.key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| StoreError::Encryption("secretbox encryption failed".to_string()))?;

        let mut out = nonce_bytes.to_vec();
        out.extend(ciphertext);
        Ok(out)
    }

    /// Decrypt nonce-prefixed bytes. Any failure is fatal: a blind result
    /// that cannot be decrypted must never degrade to a soft miss.
    pub fn decrypt(&self, data: &[u8], name: &str) -> Result<Vec<u8>> {
        if data.len() <= NONCE_LEN {
            return Err(StoreError::Decryption(name.to_string()));
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let cipher = XSalsa20Poly1305::new(Key::from_slice(&self.key));
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| StoreError::Decryption(name.to_string()))
    }
}

impl std::fmt::Debug for ProjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        f.debug_struct("ProjectKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = ProjectKey::from_bytes([7u8; 32]);
        let sealed = key.encrypt(b"confidential result").unwrap();
        assert_ne!(&sealed[NONCE_LEN..], b"confidential result");
        let open = key.decrypt(&sealed, "r1").unwrap();
        assert_eq!(open, b"confidential result");
    }

    #[test]
    fn wrong_key_is_fatal() {
        let key = ProjectKey::from_bytes([7u8; 32]);
        let sealed = key.encrypt(b"secret").unwrap();
        let other = ProjectKey::from_bytes([8u8; 32]);
        assert!(matches!(
            other.decrypt(&sealed, "r1"),
            Err(StoreError::Decryption(_))
        ));
    }

    #[test]
    fn key_is_created_once_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let first = ProjectKey::load_or_create(dir.path()).unwrap();
        let second = ProjectKey::load_or_create(dir.path()).unwrap();

        let sealed = first.encrypt(b"payload").unwrap();
        assert_eq!(second.decrypt(&sealed, "x").unwrap(), b"payload");
    }

    #[test]
    fn truncated_ciphertext_is_fatal() {
        let key = ProjectKey::from_bytes([1u8; 32]);
        assert!(key.decrypt(&[0u8; 10], "x").is_err());
    }
}
