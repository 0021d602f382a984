//! Term ciphers for sealdex
//!
//! This crate provides:
//! - TermCipher trait, the narrow encrypt/decrypt capability the index uses
//! - DeterministicAesCipher, an equality-preserving AES-256-GCM construction
//! - IdentityCipher for tests
//! - KeyMaterial loading from bytes, hex, or key files
//! - A small registry resolving cipher identifiers
//!
//! All ciphers are deterministic: the same plaintext under the same key
//! always yields the same ciphertext. Index lookups depend on this.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deterministic;
pub mod identity;
pub mod key;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

pub use deterministic::DeterministicAesCipher;
pub use identity::IdentityCipher;
pub use key::KeyMaterial;
pub use traits::{CipherError, TermCipher};

/// Every identifier [`cipher_from_id`] resolves.
pub const CIPHER_IDS: [&str; 2] = [deterministic::CIPHER_ID, identity::CIPHER_ID];

/// Resolve a cipher by identifier.
///
/// `"identity"` needs no key. `"aes-gcm-det"` requires key material.
pub fn cipher_from_id(
    cipher_id: &str,
    key: Option<&KeyMaterial>,
) -> Result<Arc<dyn TermCipher>, CipherError> {
    match cipher_id {
        identity::CIPHER_ID => Ok(Arc::new(IdentityCipher)),
        deterministic::CIPHER_ID => {
            let key = key.ok_or_else(|| {
                CipherError::InvalidKey(format!("cipher '{}' requires a key", cipher_id))
            })?;
            Ok(Arc::new(DeterministicAesCipher::new(key)?))
        }
        other => Err(CipherError::UnknownCipher(other.to_string())),
    }
}

/// Read a whole document and encrypt its content.
///
/// Used to store document bodies next to the index under the same key.
/// Recover the text with [`TermCipher::decrypt`].
pub fn encrypt_file(cipher: &dyn TermCipher, path: &Path) -> Result<String, CipherError> {
    let content = std::fs::read_to_string(path)?;
    cipher.encrypt(&content)
}
