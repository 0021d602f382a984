//! Identity cipher (no encryption).
//!
//! Keeps index keys readable. Meant for tests and for inspecting index
//! structure; never use it for data that must stay private.

use crate::traits::{CipherError, TermCipher};

/// Identifier of the identity cipher.
pub const CIPHER_ID: &str = "identity";

/// Passthrough cipher: ciphertext equals plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCipher;

impl TermCipher for IdentityCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        Ok(ciphertext.to_string())
    }

    fn cipher_id(&self) -> &str {
        CIPHER_ID
    }
}
