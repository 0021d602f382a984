//! Master key material.
//!
//! Keys are 16, 24 or 32 bytes. They can be supplied as raw bytes, as a hex
//! string, or as a file holding either form. The raw bytes are zeroized when
//! the `KeyMaterial` is dropped.

use crate::traits::CipherError;
use std::path::Path;
use zeroize::Zeroize;

/// Accepted master key lengths in bytes.
pub const SUPPORTED_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Raw master key bytes, zeroized on drop.
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    /// Wrap raw key bytes, checking the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if !SUPPORTED_KEY_LENGTHS.contains(&bytes.len()) {
            return Err(CipherError::InvalidKey(format!(
                "unsupported key size: {} bytes (expected 16, 24 or 32)",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Parse a key from a hex string (32, 48 or 64 hex characters).
    pub fn from_hex(hex: &str) -> Result<Self, CipherError> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 {
            return Err(CipherError::InvalidKey(format!(
                "hex key has odd length {}",
                hex.len()
            )));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let pair = hex
                .get(i..i + 2)
                .ok_or_else(|| CipherError::InvalidKey(format!("non-ASCII hex at position {}", i)))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|e| CipherError::InvalidKey(format!("invalid hex at position {}: {}", i, e)))?;
            bytes.push(byte);
        }
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Load a key from a file.
    ///
    /// The file may contain either hex text (with optional trailing newline)
    /// or the raw key bytes. Content that is entirely hex digits is read as hex.
    pub fn from_file(path: &Path) -> Result<Self, CipherError> {
        let mut data = std::fs::read(path)?;

        let hex_text = std::str::from_utf8(&data).ok().filter(|text| {
            let text = text.trim();
            !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
        });

        let parsed = if let Some(text) = hex_text {
            Self::from_hex(text)
        } else if SUPPORTED_KEY_LENGTHS.contains(&data.len()) {
            Self::from_bytes(&data)
        } else {
            Err(CipherError::InvalidKey(
                "key file is neither raw key bytes nor hex text".to_string(),
            ))
        };
        data.zeroize();
        parsed
    }

    /// The key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; a `KeyMaterial` is never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.bytes.len())
            .finish()
    }
}
