//! Term cipher trait definitions.

/// Deterministic string cipher used for index keys.
///
/// Every term and document identifier that reaches the index passes through
/// a `TermCipher` before it is stored or looked up.
///
/// # Determinism
///
/// Implementations MUST map identical plaintext under a fixed key to
/// identical ciphertext. Index lookups compare ciphertexts for equality, so a
/// randomized scheme would make every lookup miss. The flip side is that
/// repeated terms are visible as repeated ciphertexts to anyone who can read
/// a stored index.
///
/// # Thread Safety
///
/// Ciphers must be `Send + Sync` so a single instance can be shared behind an
/// `Arc` by the index and the scorer.
pub trait TermCipher: Send + Sync {
    /// Encrypt a plaintext string into its ciphertext key.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt a ciphertext key produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;

    /// Unique cipher identifier.
    fn cipher_id(&self) -> &str;
}

/// Cipher errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    /// Key material has an unsupported size or encoding.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("Encrypt error (cipher={cipher_id}): {detail}")]
    Encrypt {
        /// Human-readable error description
        detail: String,
        /// Cipher ID that attempted the encrypt
        cipher_id: String,
    },

    /// Decryption failed (bad encoding, authentication failure, corruption).
    ///
    /// Carries the cipher identity and data length so callers can
    /// distinguish a wrong-key error from a truncated ciphertext.
    #[error("Decrypt error (cipher={cipher_id}, data_len={data_len}): {detail}")]
    Decrypt {
        /// Human-readable error description
        detail: String,
        /// Cipher ID that attempted the decrypt
        cipher_id: String,
        /// Length of the data that failed to decrypt
        data_len: usize,
    },

    /// Unknown cipher identifier.
    #[error("Unknown cipher: {0}")]
    UnknownCipher(String),

    /// Reading key or document material failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CipherError {
    /// Create an encrypt error.
    pub fn encrypt(detail: impl Into<String>, cipher_id: impl Into<String>) -> Self {
        CipherError::Encrypt {
            detail: detail.into(),
            cipher_id: cipher_id.into(),
        }
    }

    /// Create a decrypt error with full diagnostic context.
    pub fn decrypt(detail: impl Into<String>, cipher_id: impl Into<String>, data_len: usize) -> Self {
        CipherError::Decrypt {
            detail: detail.into(),
            cipher_id: cipher_id.into(),
            data_len,
        }
    }
}

impl From<std::io::Error> for CipherError {
    fn from(e: std::io::Error) -> Self {
        CipherError::Io(e.to_string())
    }
}
