//! Deterministic AES-256-GCM term cipher.
//!
//! Construction (synthetic IV):
//! - `enc_key = HMAC-SHA256(master, "sealdex/aes-gcm-det/enc")`
//! - `siv_key = HMAC-SHA256(master, "sealdex/aes-gcm-det/siv")`
//! - `nonce   = HMAC-SHA256(siv_key, plaintext)[..12]`
//! - output   = `base64url(nonce || AES-256-GCM(enc_key, nonce, plaintext))`
//!
//! The nonce is a function of the plaintext, so equal plaintexts produce equal
//! ciphertexts and distinct plaintexts never reuse a nonce. Decryption checks
//! the GCM tag and then recomputes the synthetic IV.

use crate::key::KeyMaterial;
use crate::traits::{CipherError, TermCipher};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Identifier of the deterministic AES cipher.
pub const CIPHER_ID: &str = "aes-gcm-det";

/// Synthetic IV / GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
const TAG_SIZE: usize = 16;

/// Minimum decoded ciphertext size: nonce + tag (empty plaintext).
const MIN_CIPHERTEXT_LEN: usize = NONCE_SIZE + TAG_SIZE;

const ENC_KEY_LABEL: &[u8] = b"sealdex/aes-gcm-det/enc";
const SIV_KEY_LABEL: &[u8] = b"sealdex/aes-gcm-det/siv";

/// Equality-preserving AES-256-GCM cipher.
pub struct DeterministicAesCipher {
    cipher: Aes256Gcm,
    siv_key: Zeroizing<[u8; 32]>,
}

impl DeterministicAesCipher {
    /// Build the cipher from master key material.
    pub fn new(key: &KeyMaterial) -> Result<Self, CipherError> {
        let enc_key = derive_subkey(key.as_bytes(), ENC_KEY_LABEL)?;
        let siv_key = derive_subkey(key.as_bytes(), SIV_KEY_LABEL)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&enc_key[..]));
        Ok(Self { cipher, siv_key })
    }

    fn siv_mac(&self) -> Result<HmacSha256, CipherError> {
        <HmacSha256 as Mac>::new_from_slice(&self.siv_key[..])
            .map_err(|e| CipherError::InvalidKey(e.to_string()))
    }

    fn synthetic_iv(&self, plaintext: &[u8]) -> Result<[u8; NONCE_SIZE], CipherError> {
        let mut mac = self.siv_mac()?;
        mac.update(plaintext);
        let digest = mac.finalize().into_bytes();
        let mut iv = [0u8; NONCE_SIZE];
        iv.copy_from_slice(&digest[..NONCE_SIZE]);
        Ok(iv)
    }
}

fn derive_subkey(master: &[u8], label: &[u8]) -> Result<Zeroizing<[u8; 32]>, CipherError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(master)
        .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
    mac.update(label);
    let mut subkey = Zeroizing::new([0u8; 32]);
    subkey.copy_from_slice(&mac.finalize().into_bytes());
    Ok(subkey)
}

impl TermCipher for DeterministicAesCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let iv = self.synthetic_iv(plaintext.as_bytes())?;
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| CipherError::encrypt("AES-GCM encryption failed", CIPHER_ID))?;

        let mut output = Vec::with_capacity(NONCE_SIZE + sealed.len());
        output.extend_from_slice(&iv);
        output.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(output))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let data = URL_SAFE_NO_PAD
            .decode(ciphertext.trim())
            .map_err(|e| CipherError::decrypt(format!("invalid base64: {}", e), CIPHER_ID, ciphertext.len()))?;

        if data.len() < MIN_CIPHERTEXT_LEN {
            return Err(CipherError::decrypt(
                format!("ciphertext shorter than {} bytes", MIN_CIPHERTEXT_LEN),
                CIPHER_ID,
                data.len(),
            ));
        }

        let (iv, sealed) = data.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(iv), sealed)
            .map_err(|_| CipherError::decrypt("authentication failed", CIPHER_ID, data.len()))?;

        let mut mac = self.siv_mac()?;
        mac.update(&plaintext);
        mac.verify_truncated_left(iv)
            .map_err(|_| CipherError::decrypt("synthetic IV mismatch", CIPHER_ID, data.len()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CipherError::decrypt("plaintext is not valid UTF-8", CIPHER_ID, data.len()))
    }

    fn cipher_id(&self) -> &str {
        CIPHER_ID
    }
}

impl std::fmt::Debug for DeterministicAesCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeterministicAesCipher").finish_non_exhaustive()
    }
}
