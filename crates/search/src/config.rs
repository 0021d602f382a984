//! Configuration via `sealdex.toml`
//!
//! Holds the values an application needs to open an index consistently:
//! gram size, cipher, key file and stop-word list. Index and query must use
//! the same `ngram_size`.

use crate::error::{Error, Result};
use crate::stopwords::StopWords;
use sealdex_crypto::{cipher_from_id, identity, KeyMaterial, TermCipher, CIPHER_IDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "sealdex.toml";

/// Key file used when none is configured
pub const DEFAULT_KEY_FILE: &str = "sealdex.key";

/// Configuration loaded from `sealdex.toml`.
///
/// # Example
///
/// ```toml
/// ngram_size = 3
/// cipher = "aes-gcm-det"
/// key_file = "/etc/sealdex/index.key"
/// # stop_words_file = "stop_words.csv"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealdexConfig {
    /// Gram size: 0 for whole words, 3 or more for n-grams
    #[serde(default)]
    pub ngram_size: i32,
    /// Cipher identifier: `"aes-gcm-det"` or `"identity"`
    #[serde(default = "default_cipher")]
    pub cipher: String,
    /// Key file (raw bytes or hex); required by `"aes-gcm-det"`
    ///
    /// A relative path is resolved against the process working directory,
    /// not the directory holding the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
    /// Comma-separated stop-word file; the bundled English list if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words_file: Option<PathBuf>,
}

fn default_cipher() -> String {
    sealdex_crypto::deterministic::CIPHER_ID.to_string()
}

impl Default for SealdexConfig {
    fn default() -> Self {
        Self {
            ngram_size: 0,
            cipher: default_cipher(),
            key_file: Some(PathBuf::from(DEFAULT_KEY_FILE)),
            stop_words_file: None,
        }
    }
}

impl SealdexConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Sealdex index configuration
#
# Gram size: 0 = index whole words; 3 or more = split words into n-character grams.
# 1 and 2 are coerced to 0. Queries must use the same value as indexing.
ngram_size = 0

# Cipher for terms and document IDs: "aes-gcm-det" (default) or "identity" (no encryption).
cipher = "aes-gcm-det"

# Key file holding 16, 24 or 32 raw bytes, or the same as hex text.
key_file = "sealdex.key"

# Comma-separated stop-word list. Defaults to the bundled English list.
# stop_words_file = "stop_words.csv"
"#
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SealdexConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Check field values
    pub fn validate(&self) -> Result<()> {
        if !CIPHER_IDS.contains(&self.cipher.as_str()) {
            return Err(Error::Config(format!(
                "Invalid cipher '{}'. Expected one of: {}",
                self.cipher,
                CIPHER_IDS.join(", ")
            )));
        }
        if self.cipher != identity::CIPHER_ID && self.key_file.is_none() {
            return Err(Error::Config(format!(
                "Cipher '{}' requires key_file",
                self.cipher
            )));
        }
        Ok(())
    }

    /// Load the configured stop-word set
    pub fn stop_words(&self) -> Result<Arc<StopWords>> {
        let stop_words = match &self.stop_words_file {
            Some(path) => StopWords::from_file(path)?,
            None => StopWords::english(),
        };
        Ok(Arc::new(stop_words))
    }

    /// Build the configured cipher, reading the key file if needed
    pub fn cipher(&self) -> Result<Arc<dyn TermCipher>> {
        let key = match &self.key_file {
            Some(path) if self.cipher != identity::CIPHER_ID => Some(KeyMaterial::from_file(path)?),
            _ => None,
        };
        Ok(cipher_from_id(&self.cipher, key.as_ref())?)
    }
}
