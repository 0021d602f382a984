//! Encrypted inverted index
//!
//! This module provides:
//! - EncryptedInvertedIndex: ciphertext term → ciphertext document ID → positions
//! - add / delete / update mutation operations
//! - UpdateOutcome, the two-phase result of an update
//! - Lazy compaction of empty term buckets
//!
//! # Encryption Model
//!
//! Terms (grams) and document IDs are only ever stored and compared as
//! ciphertext. The cipher is deterministic, so encrypting the same gram twice
//! yields the same key and lookups work in the encrypted domain. Positions are
//! stored in plaintext: ranking needs to order and subtract them.
//!
//! # Usage
//!
//! ```
//! use sealdex_crypto::IdentityCipher;
//! use sealdex_search::{EncryptedInvertedIndex, StopWords};
//! use std::sync::Arc;
//!
//! let mut index = EncryptedInvertedIndex::new(Arc::new(IdentityCipher), Arc::new(StopWords::english()));
//! index.add("doc-a", &"the cat sat".into(), 0).unwrap();
//! assert!(index.contains_document("doc-a").unwrap());
//! ```

use crate::error::{Error, Result, ValidationStage};
use crate::ngram::generate_ngrams;
use crate::snapshot::IndexSnapshot;
use crate::stopwords::StopWords;
use crate::tokenizer::{tokenize_document, DocumentSource};
use sealdex_crypto::TermCipher;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Index Types
// ============================================================================

/// Plaintext positions of a term within one document
pub type Positions = BTreeSet<u32>;

/// Ciphertext document ID → positions
pub type PostingMap = BTreeMap<String, Positions>;

/// Ciphertext term → postings
pub type IndexMap = BTreeMap<String, PostingMap>;

// ============================================================================
// UpdateOutcome
// ============================================================================

/// Result of [`EncryptedInvertedIndex::update`]
///
/// Update is delete followed by add, and is not atomic. When the add phase
/// fails the document has already been removed; `Removed` carries the add
/// error so the caller can retry.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Old entries removed and new content indexed
    Updated,
    /// Old entries removed, new content rejected; the document is now absent
    Removed {
        /// Why the add phase failed
        cause: Error,
    },
}

impl UpdateOutcome {
    /// True if the new content is indexed
    pub fn is_complete(&self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

// ============================================================================
// EncryptedInvertedIndex
// ============================================================================

/// Inverted index whose term and document keys are ciphertext
///
/// # Thread Safety
///
/// Single writer. Mutations take `&mut self`; callers that share an index
/// must serialize access themselves.
///
/// # Empty Buckets
///
/// `delete` leaves term buckets in place even when they become empty.
/// Call [`compact`](Self::compact) to prune them.
pub struct EncryptedInvertedIndex {
    /// Term and document-ID cipher
    cipher: Arc<dyn TermCipher>,

    /// Stop-words applied when tokenizing added documents
    stop_words: Arc<StopWords>,

    /// Ciphertext term → ciphertext document ID → positions
    index: IndexMap,
}

impl EncryptedInvertedIndex {
    /// Create an empty index
    pub fn new(cipher: Arc<dyn TermCipher>, stop_words: Arc<StopWords>) -> Self {
        Self::from_map(cipher, stop_words, IndexMap::new())
    }

    /// Rebuild an index from an existing nested map (e.g. a loaded snapshot)
    pub fn from_map(cipher: Arc<dyn TermCipher>, stop_words: Arc<StopWords>, index: IndexMap) -> Self {
        EncryptedInvertedIndex {
            cipher,
            stop_words,
            index,
        }
    }

    /// Rebuild an index from a persisted snapshot
    pub fn from_snapshot(
        cipher: Arc<dyn TermCipher>,
        stop_words: Arc<StopWords>,
        snapshot: IndexSnapshot,
    ) -> Self {
        Self::from_map(cipher, stop_words, snapshot.into_map())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Read-only view of the full nested structure
    pub fn get_index(&self) -> &IndexMap {
        &self.index
    }

    /// Export the index for persistence
    pub fn to_snapshot(&self) -> IndexSnapshot {
        IndexSnapshot::new(self.index.clone())
    }

    /// The cipher used for keys
    pub fn cipher(&self) -> &Arc<dyn TermCipher> {
        &self.cipher
    }

    /// The stop-word set used at indexing time
    pub fn stop_words(&self) -> &Arc<StopWords> {
        &self.stop_words
    }

    /// Number of term buckets, including empty ones
    pub fn term_count(&self) -> usize {
        self.index.len()
    }

    /// Check if the index has no term buckets
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Lookup the postings of a plaintext gram
    ///
    /// Returns None if the gram is not indexed.
    pub fn lookup(&self, gram: &str) -> Result<Option<&PostingMap>> {
        let encrypted_gram = self.cipher.encrypt(gram)?;
        Ok(self.index.get(&encrypted_gram))
    }

    /// Check whether any term bucket holds entries for a document
    pub fn contains_document(&self, document_id: &str) -> Result<bool> {
        let encrypted_id = self.cipher.encrypt(document_id)?;
        Ok(self
            .index
            .values()
            .any(|postings| postings.contains_key(&encrypted_id)))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Index a document's grams
    ///
    /// Positions are unioned into any existing entry for the same
    /// (gram, document) pair, so re-adding identical content is idempotent.
    ///
    /// # Errors
    ///
    /// - `Validation { SourceRead }` if the source cannot be read
    /// - `Validation { Tokenization }` if no tokens survive
    /// - `Validation { NgramGeneration }` if no grams result
    /// - `Crypto` if the cipher fails; the index is left unchanged
    pub fn add(&mut self, document_id: &str, source: &DocumentSource, n: i32) -> Result<()> {
        let tokens = tokenize_document(source, &self.stop_words).map_err(|e| {
            Error::validation(
                ValidationStage::SourceRead,
                format!("document '{}' cannot be read: {}", document_id, e),
            )
        })?;
        if tokens.is_empty() {
            return Err(Error::validation(
                ValidationStage::Tokenization,
                format!("document '{}' produced no tokens", document_id),
            ));
        }

        let ngrams = generate_ngrams(&tokens, n);
        if ngrams.is_empty() {
            return Err(Error::validation(
                ValidationStage::NgramGeneration,
                format!("document '{}' produced no n-grams (n = {})", document_id, n),
            ));
        }

        // Encrypt everything before touching the index so a cipher failure
        // cannot leave a half-added document behind.
        let encrypted_id = self.cipher.encrypt(document_id)?;
        let encrypted_grams = ngrams
            .into_iter()
            .map(|(gram, positions)| -> Result<(String, Positions)> {
                Ok((self.cipher.encrypt(&gram)?, positions))
            })
            .collect::<Result<Vec<_>>>()?;

        let gram_count = encrypted_grams.len();
        for (encrypted_gram, positions) in encrypted_grams {
            self.index
                .entry(encrypted_gram)
                .or_default()
                .entry(encrypted_id.clone())
                .or_default()
                .extend(positions);
        }

        info!(document_id, grams = gram_count, n, "Document added to the index");
        Ok(())
    }

    /// Remove every entry of a document
    ///
    /// Returns the number of (term, document) entries removed. Term buckets
    /// that become empty are kept.
    pub fn delete(&mut self, document_id: &str) -> Result<usize> {
        let encrypted_id = self.cipher.encrypt(document_id)?;

        let mut removed = 0;
        for postings in self.index.values_mut() {
            if postings.remove(&encrypted_id).is_some() {
                removed += 1;
            }
        }

        info!(document_id, entries = removed, "Document deleted from the index");
        Ok(removed)
    }

    /// Replace a document's content: delete, then add
    ///
    /// Not atomic. `Err` means the delete phase failed and the index is
    /// unchanged. `Ok(UpdateOutcome::Removed { .. })` means the old content
    /// is gone and the new content was rejected.
    pub fn update(&mut self, document_id: &str, source: &DocumentSource, n: i32) -> Result<UpdateOutcome> {
        self.delete(document_id)?;

        match self.add(document_id, source, n) {
            Ok(()) => Ok(UpdateOutcome::Updated),
            Err(cause) => {
                warn!(
                    document_id,
                    error = %cause,
                    "Update left document absent from the index: add failed after delete"
                );
                Ok(UpdateOutcome::Removed { cause })
            }
        }
    }

    /// Prune term buckets that no longer hold any document
    ///
    /// Returns the number of buckets removed.
    pub fn compact(&mut self) -> usize {
        let before = self.index.len();
        self.index.retain(|_, postings| !postings.is_empty());
        let pruned = before - self.index.len();
        debug!(pruned, remaining = self.index.len(), "Compacted index");
        pruned
    }
}

impl fmt::Debug for EncryptedInvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedInvertedIndex")
            .field("cipher", &self.cipher.cipher_id())
            .field("stop_words", &self.stop_words.len())
            .field("terms", &self.index.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
