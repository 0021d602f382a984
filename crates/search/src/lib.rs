//! Encrypted full-text search for sealdex
//!
//! This crate provides:
//! - StopWords, an immutable stop-word set passed to every tokenizer call
//! - Tokenizer with document positions
//! - N-gram generation for index and query paths
//! - EncryptedInvertedIndex with add / delete / update / compact
//! - IndexSnapshot, the persisted JSON wire format
//! - Query processing
//! - Bm25ProximityScorer, BM25 extended with positional proximity and
//!   query-term weighting
//! - Searcher, the end-to-end ranked search over a snapshot
//! - SealdexConfig loaded from `sealdex.toml`
//!
//! Terms and document IDs are only ever compared as ciphertext. They are
//! decrypted for result presentation and scorer bookkeeping only.
//!
//! # Usage
//!
//! ```
//! use sealdex_crypto::{DeterministicAesCipher, KeyMaterial};
//! use sealdex_search::{EncryptedInvertedIndex, Searcher, StopWords};
//! use std::sync::Arc;
//!
//! let key = KeyMaterial::from_bytes(&[7u8; 32]).unwrap();
//! let cipher = Arc::new(DeterministicAesCipher::new(&key).unwrap());
//! let stop_words = Arc::new(StopWords::from_words(["the"]));
//!
//! let mut index = EncryptedInvertedIndex::new(cipher.clone(), stop_words.clone());
//! index.add("A", &"the cat sat".into(), 0).unwrap();
//! index.add("B", &"the dog ran".into(), 0).unwrap();
//!
//! let json = index.to_snapshot().to_json().unwrap();
//! let searcher = Searcher::from_json(&json, cipher, stop_words).unwrap();
//! assert_eq!(searcher.search("cat", 0).unwrap(), vec!["A"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod index;
pub mod ngram;
pub mod query;
pub mod scorer;
pub mod search;
pub mod snapshot;
pub mod stopwords;
pub mod tokenizer;

// Re-export commonly used types
pub use config::SealdexConfig;
pub use error::{Error, Result, ValidationStage};
pub use index::{EncryptedInvertedIndex, IndexMap, Positions, PostingMap, UpdateOutcome};
pub use ngram::{generate_ngrams, generate_ngrams_query};
pub use query::process_query;
pub use scorer::{proximity_factor, Bm25Params, Bm25ProximityScorer};
pub use search::{SearchHit, Searcher};
pub use snapshot::IndexSnapshot;
pub use stopwords::StopWords;
pub use tokenizer::{tokenize_document, tokenize_query, tokenize_text, DocumentSource, TermPositions};
