//! Sealdex - searchable encrypted inverted index
//!
//! Sealdex stores every term and document ID of an inverted index in
//! deterministically encrypted form, so the persisted index reveals no
//! plaintext while exact-match lookups keep working. Queries are ranked
//! with BM25 plus a term-proximity bonus.
//!
//! # Quick Start
//!
//! ```no_run
//! use sealdex::{EncryptedInvertedIndex, SealdexConfig, Searcher};
//! use std::path::Path;
//!
//! # fn main() -> sealdex::Result<()> {
//! let config = SealdexConfig::from_file(Path::new("sealdex.toml"))?;
//! let mut index = EncryptedInvertedIndex::new(config.cipher()?, config.stop_words()?);
//!
//! index.add("notes.txt", &"meeting notes for the launch".into(), config.ngram_size)?;
//! index.to_snapshot().write_to(Path::new("index.json"))?;
//!
//! let searcher = Searcher::from_index(&index)?;
//! let ranked = searcher.search("launch", config.ngram_size)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`crypto`]: the `TermCipher` capability, key loading and ciphers
//! - [`search`]: tokenizer, n-grams, index maintenance, scoring and search

pub use sealdex_crypto as crypto;
pub use sealdex_search as search;

pub use sealdex_crypto::{CipherError, DeterministicAesCipher, KeyMaterial, TermCipher};
pub use sealdex_search::*;
