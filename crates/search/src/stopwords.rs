//! Stop-word set
//!
//! Stop-words are high-frequency words that carry little discriminative value
//! and are dropped by the tokenizer. The set is an immutable value: build it
//! once, wrap it in an `Arc`, and pass it to every tokenizer call.
//!
//! Source format: line-oriented, comma-separated words. Entries are trimmed
//! and lowercased; blank entries are skipped.

use crate::error::Result;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Bundled English list (Lucene's default set).
const DEFAULT_STOP_WORDS: &str = include_str!("../resources/stop_words.csv");

/// Immutable lowercase stop-word set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Empty set: nothing is filtered
    pub fn empty() -> Self {
        Self::default()
    }

    /// The bundled English stop-word list
    pub fn english() -> Self {
        Self::from_csv_str(DEFAULT_STOP_WORDS)
    }

    /// Parse comma-separated, line-oriented text
    pub fn from_csv_str(text: &str) -> Self {
        let mut words = HashSet::new();
        for line in text.lines() {
            insert_line(&mut words, line);
        }
        StopWords { words }
    }

    /// Read from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut words = HashSet::new();
        for line in reader.lines() {
            insert_line(&mut words, &line?);
        }
        Ok(StopWords { words })
    }

    /// Read from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Build from an explicit word list
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            insert_line(&mut set, word.as_ref());
        }
        StopWords { words: set }
    }

    /// Check whether a lowercase token is a stop-word
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of stop-words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn insert_line(words: &mut HashSet<String>, line: &str) {
    for word in line.split(',') {
        let word = word.trim();
        if !word.is_empty() {
            words.insert(word.to_lowercase());
        }
    }
}
