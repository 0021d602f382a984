//! Text tokenizer for indexing and query processing
//!
//! Pipeline: split on runs of non-word characters → lowercase → remove
//! stop-words. Word characters are alphanumerics and `_`.
//!
//! Documents additionally get positions: a 1-based counter that advances once
//! per surviving token across the whole document (not per line). Stop-words
//! never consume a position.

use crate::stopwords::StopWords;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Token → set of 1-based positions
pub type TermPositions = BTreeMap<String, BTreeSet<u32>>;

/// Where a document's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// In-memory text
    Text(String),
    /// File on disk, read once with blocking I/O
    File(PathBuf),
}

impl From<&str> for DocumentSource {
    fn from(text: &str) -> Self {
        DocumentSource::Text(text.to_string())
    }
}

impl From<String> for DocumentSource {
    fn from(text: String) -> Self {
        DocumentSource::Text(text)
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::File(path)
    }
}

/// Alphanumerics and `_`, Unicode-aware: non-ASCII letters such as `ï` or
/// `é` are word characters, unlike the ASCII-only `\W` class.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a line into lowercase words, dropping stop-words
fn words<'a>(line: &'a str, stop_words: &'a StopWords) -> impl Iterator<Item = String> + 'a {
    line.split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(move |w| !stop_words.contains(w))
}

/// Tokenize a document from a buffered reader, recording positions
pub fn tokenize_reader<R: BufRead>(reader: R, stop_words: &StopWords) -> io::Result<TermPositions> {
    let mut tokens = TermPositions::new();
    let mut position: u32 = 0;

    for line in reader.lines() {
        let line = line?;
        for word in words(&line, stop_words) {
            position += 1;
            tokens.entry(word).or_default().insert(position);
        }
    }
    Ok(tokens)
}

/// Tokenize in-memory document text, recording positions
///
/// # Example
///
/// ```
/// use sealdex_search::{tokenizer::tokenize_text, StopWords};
///
/// let tokens = tokenize_text("The cat saw the cat", &StopWords::from_words(["the"]));
/// assert_eq!(tokens["cat"].iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// assert_eq!(tokens["saw"].iter().copied().collect::<Vec<_>>(), vec![2]);
/// ```
pub fn tokenize_text(text: &str, stop_words: &StopWords) -> TermPositions {
    let mut tokens = TermPositions::new();
    let mut position: u32 = 0;

    for line in text.lines() {
        for word in words(line, stop_words) {
            position += 1;
            tokens.entry(word).or_default().insert(position);
        }
    }
    tokens
}

/// Tokenize a document from its source
///
/// Fails only if the source cannot be read. An empty map means the
/// document has no surviving tokens.
pub fn tokenize_document(source: &DocumentSource, stop_words: &StopWords) -> io::Result<TermPositions> {
    match source {
        DocumentSource::Text(text) => Ok(tokenize_text(text, stop_words)),
        DocumentSource::File(path) => {
            let file = File::open(path)?;
            tokenize_reader(BufReader::new(file), stop_words)
        }
    }
}

/// Tokenize a query: same normalization, no positions
///
/// Order and duplicates are preserved.
///
/// # Example
///
/// ```
/// use sealdex_search::{tokenizer::tokenize_query, StopWords};
///
/// let tokens = tokenize_query("The Cat, the cat!", &StopWords::from_words(["the"]));
/// assert_eq!(tokens, vec!["cat", "cat"]);
/// ```
pub fn tokenize_query(query: &str, stop_words: &StopWords) -> Vec<String> {
    words(query, stop_words).collect()
}
