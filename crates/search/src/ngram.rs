//! N-gram decomposition
//!
//! Tokens are cut into consecutive, non-overlapping chunks of `n` characters;
//! the final chunk may be shorter. Chunks of one character or less are
//! dropped. `n <= 0` disables sub-tokenization (whole tokens are the grams).
//! `n` of 1 or 2 is too short to discriminate and is coerced to 0 with a
//! warning.

use crate::tokenizer::TermPositions;
use tracing::warn;

/// Smallest gram size that enables sub-tokenization
pub const MIN_NGRAM_SIZE: i32 = 3;

/// Resolve a requested gram size: `Some(n)` to chunk, `None` for whole tokens
fn effective_size(n: i32) -> Option<usize> {
    match n {
        1 | 2 => {
            warn!(
                requested = n,
                "n-gram size must be 0 or at least {}; using whole tokens (n = 0)", MIN_NGRAM_SIZE
            );
            None
        }
        n if n >= MIN_NGRAM_SIZE => Some(n as usize),
        _ => None,
    }
}

/// Cut one token into grams of `size` characters, dropping chunks of length <= 1
///
/// # Example
///
/// ```
/// use sealdex_search::ngram::split_token;
///
/// assert_eq!(split_token("hello", 3), vec!["hel", "lo"]);
/// assert_eq!(split_token("cats", 3), vec!["cat"]);
/// ```
pub fn split_token(token: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    chars
        .chunks(size.max(1))
        .filter(|chunk| chunk.len() > 1)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Generate grams for the index path, carrying positions
///
/// When several tokens yield the same gram, their position sets are unioned.
pub fn generate_ngrams(tokens: &TermPositions, n: i32) -> TermPositions {
    let size = effective_size(n);
    let mut ngrams = TermPositions::new();

    for (token, positions) in tokens {
        let grams = match size {
            Some(size) => split_token(token, size),
            None if token.chars().count() > 1 => vec![token.clone()],
            None => Vec::new(),
        };
        for gram in grams {
            ngrams
                .entry(gram)
                .or_default()
                .extend(positions.iter().copied());
        }
    }
    ngrams
}

/// Generate grams for the query path
///
/// Order and duplicates are preserved. With `n <= 0` (or the coerced 1 and 2)
/// the tokens are returned unchanged.
pub fn generate_ngrams_query(tokens: &[String], n: i32) -> Vec<String> {
    match effective_size(n) {
        Some(size) => tokens
            .iter()
            .flat_map(|token| split_token(token, size))
            .collect(),
        None => tokens.to_vec(),
    }
}
