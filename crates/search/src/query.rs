//! Query processing
//!
//! Turns a raw query string into the gram sequence used at index time.
//! No retry with a different `n` happens here; adaptive strategies belong to
//! the caller.

use crate::error::{Error, Result, ValidationStage};
use crate::ngram::generate_ngrams_query;
use crate::stopwords::StopWords;
use crate::tokenizer::tokenize_query;

/// Tokenize a query and, if `n > 0`, split the tokens into grams
///
/// `n` must match the value the index was built with; a mismatch silently
/// degrades results.
///
/// # Errors
///
/// - `Validation { QueryTokenization }` if no tokens survive
/// - `Validation { QueryNgramGeneration }` if `n > 0` and no grams result
///
/// # Example
///
/// ```
/// use sealdex_search::{process_query, StopWords};
///
/// let grams = process_query("the Hello", 3, &StopWords::from_words(["the"])).unwrap();
/// assert_eq!(grams, vec!["hel", "lo"]);
/// ```
pub fn process_query(query: &str, n: i32, stop_words: &StopWords) -> Result<Vec<String>> {
    let tokens = tokenize_query(query, stop_words);
    if tokens.is_empty() {
        return Err(Error::validation(
            ValidationStage::QueryTokenization,
            format!("query '{}' produced no tokens", query),
        ));
    }

    if n <= 0 {
        return Ok(tokens);
    }

    let grams = generate_ngrams_query(&tokens, n);
    if grams.is_empty() {
        return Err(Error::validation(
            ValidationStage::QueryNgramGeneration,
            format!("query '{}' produced no n-grams (n = {})", query, n),
        ));
    }
    Ok(grams)
}
