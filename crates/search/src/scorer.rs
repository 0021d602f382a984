//! BM25 scoring with positional proximity
//!
//! This module provides:
//! - Bm25Params: the k1 / b / k3 constants
//! - Bm25ProximityScorer: per-snapshot corpus statistics and scoring
//! - proximity_factor: the adjacent-gram proximity multiplier
//!
//! # Formula
//!
//! For each query gram g present in the index and in document d:
//!
//! ```text
//! idf   = ln(1 + (N - df + 0.5) / (df + 0.5))
//! sat   = tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))
//! qw    = (k3 + 1) * qtf / (k3 + qtf)
//! score += sat * idf * qw * proximity(d)
//! ```
//!
//! `dl` is approximated by the largest position seen for the document across
//! all terms. It undercounts when the real last token was a stop-word.

use crate::error::Result;
use crate::index::{IndexMap, Positions, PostingMap};
use sealdex_crypto::TermCipher;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Bm25Params
// ============================================================================

/// BM25 constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation (default 1.2)
    pub k1: f64,
    /// Length normalization (default 0.75)
    pub b: f64,
    /// Query term frequency saturation (default 2.0)
    pub k3: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params {
            k1: 1.2,
            b: 0.75,
            k3: 2.0,
        }
    }
}

// ============================================================================
// Proximity
// ============================================================================

/// Proximity multiplier for one document
///
/// `positions[i]` holds the document's positions for the i-th query gram, or
/// None if the gram is absent from the index or the document. For every
/// adjacent pair the smallest forward gap (second position >= first) is found
/// and the factor is multiplied by `1 + e^(-gap)`. Pairs with a missing side
/// or no forward partner leave the factor unchanged.
pub fn proximity_factor(positions: &[Option<&Positions>]) -> f64 {
    let mut factor = 1.0;

    for pair in positions.windows(2) {
        let (Some(first), Some(second)) = (pair[0], pair[1]) else {
            continue;
        };

        let min_gap = first
            .iter()
            .filter_map(|&pos| second.range(pos..).next().map(|&next| next - pos))
            .min();

        if let Some(gap) = min_gap {
            factor *= 1.0 + (-(gap as f64)).exp();
        }
    }
    factor
}

// ============================================================================
// Bm25ProximityScorer
// ============================================================================

#[derive(Debug, Clone)]
struct DocumentStats {
    /// Key of the document inside posting maps
    encrypted_id: String,
    /// Largest position observed for the document
    length: u32,
}

/// BM25 + proximity scorer over one index snapshot
///
/// Construction decrypts every document key once and computes corpus
/// statistics. The statistics are not updated if the index changes; build a
/// new scorer for a new snapshot.
pub struct Bm25ProximityScorer {
    index: IndexMap,
    cipher: Arc<dyn TermCipher>,
    params: Bm25Params,
    /// Plaintext document ID → stats
    documents: HashMap<String, DocumentStats>,
    /// Ciphertext document ID → plaintext document ID
    plaintext_ids: HashMap<String, String>,
    avg_doc_len: f64,
}

impl Bm25ProximityScorer {
    /// Build a scorer over an index snapshot
    ///
    /// # Errors
    ///
    /// `Crypto` if a document key cannot be decrypted.
    pub fn new(index: IndexMap, cipher: Arc<dyn TermCipher>) -> Result<Self> {
        let mut plaintext_ids: HashMap<String, String> = HashMap::new();
        let mut documents: HashMap<String, DocumentStats> = HashMap::new();

        for postings in index.values() {
            for (encrypted_id, positions) in postings {
                let document_id = match plaintext_ids.get(encrypted_id) {
                    Some(id) => id.clone(),
                    None => {
                        let id = cipher.decrypt(encrypted_id)?;
                        plaintext_ids.insert(encrypted_id.clone(), id.clone());
                        id
                    }
                };

                let max_position = positions.iter().next_back().copied().unwrap_or(0);
                let stats = documents.entry(document_id).or_insert_with(|| DocumentStats {
                    encrypted_id: encrypted_id.clone(),
                    length: 0,
                });
                stats.length = stats.length.max(max_position);
            }
        }

        let avg_doc_len = if documents.is_empty() {
            0.0
        } else {
            documents.values().map(|d| d.length as f64).sum::<f64>() / documents.len() as f64
        };

        debug!(
            num_docs = documents.len(),
            terms = index.len(),
            avg_doc_len,
            "Built BM25 proximity scorer"
        );

        Ok(Bm25ProximityScorer {
            index,
            cipher,
            params: Bm25Params::default(),
            documents,
            plaintext_ids,
            avg_doc_len,
        })
    }

    /// Builder: override the BM25 constants
    pub fn with_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// BM25 constants in use
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Number of distinct plaintext documents
    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    /// Approximated length of a document (largest observed position)
    pub fn doc_length(&self, document_id: &str) -> Option<u32> {
        self.documents.get(document_id).map(|d| d.length)
    }

    /// Mean of all document length approximations
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// Smoothed IDF; never negative
    pub fn idf(&self, doc_freq: usize) -> f64 {
        let n = self.documents.len() as f64;
        let df = doc_freq as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Score every known document
    ///
    /// Documents containing none of the grams are present with score 0.
    pub fn score(&self, grams: &[String]) -> Result<HashMap<String, f64>> {
        let lookups = self.resolve(grams)?;
        let query_counts = query_term_counts(grams);

        let scores = self
            .documents
            .iter()
            .map(|(document_id, stats)| {
                let score = self.score_document(stats, grams, &lookups, &query_counts);
                (document_id.clone(), score)
            })
            .collect();
        Ok(scores)
    }

    /// Score only documents that contain at least one query gram
    ///
    /// Same scores as [`score`](Self::score) minus the zero entries, at a cost
    /// proportional to the matching postings instead of the corpus size.
    pub fn score_candidates(&self, grams: &[String]) -> Result<HashMap<String, f64>> {
        let lookups = self.resolve(grams)?;
        let query_counts = query_term_counts(grams);

        let candidates: BTreeSet<&String> = lookups
            .iter()
            .flatten()
            .flat_map(|postings| postings.keys())
            .collect();

        let mut scores = HashMap::with_capacity(candidates.len());
        for encrypted_id in candidates {
            let Some(document_id) = self.plaintext_ids.get(encrypted_id) else {
                continue;
            };
            let Some(stats) = self.documents.get(document_id) else {
                continue;
            };
            let score = self.score_document(stats, grams, &lookups, &query_counts);
            scores.insert(document_id.clone(), score);
        }
        Ok(scores)
    }

    /// Encrypt each distinct gram once and fetch its postings
    fn resolve(&self, grams: &[String]) -> Result<Vec<Option<&PostingMap>>> {
        let mut cache: HashMap<&str, Option<&PostingMap>> = HashMap::new();
        let mut lookups = Vec::with_capacity(grams.len());

        for gram in grams {
            let postings = match cache.get(gram.as_str()) {
                Some(postings) => *postings,
                None => {
                    let encrypted_gram = self.cipher.encrypt(gram)?;
                    let postings = self.index.get(&encrypted_gram);
                    cache.insert(gram.as_str(), postings);
                    postings
                }
            };
            lookups.push(postings);
        }
        Ok(lookups)
    }

    fn score_document(
        &self,
        stats: &DocumentStats,
        grams: &[String],
        lookups: &[Option<&PostingMap>],
        query_counts: &HashMap<&str, usize>,
    ) -> f64 {
        let doc_positions: Vec<Option<&Positions>> = lookups
            .iter()
            .map(|postings| postings.and_then(|p| p.get(&stats.encrypted_id)))
            .collect();

        if doc_positions.iter().all(Option::is_none) {
            return 0.0;
        }

        let Bm25Params { k1, b, k3 } = self.params;
        let proximity = proximity_factor(&doc_positions);
        let length_ratio = if self.avg_doc_len > 0.0 {
            stats.length as f64 / self.avg_doc_len
        } else {
            1.0
        };

        let mut score = 0.0;
        for (i, gram) in grams.iter().enumerate() {
            let (Some(postings), Some(positions)) = (lookups[i], doc_positions[i]) else {
                continue;
            };

            let tf = positions.len() as f64;
            let idf = self.idf(postings.len());
            let saturation = tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * length_ratio));

            let qtf = query_counts.get(gram.as_str()).copied().unwrap_or(0) as f64;
            let query_weight = (k3 + 1.0) * qtf / (k3 + qtf);

            score += saturation * idf * query_weight * proximity;
        }
        score
    }
}

fn query_term_counts(grams: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for gram in grams {
        *counts.entry(gram.as_str()).or_insert(0) += 1;
    }
    counts
}

impl fmt::Debug for Bm25ProximityScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bm25ProximityScorer")
            .field("params", &self.params)
            .field("num_docs", &self.documents.len())
            .field("avg_doc_len", &self.avg_doc_len)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use sealdex_crypto::{DeterministicAesCipher, IdentityCipher, KeyMaterial};

    fn positions(p: &[u32]) -> Positions {
        p.iter().copied().collect()
    }

    /// Build a plaintext index map: (term, doc, positions)
    fn index_map(entries: &[(&str, &str, &[u32])]) -> IndexMap {
        let mut map = IndexMap::new();
        for (term, doc, pos) in entries {
            map.entry(term.to_string())
                .or_default()
                .insert(doc.to_string(), positions(pos));
        }
        map
    }

    fn scorer(entries: &[(&str, &str, &[u32])]) -> Bm25ProximityScorer {
        Bm25ProximityScorer::new(index_map(entries), Arc::new(IdentityCipher)).unwrap()
    }

    fn grams(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_corpus_statistics() {
        let scorer = scorer(&[
            ("cat", "a", &[1, 4]),
            ("sat", "a", &[2]),
            ("dog", "b", &[1]),
            ("ran", "b", &[2]),
        ]);

        assert_eq!(scorer.num_docs(), 2);
        assert_eq!(scorer.doc_length("a"), Some(4));
        assert_eq!(scorer.doc_length("b"), Some(2));
        assert!((scorer.avg_doc_len() - 3.0).abs() < 1e-9);
        assert_eq!(scorer.doc_length("zzz"), None);
    }

    #[test]
    fn test_empty_positions_do_not_panic() {
        let scorer = scorer(&[("cat", "a", &[]), ("sat", "a", &[3])]);
        assert_eq!(scorer.doc_length("a"), Some(3));
        let scores = scorer.score(&grams(&["cat"])).unwrap();
        assert_eq!(scores["a"], 0.0);
    }

    #[test]
    fn test_empty_index() {
        let scorer = scorer(&[]);
        assert_eq!(scorer.num_docs(), 0);
        assert!(scorer.score(&grams(&["cat"])).unwrap().is_empty());
    }

    #[test]
    fn test_undecryptable_document_key() {
        let key = KeyMaterial::from_bytes(&[1u8; 32]).unwrap();
        let cipher = DeterministicAesCipher::new(&key).unwrap();
        let result = Bm25ProximityScorer::new(index_map(&[("t", "plain-id", &[1])]), Arc::new(cipher));
        assert!(matches!(result, Err(Error::Crypto(_))));
    }

    #[test]
    fn test_default_params() {
        let params = Bm25Params::default();
        assert_eq!(params, Bm25Params { k1: 1.2, b: 0.75, k3: 2.0 });
    }

    // ========================================
    // IDF Tests
    // ========================================

    #[test]
    fn test_idf_never_negative() {
        let scorer = scorer(&[
            ("x", "a", &[1]),
            ("x", "b", &[1]),
            ("x", "c", &[1]),
        ]);
        for df in 0..=3 {
            assert!(scorer.idf(df) >= 0.0);
        }
        assert!(scorer.idf(1) > scorer.idf(3));
    }

    // ========================================
    // Scoring Tests
    // ========================================

    #[test]
    fn test_scores_every_known_document() {
        let scorer = scorer(&[("cat", "a", &[1]), ("dog", "b", &[1])]);
        let scores = scorer.score(&grams(&["cat"])).unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores["a"] > 0.0);
        assert_eq!(scores["b"], 0.0);
    }

    #[test]
    fn test_unknown_gram_contributes_nothing() {
        let scorer = scorer(&[("cat", "a", &[1]), ("dog", "b", &[1])]);
        let with_unknown = scorer.score(&grams(&["cat", "unicorn"])).unwrap();
        let without = scorer.score(&grams(&["cat"])).unwrap();
        assert!((with_unknown["a"] - without["a"]).abs() < 1e-12);
    }

    #[test]
    fn test_single_gram_matches_formula() {
        let scorer = scorer(&[("cat", "a", &[1, 3]), ("pad", "a", &[4]), ("dog", "b", &[2])]);
        let scores = scorer.score(&grams(&["cat"])).unwrap();

        // N = 2, df = 1, tf = 2, dl = 4, avgdl = 3, qtf = 1, proximity = 1
        let idf = (1.0f64 + (2.0 - 1.0 + 0.5) / (1.0 + 0.5)).ln();
        let sat = 2.0 * 2.2 / (2.0 + 1.2 * (1.0 - 0.75 + 0.75 * 4.0 / 3.0));
        let qw = 3.0 * 1.0 / (2.0 + 1.0);
        assert!((scores["a"] - sat * idf * qw).abs() < 1e-9);
    }

    #[test]
    fn test_term_frequency_monotone_and_saturating() {
        let mut contributions = Vec::new();
        for tf in 1..=6u32 {
            let cat_positions: Vec<u32> = (0..tf).map(|i| 20 - i).collect();
            let scorer = scorer(&[
                ("cat", "a", &cat_positions),
                ("pad", "a", &[20]),
                ("pad", "b", &[20]),
            ]);
            contributions.push(scorer.score(&grams(&["cat"])).unwrap()["a"]);
        }

        for window in contributions.windows(2) {
            assert!(window[1] >= window[0], "tf increase decreased score");
        }
        let gains: Vec<f64> = contributions.windows(2).map(|w| w[1] - w[0]).collect();
        for window in gains.windows(2) {
            assert!(window[1] < window[0], "marginal gain did not shrink");
        }
    }

    #[test]
    fn test_closer_grams_score_higher() {
        let scorer = scorer(&[
            ("cat", "near", &[1]),
            ("sat", "near", &[2]),
            ("pad", "near", &[11]),
            ("cat", "far", &[1]),
            ("sat", "far", &[11]),
        ]);
        let scores = scorer.score(&grams(&["cat", "sat"])).unwrap();
        assert!(scores["near"] > scores["far"]);
    }

    #[test]
    fn test_repeated_query_gram_weighs_more() {
        let scorer = scorer(&[("cat", "a", &[1]), ("dog", "b", &[1])]);
        let once = scorer.score(&grams(&["cat"])).unwrap()["a"];
        let twice = scorer.score(&grams(&["cat", "cat"])).unwrap()["a"];
        assert!(twice > once);
    }

    #[test]
    fn test_score_candidates_matches_nonzero_scores() {
        let scorer = scorer(&[
            ("cat", "a", &[1, 5]),
            ("sat", "a", &[2]),
            ("sat", "b", &[7]),
            ("dog", "c", &[1]),
        ]);
        let query = grams(&["cat", "sat"]);

        let full: HashMap<String, f64> = scorer
            .score(&query)
            .unwrap()
            .into_iter()
            .filter(|(_, s)| *s != 0.0)
            .collect();
        let candidates = scorer.score_candidates(&query).unwrap();

        assert_eq!(full.len(), candidates.len());
        for (doc, score) in &full {
            assert!((candidates[doc] - score).abs() < 1e-12);
        }
        assert!(!candidates.contains_key("c"));
    }

    #[test]
    fn test_scoring_through_aes_cipher() {
        let key = KeyMaterial::from_bytes(&[2u8; 32]).unwrap();
        let cipher: Arc<dyn TermCipher> = Arc::new(DeterministicAesCipher::new(&key).unwrap());

        let mut map = IndexMap::new();
        for (term, doc, pos) in [("cat", "a", 1u32), ("dog", "b", 1u32)] {
            map.entry(cipher.encrypt(term).unwrap())
                .or_insert_with(PostingMap::new)
                .insert(cipher.encrypt(doc).unwrap(), positions(&[pos]));
        }

        let scorer = Bm25ProximityScorer::new(map, cipher).unwrap();
        let scores = scorer.score(&grams(&["cat"])).unwrap();
        assert!(scores["a"] > 0.0);
        assert_eq!(scores["b"], 0.0);
    }

    // ========================================
    // Proximity Tests
    // ========================================

    #[test]
    fn test_proximity_gap_one_beats_gap_ten() {
        let first = positions(&[1]);
        let near = positions(&[2]);
        let far = positions(&[11]);

        let near_factor = proximity_factor(&[Some(&first), Some(&near)]);
        let far_factor = proximity_factor(&[Some(&first), Some(&far)]);

        assert!((near_factor - (1.0 + (-1.0f64).exp())).abs() < 1e-12);
        assert!(near_factor > far_factor);
    }

    #[test]
    fn test_proximity_ignores_backward_occurrences() {
        let first = positions(&[5]);
        let second = positions(&[2]);
        assert_eq!(proximity_factor(&[Some(&first), Some(&second)]), 1.0);
    }

    #[test]
    fn test_proximity_uses_minimum_forward_gap() {
        let first = positions(&[1, 8]);
        let second = positions(&[5, 10]);
        // gaps: 1 -> 5 = 4, 8 -> 10 = 2
        let factor = proximity_factor(&[Some(&first), Some(&second)]);
        assert!((factor - (1.0 + (-2.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_proximity_skips_missing_grams() {
        let first = positions(&[1]);
        let empty = positions(&[]);
        assert_eq!(proximity_factor(&[Some(&first), None]), 1.0);
        assert_eq!(proximity_factor(&[Some(&first), Some(&empty)]), 1.0);
        assert_eq!(proximity_factor(&[Some(&first)]), 1.0);
        assert_eq!(proximity_factor(&[]), 1.0);
    }

    #[test]
    fn test_proximity_multiplies_pairs() {
        let a = positions(&[1]);
        let b = positions(&[2]);
        let c = positions(&[3]);
        let factor = proximity_factor(&[Some(&a), Some(&b), Some(&c)]);
        let pair = 1.0 + (-1.0f64).exp();
        assert!((factor - pair * pair).abs() < 1e-12);
    }

    #[test]
    fn test_scorer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Bm25ProximityScorer>();
    }
}
