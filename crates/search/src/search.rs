//! Search orchestration
//!
//! Wires a loaded index snapshot, the BM25 proximity scorer and the query
//! pipeline into a ranked list of plaintext document IDs.

use crate::error::Result;
use crate::index::{EncryptedInvertedIndex, IndexMap};
use crate::query::process_query;
use crate::scorer::Bm25ProximityScorer;
use crate::snapshot::IndexSnapshot;
use crate::stopwords::StopWords;
use sealdex_crypto::TermCipher;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// One ranked result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Plaintext document ID
    pub document_id: String,
    /// BM25 proximity score (always > 0)
    pub score: f64,
}

/// Query executor over one index snapshot
///
/// The scorer is built once at load time; queries never see later index
/// mutations. Load a new `Searcher` to pick them up.
#[derive(Debug)]
pub struct Searcher {
    scorer: Bm25ProximityScorer,
    stop_words: Arc<StopWords>,
}

impl Searcher {
    /// Build a searcher over an in-memory index map
    pub fn new(index: IndexMap, cipher: Arc<dyn TermCipher>, stop_words: Arc<StopWords>) -> Result<Self> {
        let terms = index.len();
        let scorer = Bm25ProximityScorer::new(index, cipher)?;
        info!(terms, documents = scorer.num_docs(), "Loaded index snapshot for search");
        Ok(Searcher { scorer, stop_words })
    }

    /// Build a searcher over a persisted snapshot
    pub fn from_snapshot(
        snapshot: IndexSnapshot,
        cipher: Arc<dyn TermCipher>,
        stop_words: Arc<StopWords>,
    ) -> Result<Self> {
        Self::new(snapshot.into_map(), cipher, stop_words)
    }

    /// Deserialize a JSON snapshot and build a searcher over it
    ///
    /// # Errors
    ///
    /// `Deserialization` if the JSON is not a term → document → positions map.
    pub fn from_json(json: &str, cipher: Arc<dyn TermCipher>, stop_words: Arc<StopWords>) -> Result<Self> {
        Self::from_snapshot(IndexSnapshot::from_json(json)?, cipher, stop_words)
    }

    /// Build a searcher over the current state of a live index
    pub fn from_index(index: &EncryptedInvertedIndex) -> Result<Self> {
        Self::new(
            index.get_index().clone(),
            Arc::clone(index.cipher()),
            Arc::clone(index.stop_words()),
        )
    }

    /// The underlying scorer
    pub fn scorer(&self) -> &Bm25ProximityScorer {
        &self.scorer
    }

    /// Number of documents in the snapshot
    pub fn num_docs(&self) -> usize {
        self.scorer.num_docs()
    }

    /// Run a query and return scored hits, best first
    ///
    /// `n` must be the gram size the index was built with. Documents scoring
    /// exactly 0 are dropped. Equal scores are ordered by document ID.
    pub fn search_hits(&self, query: &str, n: i32) -> Result<Vec<SearchHit>> {
        let grams = process_query(query, n, &self.stop_words)?;
        let scores = self.scorer.score_candidates(&grams)?;

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter(|(_, score)| *score != 0.0)
            .map(|(document_id, score)| SearchHit { document_id, score })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });

        debug!(grams = grams.len(), hits = hits.len(), "Search complete");
        Ok(hits)
    }

    /// Run a query and return document IDs, best first
    pub fn search(&self, query: &str, n: i32) -> Result<Vec<String>> {
        Ok(self
            .search_hits(query, n)?
            .into_iter()
            .map(|hit| hit.document_id)
            .collect())
    }
}
