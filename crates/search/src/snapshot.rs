//! Persisted index wire format
//!
//! A JSON object with three nesting levels:
//!
//! ```json
//! { "<ciphertext term>": { "<ciphertext document ID>": [1, 4, 9] } }
//! ```
//!
//! Positions are plaintext non-negative integers. Order is insignificant and
//! duplicates are tolerated (they collapse into a set on load). Maps are
//! ordered, so exporting the same index twice yields identical bytes.

use crate::error::{Error, Result};
use crate::index::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Serializable snapshot of an encrypted index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexSnapshot {
    terms: IndexMap,
}

impl IndexSnapshot {
    /// Wrap an index map
    pub fn new(terms: IndexMap) -> Self {
        IndexSnapshot { terms }
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Parse a snapshot from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Load a snapshot file
    pub fn read_from(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Encode as compact JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Encode as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Encode into a writer
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Write a snapshot file, replacing any existing one
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// The nested map
    pub fn as_map(&self) -> &IndexMap {
        &self.terms
    }

    /// Consume into the nested map
    pub fn into_map(self) -> IndexMap {
        self.terms
    }

    /// Number of term buckets
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }
}
