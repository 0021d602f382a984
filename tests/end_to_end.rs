//! End-to-end tests through the public facade
//!
//! Config file → cipher and stop words → index → snapshot file → search.

use sealdex::{
    DocumentSource, EncryptedInvertedIndex, Error, IndexSnapshot, SealdexConfig, Searcher,
    UpdateOutcome,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const HEX_KEY: &str = "8f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0";

/// Write a key and a config pointing at it; returns the config path
fn write_config(dir: &Path, ngram_size: i32) -> std::path::PathBuf {
    let key_path = dir.join("index.key");
    std::fs::write(&key_path, HEX_KEY).unwrap();

    let config = SealdexConfig {
        ngram_size,
        key_file: Some(key_path),
        ..SealdexConfig::default()
    };
    let config_path = dir.join(sealdex::search::config::CONFIG_FILE_NAME);
    config.write_to_file(&config_path).unwrap();
    config_path
}

fn open_index(config: &SealdexConfig) -> EncryptedInvertedIndex {
    EncryptedInvertedIndex::new(config.cipher().unwrap(), config.stop_words().unwrap())
}

fn open_searcher(config: &SealdexConfig, snapshot_path: &Path) -> Searcher {
    let snapshot = IndexSnapshot::read_from(snapshot_path).unwrap();
    Searcher::from_snapshot(
        snapshot,
        config.cipher().unwrap(),
        config.stop_words().unwrap(),
    )
    .unwrap()
}

// =============================================================================
// CONFIG-DRIVEN WORKFLOW
// =============================================================================

#[test]
fn test_index_persist_search_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = SealdexConfig::from_file(&write_config(dir.path(), 3)).unwrap();

    let mut index = open_index(&config);
    let report = dir.path().join("report.txt");
    std::fs::write(&report, "Quarterly revenue grew.\nThe forecast looks strong.\n").unwrap();
    index
        .add("report.txt", &DocumentSource::File(report), config.ngram_size)
        .unwrap();
    index
        .add("memo.txt", &"Lunch menu for Friday".into(), config.ngram_size)
        .unwrap();

    let snapshot_path = dir.path().join("index.json");
    index.to_snapshot().write_to(&snapshot_path).unwrap();

    let searcher = open_searcher(&config, &snapshot_path);
    assert_eq!(searcher.num_docs(), 2);
    assert_eq!(searcher.search("revenue forecast", config.ngram_size).unwrap(), vec!["report.txt"]);
    assert_eq!(searcher.search("menu", config.ngram_size).unwrap(), vec!["memo.txt"]);
}

#[test]
fn test_reopened_index_accepts_mutations() {
    let dir = tempfile::tempdir().unwrap();
    let config = SealdexConfig::from_file(&write_config(dir.path(), 0)).unwrap();
    let snapshot_path = dir.path().join("index.json");

    let mut index = open_index(&config);
    index.add("a", &"alpha release notes".into(), 0).unwrap();
    index.add("b", &"beta release notes".into(), 0).unwrap();
    index.to_snapshot().write_to(&snapshot_path).unwrap();

    let mut reopened = EncryptedInvertedIndex::from_snapshot(
        config.cipher().unwrap(),
        config.stop_words().unwrap(),
        IndexSnapshot::read_from(&snapshot_path).unwrap(),
    );
    reopened.delete("a").unwrap();
    assert!(reopened.compact() > 0);
    reopened.to_snapshot().write_to(&snapshot_path).unwrap();

    let searcher = open_searcher(&config, &snapshot_path);
    assert_eq!(searcher.search("release", 0).unwrap(), vec!["b"]);
    assert!(searcher.search("alpha", 0).unwrap().is_empty());
}

#[test]
fn test_identity_cipher_config() {
    let config = SealdexConfig::from_toml_str("cipher = \"identity\"\n").unwrap();
    let mut index = open_index(&config);
    index.add("plain", &"visible words".into(), 0).unwrap();

    let json = index.to_snapshot().to_json().unwrap();
    assert!(json.contains("visible"));
    assert!(json.contains("plain"));
}

#[test]
fn test_missing_key_file_is_reported() {
    let config = SealdexConfig {
        key_file: Some("/nonexistent/sealdex.key".into()),
        ..SealdexConfig::default()
    };
    assert!(matches!(config.cipher(), Err(Error::Crypto(_))));
}

// =============================================================================
// LOGGING
// =============================================================================

#[derive(Default)]
struct Captured {
    level: Option<tracing::Level>,
    message: String,
    document_id: String,
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        struct Visitor(Captured);
        impl tracing::field::Visit for Visitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0.message = format!("{:?}", value);
                }
            }
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "document_id" {
                    self.0.document_id = value.to_string();
                }
            }
        }

        let mut visitor = Visitor(Captured {
            level: Some(*event.metadata().level()),
            ..Default::default()
        });
        event.record(&mut visitor);
        self.events.lock().unwrap().push(visitor.0);
    }
}

#[test]
fn test_failed_update_logs_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = SealdexConfig::from_file(&write_config(dir.path(), 0)).unwrap();
    let mut index = open_index(&config);
    index.add("doc", &"original content".into(), 0).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: events.clone(),
    });

    let outcome = tracing::subscriber::with_default(subscriber, || {
        index.update("doc", &"the of and".into(), 0).unwrap()
    });
    assert!(matches!(outcome, UpdateOutcome::Removed { .. }));

    let events = events.lock().unwrap();
    let warning = events
        .iter()
        .find(|e| e.level == Some(tracing::Level::WARN))
        .expect("update failure should be logged");
    assert_eq!(warning.document_id, "doc");
    assert!(warning.message.contains("absent"));
}
