//! Summary and metadata storage
//!
//! The store is a key-value collaborator addressed by `(dataset, model)`.
//! Only read and whole-value replace are needed.

use crate::error::{EvalError, Result};
use crate::factuality::EntityAnnotation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-summary metadata; unknown fields are kept as-is on rewrite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// Our entity annotations, bucketed by the summary text they refer to
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub our_annotations: BTreeMap<String, Vec<EntityAnnotation>>,

    /// Everything else stored alongside the annotations
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SummaryMetadata {
    /// Annotations recorded for a specific summary text
    pub fn annotations_for(&self, summary: &str) -> &[EntityAnnotation] {
        self.our_annotations
            .get(summary)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Metadata for a whole model, keyed by summary id
pub type Metadata = BTreeMap<String, SummaryMetadata>;

/// A stored summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSummary {
    /// Summary text
    pub summary: String,

    /// Other stored fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Address of a model's data in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTarget {
    /// Dataset name, e.g. `xsum`
    pub dataset: String,
    /// Model name, e.g. `gold`
    pub model: String,
}

impl StoreTarget {
    /// Create a target
    pub fn new(dataset: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            model: model.into(),
        }
    }
}

/// Storage collaborator
pub trait MetadataStore {
    /// Summaries stored for a model
    fn get_summaries(&self, target: &StoreTarget) -> Result<BTreeMap<String, StoredSummary>>;

    /// Metadata stored for a model; empty when none was stored yet
    fn get_metadata(&self, target: &StoreTarget) -> Result<Metadata>;

    /// Replace a model's metadata as a whole
    fn put_metadata(&mut self, target: &StoreTarget, metadata: &Metadata) -> Result<()>;
}

/// Store backed by JSON files under `<root>/<dataset>/<model>/`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// File holding a model's summaries
    pub const SUMMARIES_FILE: &'static str = "summaries.json";
    /// File holding a model's metadata
    pub const METADATA_FILE: &'static str = "metadata.json";

    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a model
    pub fn model_dir(&self, target: &StoreTarget) -> PathBuf {
        self.root.join(&target.dataset).join(&target.model)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| EvalError::parse(path, e))
    }
}

impl MetadataStore for JsonFileStore {
    fn get_summaries(&self, target: &StoreTarget) -> Result<BTreeMap<String, StoredSummary>> {
        let path = self.model_dir(target).join(Self::SUMMARIES_FILE);
        Self::read_json(&path)
    }

    fn get_metadata(&self, target: &StoreTarget) -> Result<Metadata> {
        let path = self.model_dir(target).join(Self::METADATA_FILE);
        if !path.exists() {
            tracing::debug!("no metadata at {}, starting empty", path.display());
            return Ok(Metadata::new());
        }
        Self::read_json(&path)
    }

    fn put_metadata(&mut self, target: &StoreTarget, metadata: &Metadata) -> Result<()> {
        let dir = self.model_dir(target);
        fs::create_dir_all(&dir).map_err(|e| EvalError::io(&dir, e))?;
        let path = dir.join(Self::METADATA_FILE);

        // Write beside the target, then rename over it
        let tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| EvalError::io(&dir, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, metadata).map_err(|e| {
                EvalError::Format {
                    context: format!("metadata for {}", path.display()),
                    message: e.to_string(),
                }
            })?;
            writer.flush().map_err(|e| EvalError::io(&path, e))?;
        }
        tmp.persist(&path).map_err(|e| EvalError::io(&path, e.error))?;

        tracing::info!(
            "stored metadata for {} summaries at {}",
            metadata.len(),
            path.display()
        );
        Ok(())
    }
}

/// Store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    summaries: BTreeMap<(String, String), BTreeMap<String, StoredSummary>>,
    metadata: BTreeMap<(String, String), Metadata>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert summaries for a model
    pub fn insert_summaries(
        &mut self,
        target: &StoreTarget,
        summaries: BTreeMap<String, StoredSummary>,
    ) {
        self.summaries.insert(Self::key(target), summaries);
    }

    fn key(target: &StoreTarget) -> (String, String) {
        (target.dataset.clone(), target.model.clone())
    }
}

impl MetadataStore for InMemoryStore {
    fn get_summaries(&self, target: &StoreTarget) -> Result<BTreeMap<String, StoredSummary>> {
        self.summaries
            .get(&Self::key(target))
            .cloned()
            .ok_or_else(|| EvalError::Config {
                message: format!(
                    "no summaries stored for model '{}' in dataset '{}'",
                    target.model, target.dataset
                ),
            })
    }

    fn get_metadata(&self, target: &StoreTarget) -> Result<Metadata> {
        Ok(self
            .metadata
            .get(&Self::key(target))
            .cloned()
            .unwrap_or_default())
    }

    fn put_metadata(&mut self, target: &StoreTarget, metadata: &Metadata) -> Result<()> {
        self.metadata.insert(Self::key(target), metadata.clone());
        Ok(())
    }
}

/// Gold reference summaries and their metadata
#[derive(Debug, Clone, Default)]
pub struct GoldData {
    /// Reference summary per id
    pub summaries: BTreeMap<String, String>,
    /// Gold metadata, including our entity annotations
    pub metadata: Metadata,
}

/// Load gold references and metadata for `target`
pub fn load_gold_data(store: &dyn MetadataStore, target: &StoreTarget) -> Result<GoldData> {
    let summaries = store
        .get_summaries(target)?
        .into_iter()
        .map(|(id, stored)| (id, stored.summary))
        .collect();
    let metadata = store.get_metadata(target)?;
    Ok(GoldData {
        summaries,
        metadata,
    })
}
