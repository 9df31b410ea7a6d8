//! Loaders for generated summaries, source documents and test splits

use crate::error::{EvalError, Result};
use crate::factuality::EntityAnnotation;
use crate::store::StoredSummary;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A generated summary ready for evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedSummary {
    /// Summary text
    pub summary: String,
    /// Entity annotations from the generation method, `None` if it produced none
    pub entities: Option<Vec<EntityAnnotation>>,
    /// The generation process gave up on this example
    pub skipped: bool,
    /// The generation process failed on this example
    pub failed: bool,
}

impl GeneratedSummary {
    /// A plain summary with no generation signals
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    /// Attach entity annotations from the generation method
    pub fn with_entities(mut self, entities: Vec<EntityAnnotation>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Mark as skipped by the generation process
    pub fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    /// Mark as failed by the generation process
    pub fn failed(mut self) -> Self {
        self.failed = true;
        self
    }
}

/// Generated summaries keyed by summary id
pub type GeneratedSummaries = BTreeMap<String, GeneratedSummary>;

/// One iteration of the generate-and-edit process for an example
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationOutput {
    /// Summary produced in this iteration
    pub summary: String,
    /// Entities labelled by the process in this iteration, if it logged any
    #[serde(default)]
    pub entities: Option<Vec<EntityAnnotation>>,
}

/// One example of a generation log
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationRecord {
    /// Summary id
    pub id: String,
    /// Outputs in iteration order
    pub iterations: Vec<IterationOutput>,
    /// The process gave up on this example
    #[serde(default)]
    pub skipped: bool,
    /// The process failed on this example
    #[serde(default)]
    pub failed: bool,
}

/// XSUM source document with its reference summary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDocument {
    /// Article text
    pub document: String,
    /// Reference summary
    pub summary: String,
}

/// Source documents keyed by summary id
pub type SourceDocuments = BTreeMap<String, SourceDocument>;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| EvalError::parse(path, e))
}

/// Load the final summaries of a generate-and-edit log
///
/// With `max_iterations`, the summary of the last iteration within that
/// budget is used instead of the last logged one.
pub fn load_generation_log<P: AsRef<Path>>(
    path: P,
    max_iterations: Option<usize>,
) -> Result<GeneratedSummaries> {
    let path = path.as_ref();
    let records: Vec<GenerationRecord> = read_json(path)?;
    let summaries = summaries_from_records(records, max_iterations, &path.display().to_string())?;
    tracing::info!(
        "loaded {} generated summaries from {}",
        summaries.len(),
        path.display()
    );
    Ok(summaries)
}

/// Convert generation records into summaries
pub fn summaries_from_records(
    records: Vec<GenerationRecord>,
    max_iterations: Option<usize>,
    origin: &str,
) -> Result<GeneratedSummaries> {
    if max_iterations == Some(0) {
        return Err(EvalError::Config {
            message: "max_iterations must be at least 1".to_string(),
        });
    }

    let mut summaries = GeneratedSummaries::new();
    for record in records {
        let available = record.iterations.len();
        let used = max_iterations.map_or(available, |max| max.min(available));
        let Some(output) = used.checked_sub(1).and_then(|i| record.iterations.get(i)) else {
            return Err(EvalError::Format {
                context: format!("generation log {origin}"),
                message: format!("example '{}' has no iterations", record.id),
            });
        };

        let summary = GeneratedSummary {
            summary: output.summary.clone(),
            entities: output.entities.clone(),
            skipped: record.skipped,
            failed: record.failed,
        };
        if summaries.insert(record.id.clone(), summary).is_some() {
            return Err(EvalError::Format {
                context: format!("generation log {origin}"),
                message: format!("example '{}' appears twice", record.id),
            });
        }
    }
    Ok(summaries)
}

/// Generated summaries from stored model output (no entities, no signals)
pub fn summaries_from_store(stored: BTreeMap<String, StoredSummary>) -> GeneratedSummaries {
    stored
        .into_iter()
        .map(|(id, s)| (id, GeneratedSummary::new(s.summary)))
        .collect()
}

/// Load source documents, `{id: {document, summary}}`
pub fn load_source_documents<P: AsRef<Path>>(path: P) -> Result<SourceDocuments> {
    read_json(path.as_ref())
}

/// Load a JSON array of summary ids
pub fn load_id_filter<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    read_json(path.as_ref())
}

/// Keep only summaries whose id is in `ids`
pub fn filter_by_ids(summaries: GeneratedSummaries, ids: &BTreeSet<String>) -> GeneratedSummaries {
    summaries
        .into_iter()
        .filter(|(id, _)| ids.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factuality::EntityLabel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LOG: &str = r#"[
        {
            "id": "1",
            "iterations": [
                {"summary": "First draft.", "entities": []},
                {"summary": "Second draft about Wales.",
                 "entities": [{"ent": "Wales", "start": 19, "end": 24, "label": "Non-hallucinated"}]}
            ]
        },
        {
            "id": "2",
            "iterations": [{"summary": "Gave up."}],
            "skipped": true,
            "failed": true
        }
    ]"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_uses_last_iteration() {
        let file = write_temp(LOG);
        let summaries = load_generation_log(file.path(), None).unwrap();

        let first = &summaries["1"];
        assert_eq!(first.summary, "Second draft about Wales.");
        let entities = first.entities.as_ref().unwrap();
        assert_eq!(entities[0].label, EntityLabel::NonHallucinated);
        assert!(!first.skipped);

        let second = &summaries["2"];
        assert!(second.skipped && second.failed);
        assert_eq!(second.entities, None);
    }

    #[test]
    fn test_max_iterations_truncates() {
        let file = write_temp(LOG);
        let summaries = load_generation_log(file.path(), Some(1)).unwrap();
        assert_eq!(summaries["1"].summary, "First draft.");
    }

    #[test]
    fn test_record_without_iterations_fails() {
        let file = write_temp(r#"[{"id": "9", "iterations": []}]"#);
        let err = load_generation_log(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("'9' has no iterations"));
    }

    #[test]
    fn test_unknown_field_fails() {
        let file = write_temp(r#"[{"id": "9", "iterations": [], "score": 3}]"#);
        assert!(matches!(
            load_generation_log(file.path(), None),
            Err(EvalError::Parse { .. })
        ));
    }

    #[test]
    fn test_filter_by_ids() {
        let mut summaries = GeneratedSummaries::new();
        summaries.insert("1".to_string(), GeneratedSummary::new("a"));
        summaries.insert("2".to_string(), GeneratedSummary::new("b"));

        let ids: BTreeSet<String> = ["2".to_string()].into_iter().collect();
        let filtered = filter_by_ids(summaries, &ids);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn test_load_source_documents() {
        let file = write_temp(r#"{"1": {"document": "Wales beat France.", "summary": "Wales won."}}"#);
        let docs = load_source_documents(file.path()).unwrap();
        assert_eq!(docs["1"].summary, "Wales won.");
    }
}
