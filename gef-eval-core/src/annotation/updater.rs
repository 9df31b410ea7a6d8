//! Merging adjudicated annotations into stored metadata

use crate::error::{EvalError, Result};
use crate::factuality::EntityAnnotation;
use crate::store::{Metadata, MetadataStore, StoreTarget};
use std::collections::BTreeMap;

/// Append `updates` to `old_metadata` and persist the result
///
/// New annotations go into the `our_annotations` bucket of the summary text
/// they were made on; existing annotations are never removed. Summary ids
/// without an entry in `old_metadata` are skipped. The merged metadata is
/// written with a single whole-value replace and returned.
pub fn persist_updated_annotations(
    store: &mut dyn MetadataStore,
    target: &StoreTarget,
    old_metadata: &Metadata,
    updates: &BTreeMap<String, Vec<EntityAnnotation>>,
    summaries_by_id: &BTreeMap<String, String>,
) -> Result<Metadata> {
    let mut metadata = old_metadata.clone();
    let mut added = 0usize;

    for (summary_id, annotations) in updates {
        if annotations.is_empty() {
            continue;
        }
        let Some(entry) = metadata.get_mut(summary_id) else {
            tracing::warn!("no stored metadata for summary {summary_id}, annotations dropped");
            continue;
        };
        let summary = summaries_by_id
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingSummary {
                summary_id: summary_id.clone(),
            })?;

        entry
            .our_annotations
            .entry(summary.clone())
            .or_default()
            .extend(annotations.iter().cloned());
        added += annotations.len();
    }

    store.put_metadata(target, &metadata)?;
    tracing::info!("saved {added} new entity annotations for '{}'", target.model);
    Ok(metadata)
}
