//! Interactive adjudication sessions

use super::decision::{classify, DecisionSource, EntityPrompt, HumanDecision};
use super::updater::persist_updated_annotations;
use crate::data::SourceDocuments;
use crate::error::{EvalError, Result};
use crate::factuality::{EntityAnnotation, EntityLabel};
use crate::store::{Metadata, MetadataStore, StoreTarget};
use std::collections::BTreeMap;

/// Question asked before a session starts
pub const ANNOTATE_QUESTION: &str = "Would you like to annotate unknown entities? (y/n)";

/// Texts shown while adjudicating
#[derive(Debug, Clone, Copy)]
pub struct AnnotationContext<'a> {
    /// Source documents by summary id
    pub documents: &'a SourceDocuments,
    /// Gold reference summaries by id
    pub gold_summaries: &'a BTreeMap<String, String>,
    /// Generated summaries under evaluation by id
    pub summaries: &'a BTreeMap<String, String>,
}

impl<'a> AnnotationContext<'a> {
    fn texts(&self, summary_id: &str) -> Result<(&'a str, &'a str, &'a str)> {
        let document = self
            .documents
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingDocument {
                summary_id: summary_id.to_string(),
            })?;
        let reference = self
            .gold_summaries
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingGold {
                summary_id: summary_id.to_string(),
            })?;
        let summary = self
            .summaries
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingSummary {
                summary_id: summary_id.to_string(),
            })?;
        Ok((document.document.as_str(), reference.as_str(), summary.as_str()))
    }
}

/// Annotations collected in one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSession {
    /// Adjudicated annotations by summary id
    pub annotations: BTreeMap<String, Vec<EntityAnnotation>>,
    /// Every unknown entity was visited
    pub completed: bool,
}

impl AnnotationSession {
    /// Number of annotations collected
    pub fn len(&self) -> usize {
        self.annotations.values().map(Vec::len).sum()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ask `source` about every unknown entity, in summary id order
///
/// `Unknown` answers record nothing; `SkipAndSave` ends the session early.
pub fn annotate_entities(
    unknowns: &BTreeMap<String, Vec<EntityAnnotation>>,
    context: &AnnotationContext<'_>,
    source: &mut dyn DecisionSource,
) -> Result<AnnotationSession> {
    let mut session = AnnotationSession::default();

    for (summary_id, entities) in unknowns {
        let pending: Vec<&EntityAnnotation> = entities
            .iter()
            .filter(|e| e.label == EntityLabel::Unknown)
            .collect();
        if pending.is_empty() {
            continue;
        }
        let (document, reference, summary) = context.texts(summary_id)?;

        for (i, entity) in pending.into_iter().enumerate() {
            let prompt = EntityPrompt {
                summary_id,
                document,
                reference,
                summary,
                entity,
                first_for_summary: i == 0,
            };
            match source.decide(&prompt)? {
                HumanDecision::Label(verdict) => {
                    session
                        .annotations
                        .entry(summary_id.clone())
                        .or_default()
                        .push(classify(entity, verdict));
                }
                HumanDecision::Unknown => {}
                HumanDecision::SkipAndSave => {
                    tracing::info!("annotation stopped at summary {summary_id}");
                    return Ok(session);
                }
            }
        }
    }

    session.completed = true;
    Ok(session)
}

/// Offer a session, run it, and persist what it collected
///
/// Returns `None` when the offer is declined. Otherwise returns the session
/// with the metadata now held by the store.
pub fn prompt_annotation_flow(
    unknowns: &BTreeMap<String, Vec<EntityAnnotation>>,
    context: &AnnotationContext<'_>,
    decisions: &mut dyn DecisionSource,
    store: &mut dyn MetadataStore,
    target: &StoreTarget,
    old_metadata: &Metadata,
) -> Result<Option<(AnnotationSession, Metadata)>> {
    let total: usize = unknowns.values().map(Vec::len).sum();
    tracing::info!(
        "{total} unknown entities across {} summaries",
        unknowns.len()
    );
    if !decisions.confirm(ANNOTATE_QUESTION)? {
        return Ok(None);
    }

    let session = annotate_entities(unknowns, context, decisions)?;
    if session.is_empty() {
        tracing::info!("no annotations collected, metadata left unchanged");
        return Ok(Some((session, old_metadata.clone())));
    }

    let metadata = persist_updated_annotations(
        store,
        target,
        old_metadata,
        &session.annotations,
        context.summaries,
    )?;
    Ok(Some((session, metadata)))
}
