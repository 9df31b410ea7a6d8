//! Entity-level factuality evaluation of generated summaries

use super::extract::{EntityExtractor, PatternExtractor};
use super::label::{EntityAnnotation, EntityLabel};
use super::matching::EntityMatchType;
use super::metrics::{AggregateMetrics, SummaryEvaluation, SummaryOutcome};
use crate::annotation::{self, AnnotationContext, AnnotationSession, DecisionSource};
use crate::data::{GeneratedSummaries, GeneratedSummary, SourceDocuments};
use crate::error::{EvalError, Result};
use crate::store::{Metadata, MetadataStore, StoreTarget, SummaryMetadata};
use std::collections::BTreeMap;

/// Flags controlling an evaluation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Offer interactive adjudication of unknown entities
    pub should_annotate: bool,
    /// How entities are matched against annotations and texts
    pub entity_match_type: EntityMatchType,
    /// Number of per-summary evaluations to log for inspection
    pub print_first_n: usize,
    /// Input comes from the generate-and-edit process (skip/fail signals apply)
    pub is_fbs: bool,
    /// The process used oracle labels, so its own entity labels are trusted
    pub is_oracle: bool,
    /// Count skipped summaries as their own bucket instead of evaluating them
    pub count_skips: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            should_annotate: false,
            entity_match_type: EntityMatchType::default(),
            print_first_n: 0,
            is_fbs: false,
            is_oracle: false,
            count_skips: true,
        }
    }
}

/// Everything an evaluation reads
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Generated summaries by id
    pub generated: &'a GeneratedSummaries,
    /// Gold reference summaries by id
    pub gold_summaries: &'a BTreeMap<String, String>,
    /// Gold metadata holding entity annotations
    pub gold_metadata: &'a Metadata,
    /// Source documents by id
    pub documents: &'a SourceDocuments,
}

/// Result of an evaluation run
#[derive(Debug, Clone)]
pub struct FactualityReport {
    /// Aggregate metrics
    pub metrics: AggregateMetrics,
    /// Per-summary evaluations in id order
    pub summaries: Vec<SummaryEvaluation>,
    /// Entities still labelled `Unknown`, by summary id
    pub unknown_entities: BTreeMap<String, Vec<EntityAnnotation>>,
}

impl FactualityReport {
    /// Summary text per id, as evaluated
    pub fn summary_texts(&self) -> BTreeMap<String, String> {
        self.summaries
            .iter()
            .map(|s| (s.summary_id.clone(), s.summary.clone()))
            .collect()
    }
}

/// Evaluates generated summaries against gold data
pub struct FactualityEvaluator {
    options: EvaluationOptions,
    extractor: Box<dyn EntityExtractor>,
}

impl FactualityEvaluator {
    /// Create an evaluator using the pattern entity extractor
    pub fn new(options: EvaluationOptions) -> Result<Self> {
        Ok(Self {
            options,
            extractor: Box::new(PatternExtractor::new()?),
        })
    }

    /// Use a different entity extractor for summaries without entities
    pub fn with_extractor(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Evaluation options
    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluate every generated summary
    pub fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<FactualityReport> {
        self.evaluate_with_progress(input, |_| {})
    }

    /// Evaluate, calling `on_summary` after each summary
    pub fn evaluate_with_progress<F>(
        &self,
        input: &EvaluationInput<'_>,
        mut on_summary: F,
    ) -> Result<FactualityReport>
    where
        F: FnMut(&str),
    {
        let mut summaries = Vec::with_capacity(input.generated.len());
        let mut unknown_entities = BTreeMap::new();

        for (summary_id, generated) in input.generated {
            let evaluation = self.evaluate_summary(summary_id, generated, input)?;

            if summaries.len() < self.options.print_first_n {
                tracing::info!(
                    "{summary_id} [{}]: {} | {}",
                    evaluation.outcome.name(),
                    evaluation.summary,
                    evaluation
                        .entities
                        .iter()
                        .map(|e| format!("{} ({})", e.ent, e.label))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            let unknown: Vec<EntityAnnotation> = evaluation
                .entities
                .iter()
                .filter(|e| e.label == EntityLabel::Unknown)
                .cloned()
                .collect();
            if !unknown.is_empty() {
                unknown_entities.insert(summary_id.clone(), unknown);
            }

            summaries.push(evaluation);
            on_summary(summary_id);
        }

        let metrics = AggregateMetrics::from_evaluations(&summaries)?;
        tracing::debug!(
            "evaluated {} summaries, {} entities, {} unknown",
            metrics.summaries.total,
            metrics.entities.total,
            metrics.entities.unknown
        );

        Ok(FactualityReport {
            metrics,
            summaries,
            unknown_entities,
        })
    }

    /// Evaluate, adjudicate unknown entities if requested, and re-evaluate
    ///
    /// Annotations collected in the session are persisted to `target` before
    /// the second evaluation, which reads the updated metadata.
    pub fn evaluate_with_annotation(
        &self,
        input: &EvaluationInput<'_>,
        store: &mut dyn MetadataStore,
        target: &StoreTarget,
        decisions: &mut dyn DecisionSource,
    ) -> Result<(FactualityReport, Option<AnnotationSession>)> {
        let report = self.evaluate(input)?;
        if !self.options.should_annotate || report.unknown_entities.is_empty() {
            return Ok((report, None));
        }

        let summary_texts = report.summary_texts();
        let context = AnnotationContext {
            documents: input.documents,
            gold_summaries: input.gold_summaries,
            summaries: &summary_texts,
        };
        let Some((session, updated_metadata)) = annotation::prompt_annotation_flow(
            &report.unknown_entities,
            &context,
            decisions,
            store,
            target,
            input.gold_metadata,
        )?
        else {
            return Ok((report, None));
        };

        let updated_input = EvaluationInput {
            gold_metadata: &updated_metadata,
            ..*input
        };
        let report = self.evaluate(&updated_input)?;
        Ok((report, Some(session)))
    }

    fn evaluate_summary(
        &self,
        summary_id: &str,
        generated: &GeneratedSummary,
        input: &EvaluationInput<'_>,
    ) -> Result<SummaryEvaluation> {
        let reference = input
            .gold_summaries
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingGold {
                summary_id: summary_id.to_string(),
            })?;
        let document = input
            .documents
            .get(summary_id)
            .ok_or_else(|| EvalError::MissingDocument {
                summary_id: summary_id.to_string(),
            })?;

        let skipped = self.options.is_fbs && generated.skipped;
        let failed = self.options.is_fbs && generated.failed;

        if skipped && self.options.count_skips {
            return Ok(SummaryEvaluation {
                summary_id: summary_id.to_string(),
                summary: generated.summary.clone(),
                entities: Vec::new(),
                outcome: SummaryOutcome::Skipped,
                failed,
            });
        }

        let candidates = match &generated.entities {
            Some(entities) => entities.clone(),
            None => self.extractor.extract(&generated.summary),
        };
        let gold_metadata = input.gold_metadata.get(summary_id);

        let entities: Vec<EntityAnnotation> = candidates
            .iter()
            .map(|entity| {
                let label = self.label_entity(
                    entity,
                    &generated.summary,
                    gold_metadata,
                    &document.document,
                    reference,
                );
                entity.with_label(label)
            })
            .collect();
        let outcome = SummaryOutcome::from_labels(entities.iter().map(|e| &e.label));

        Ok(SummaryEvaluation {
            summary_id: summary_id.to_string(),
            summary: generated.summary.clone(),
            entities,
            outcome,
            failed,
        })
    }

    fn label_entity(
        &self,
        entity: &EntityAnnotation,
        summary: &str,
        gold_metadata: Option<&SummaryMetadata>,
        document: &str,
        reference: &str,
    ) -> EntityLabel {
        let matching = self.options.entity_match_type;

        if self.options.is_oracle && entity.label != EntityLabel::Unknown {
            return entity.label;
        }

        if let Some(label) = gold_metadata
            .and_then(|metadata| matching.find_label(entity, metadata.annotations_for(summary)))
        {
            return label;
        }

        if matching.text_contains(document, &entity.ent) {
            EntityLabel::NonHallucinated
        } else if matching.text_contains(reference, &entity.ent) {
            EntityLabel::FactualHallucination
        } else {
            EntityLabel::Unknown
        }
    }
}
