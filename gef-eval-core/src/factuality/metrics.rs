//! Per-summary outcomes and aggregate factuality metrics

use super::label::{EntityAnnotation, EntityLabel};
use crate::error::{EvalError, Result};
use serde::Serialize;

/// Outcome of a single summary; exactly one per summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SummaryOutcome {
    /// No intrinsic or non-factual entity
    Factual,
    /// At least one intrinsic or non-factual entity
    NonFactual {
        /// Contains an intrinsic hallucination
        intrinsic: bool,
        /// Contains a non-factual extrinsic hallucination
        extrinsic: bool,
    },
    /// Skipped by the generation process and counted as its own bucket
    Skipped,
    /// Pending human adjudication
    Unknown,
}

impl SummaryOutcome {
    /// Outcome implied by a summary's entity labels
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityLabel>,
    {
        let mut intrinsic = false;
        let mut extrinsic = false;
        let mut unknown = false;
        for label in labels {
            match label {
                EntityLabel::IntrinsicHallucination => intrinsic = true,
                EntityLabel::NonFactualHallucination => extrinsic = true,
                EntityLabel::Unknown => unknown = true,
                EntityLabel::FactualHallucination | EntityLabel::NonHallucinated => {}
            }
        }

        if intrinsic || extrinsic {
            SummaryOutcome::NonFactual {
                intrinsic,
                extrinsic,
            }
        } else if unknown {
            SummaryOutcome::Unknown
        } else {
            SummaryOutcome::Factual
        }
    }

    /// Short name for reports
    pub fn name(&self) -> &'static str {
        match self {
            SummaryOutcome::Factual => "factual",
            SummaryOutcome::NonFactual { .. } => "non_factual",
            SummaryOutcome::Skipped => "skipped",
            SummaryOutcome::Unknown => "unknown",
        }
    }
}

/// Evaluation of one generated summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEvaluation {
    /// Summary id
    pub summary_id: String,
    /// Generated summary text
    pub summary: String,
    /// Labelled entities; empty for skipped summaries
    pub entities: Vec<EntityAnnotation>,
    /// Outcome
    #[serde(flatten)]
    pub outcome: SummaryOutcome,
    /// The generation process reported a failure
    pub failed: bool,
}

impl SummaryEvaluation {
    /// Number of entities with `label`
    pub fn count(&self, label: EntityLabel) -> usize {
        self.entities.iter().filter(|e| e.label == label).count()
    }

    /// `(Non-hallucinated + Factual) / (Non-hallucinated + Factual + Non-factual)`,
    /// `None` when the summary has no such entity
    pub fn extrinsic_factuality_ratio(&self) -> Option<f64> {
        let supported = self.count(EntityLabel::NonHallucinated)
            + self.count(EntityLabel::FactualHallucination);
        let extrinsic = supported + self.count(EntityLabel::NonFactualHallucination);
        (extrinsic > 0).then(|| supported as f64 / extrinsic as f64)
    }
}

/// Mean and population standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub stdev: f64,
}

impl MeanStd {
    /// Summarize `values`; `None` if empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Some(Self {
            mean,
            stdev: variance.sqrt(),
        })
    }
}

/// Summary-level aggregate: fractions of `total`, except `failed`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Number of summaries evaluated
    pub total: usize,
    /// Summaries with only supported entities
    pub factual: f64,
    /// Summaries with an intrinsic or non-factual entity
    pub non_factual: f64,
    /// Summaries with a non-factual extrinsic entity
    pub non_factual_extrinsic: f64,
    /// Summaries with an intrinsic entity
    pub non_factual_intrinsic: f64,
    /// Summaries skipped by the generation process
    pub skipped: f64,
    /// Summaries still awaiting adjudication
    pub unknown: f64,
    /// Raw count of summaries the generation process failed on
    pub failed: usize,
}

/// Entity-level aggregate: raw counts per label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMetrics {
    /// Entities awaiting adjudication
    #[serde(rename = "Unknown")]
    pub unknown: usize,
    /// Unsupported but true entities
    #[serde(rename = "Factual Hallucination")]
    pub factual_hallucination: usize,
    /// Entities contradicting the source
    #[serde(rename = "Intrinsic Hallucination")]
    pub intrinsic_hallucination: usize,
    /// Unsupported and untrue entities
    #[serde(rename = "Non-factual Hallucination")]
    pub non_factual_hallucination: usize,
    /// Entities supported by the source
    #[serde(rename = "Non-hallucinated")]
    pub non_hallucinated: usize,
    /// Sum of the label counts
    pub total: usize,
    /// Per-summary ratio summarized across summaries that have extrinsic entities
    pub extrinsic_factuality_ratio: Option<MeanStd>,
}

impl EntityMetrics {
    /// Count for a label
    pub fn count(&self, label: EntityLabel) -> usize {
        match label {
            EntityLabel::Unknown => self.unknown,
            EntityLabel::FactualHallucination => self.factual_hallucination,
            EntityLabel::IntrinsicHallucination => self.intrinsic_hallucination,
            EntityLabel::NonFactualHallucination => self.non_factual_hallucination,
            EntityLabel::NonHallucinated => self.non_hallucinated,
        }
    }
}

/// Aggregate metrics of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetrics {
    /// Summary-level fractions
    pub summaries: SummaryMetrics,
    /// Entity-level counts
    pub entities: EntityMetrics,
}

impl AggregateMetrics {
    /// Aggregate per-summary evaluations
    pub fn from_evaluations(evaluations: &[SummaryEvaluation]) -> Result<Self> {
        if evaluations.is_empty() {
            return Err(EvalError::NoSummaries);
        }

        let mut factual = 0usize;
        let mut non_factual = 0usize;
        let mut non_factual_extrinsic = 0usize;
        let mut non_factual_intrinsic = 0usize;
        let mut skipped = 0usize;
        let mut unknown = 0usize;
        let mut failed = 0usize;
        let mut label_counts = [0usize; EntityLabel::ALL.len()];
        let mut ratios = Vec::new();

        for evaluation in evaluations {
            match evaluation.outcome {
                SummaryOutcome::Factual => factual += 1,
                SummaryOutcome::NonFactual {
                    intrinsic,
                    extrinsic,
                } => {
                    non_factual += 1;
                    non_factual_intrinsic += usize::from(intrinsic);
                    non_factual_extrinsic += usize::from(extrinsic);
                }
                SummaryOutcome::Skipped => skipped += 1,
                SummaryOutcome::Unknown => unknown += 1,
            }
            failed += usize::from(evaluation.failed);

            for entity in &evaluation.entities {
                label_counts[entity.label as usize] += 1;
            }
            if let Some(ratio) = evaluation.extrinsic_factuality_ratio() {
                ratios.push(ratio);
            }
        }

        let total = evaluations.len();
        let fraction = |count: usize| count as f64 / total as f64;
        let count = |label: EntityLabel| label_counts[label as usize];

        Ok(Self {
            summaries: SummaryMetrics {
                total,
                factual: fraction(factual),
                non_factual: fraction(non_factual),
                non_factual_extrinsic: fraction(non_factual_extrinsic),
                non_factual_intrinsic: fraction(non_factual_intrinsic),
                skipped: fraction(skipped),
                unknown: fraction(unknown),
                failed,
            },
            entities: EntityMetrics {
                unknown: count(EntityLabel::Unknown),
                factual_hallucination: count(EntityLabel::FactualHallucination),
                intrinsic_hallucination: count(EntityLabel::IntrinsicHallucination),
                non_factual_hallucination: count(EntityLabel::NonFactualHallucination),
                non_hallucinated: count(EntityLabel::NonHallucinated),
                total: label_counts.iter().sum(),
                extrinsic_factuality_ratio: MeanStd::from_values(&ratios),
            },
        })
    }

    /// `(metric name, value)` pairs for LaTeX macros; values are fractions
    pub fn latex_metrics(&self) -> Vec<(&'static str, f64)> {
        let s = &self.summaries;
        let mut metrics = vec![
            ("Factual", s.factual),
            ("NonFactual", s.non_factual),
            ("NonFactualExtrinsic", s.non_factual_extrinsic),
            ("NonFactualIntrinsic", s.non_factual_intrinsic),
            ("Skipped", s.skipped),
        ];
        if let Some(ratio) = self.entities.extrinsic_factuality_ratio {
            metrics.push(("ExtrinsicFactualityRatio", ratio.mean));
        }
        metrics
    }
}
