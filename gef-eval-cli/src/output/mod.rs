//! Output formatting module

use anyhow::Result;
use gef_eval_core::factuality::SummaryEvaluation;
use gef_eval_core::iteration::Bucket;
use gef_eval_core::{AggregateMetrics, ConvergenceDistribution, EntityLabel};
use serde::Serialize;
use std::io::Write;

/// Trait for output formatters
pub trait ReportFormatter: Send + Sync {
    /// Format the convergence statistics of one iteration log
    fn write_convergence(&mut self, report: &ConvergenceReport) -> Result<()>;

    /// Format the results of one evaluation run
    fn write_evaluation(&mut self, report: &EvaluationReport<'_>) -> Result<()>;

    /// Finalize output (e.g., write the collected JSON document)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text for terminals
    Text,
    /// A single JSON document
    Json,
    /// Markdown tables
    Markdown,
}

/// Create the formatter for `format` writing to `writer`
pub fn create_formatter<W>(format: OutputFormat, writer: W) -> Box<dyn ReportFormatter>
where
    W: Write + Send + Sync + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
    }
}

/// Convergence statistics of one iteration log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    /// Series name, e.g. the experiment
    pub name: String,
    /// Number of iterations in the series
    pub iterations: usize,
    /// Distribution with the tail collapsed
    pub buckets: Vec<Bucket>,
    /// Mean number of iterations run
    pub mean: f64,
    /// Population standard deviation of the number of iterations run
    pub std_dev: f64,
}

impl ConvergenceReport {
    /// Summarize `distribution`, collapsing iterations from `tail` on
    pub fn new(
        name: impl Into<String>,
        distribution: &ConvergenceDistribution,
        tail: usize,
    ) -> Self {
        Self {
            name: name.into(),
            iterations: distribution.probabilities().len(),
            buckets: distribution.collapse_tail(tail),
            mean: distribution.mean(),
            std_dev: distribution.std_dev(),
        }
    }
}

/// Results of one evaluation run
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport<'a> {
    /// Model label, if one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    /// Aggregate metrics
    pub metrics: &'a AggregateMetrics,
    /// Per-summary evaluations selected for display
    pub summaries: &'a [SummaryEvaluation],
}

/// Label counts in display order
pub(crate) fn entity_rows(
    metrics: &AggregateMetrics,
) -> impl Iterator<Item = (EntityLabel, usize)> + '_ {
    [
        EntityLabel::NonHallucinated,
        EntityLabel::FactualHallucination,
        EntityLabel::NonFactualHallucination,
        EntityLabel::IntrinsicHallucination,
        EntityLabel::Unknown,
    ]
    .into_iter()
    .map(|label| (label, metrics.entities.count(label)))
}

/// Outcome fractions in display order
pub(crate) fn summary_rows(metrics: &AggregateMetrics) -> [(&'static str, f64); 6] {
    let s = &metrics.summaries;
    [
        ("factual", s.factual),
        ("non-factual", s.non_factual),
        ("non-factual (extrinsic)", s.non_factual_extrinsic),
        ("non-factual (intrinsic)", s.non_factual_intrinsic),
        ("skipped", s.skipped),
        ("unknown", s.unknown),
    ]
}
