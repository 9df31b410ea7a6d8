//! Evaluation statistics for generate-and-edit summarization
//!
//! This crate provides:
//! - convergence statistics over per-iteration logs ([`iteration`])
//! - entity-level factuality metrics of generated summaries ([`factuality`])
//! - human adjudication of entities without a label ([`annotation`])
//! - a JSON-file summary and metadata store ([`store`])
//! - LaTeX macro reports ([`report`])
//!
//! # Example
//!
//! ```
//! use gef_eval_core::{ConvergenceDistribution, IterationLog};
//!
//! let log = IterationLog::from_reader(
//!     r#"[{"iteration": 0, "summary_generated": 10},
//!         {"iteration": 1, "summary_generated": 4}]"#
//!         .as_bytes(),
//!     "inline",
//! )
//! .unwrap();
//! let series = log.convergence();
//! assert_eq!(series.counts(), &[6, 4]);
//!
//! let distribution = ConvergenceDistribution::from_series(&series).unwrap();
//! assert!((distribution.mean() - 1.4).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod annotation;
pub mod config;
pub mod data;
pub mod error;
pub mod factuality;
pub mod iteration;
pub mod report;
pub mod store;

pub use annotation::{
    AnnotationContext, AnnotationSession, DecisionSource, EntityPrompt, HumanDecision,
    ScriptedDecisions, Verdict,
};
pub use config::EvalConfig;
pub use data::{GeneratedSummaries, GeneratedSummary, SourceDocument, SourceDocuments};
pub use error::{EvalError, Result};
pub use factuality::{
    AggregateMetrics, EntityAnnotation, EntityLabel, EntityMatchType, EvaluationInput,
    EvaluationOptions, FactualityEvaluator, FactualityReport,
};
pub use iteration::{
    BaseModel, ConvergenceDistribution, ConvergenceSeries, Experiment, IterationLog,
};
pub use report::MetricTable;
pub use store::{JsonFileStore, Metadata, MetadataStore, StoreTarget};
