//! Entity-level factuality of generated summaries
//!
//! Every entity in a summary gets an [`EntityLabel`]: from the generation
//! method (oracle runs), from gold annotations, or by looking the entity up in
//! the source document and the reference summary. Entity labels decide the
//! [`SummaryOutcome`], and outcomes aggregate into [`AggregateMetrics`].

pub mod evaluator;
pub mod extract;
pub mod label;
pub mod matching;
pub mod metrics;

pub use evaluator::{EvaluationInput, EvaluationOptions, FactualityEvaluator, FactualityReport};
pub use extract::{EntityExtractor, PatternExtractor};
pub use label::{EntityAnnotation, EntityLabel};
pub use matching::EntityMatchType;
pub use metrics::{
    AggregateMetrics, EntityMetrics, MeanStd, SummaryEvaluation, SummaryMetrics, SummaryOutcome,
};
