//! Human adjudication of unknown entities
//!
//! Entities the evaluator cannot label are offered to a [`DecisionSource`].
//! Collected labels are appended to the gold metadata in the store, so later
//! evaluations pick them up.

mod decision;
mod session;
mod updater;

pub use decision::{
    classify, DecisionSource, EntityPrompt, HumanDecision, ScriptedDecisions, Verdict,
};
pub use session::{
    annotate_entities, prompt_annotation_flow, AnnotationContext, AnnotationSession,
    ANNOTATE_QUESTION,
};
pub use updater::persist_updated_annotations;
