//! Human adjudication decisions

use crate::error::EvalError;
use crate::factuality::{EntityAnnotation, EntityLabel};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Label a human assigns to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not supported and not true
    NonFactual,
    /// Not supported by the source but true
    Factual,
    /// Contradicts the source
    Intrinsic,
}

impl Verdict {
    /// Entity label recorded for this verdict
    pub fn label(&self) -> EntityLabel {
        match self {
            Verdict::NonFactual => EntityLabel::NonFactualHallucination,
            Verdict::Factual => EntityLabel::FactualHallucination,
            Verdict::Intrinsic => EntityLabel::IntrinsicHallucination,
        }
    }
}

/// Answer to one adjudication prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanDecision {
    /// Record a label
    Label(Verdict),
    /// Leave the entity unknown and move on
    Unknown,
    /// Stop the session and save what was collected
    SkipAndSave,
}

impl HumanDecision {
    /// Prompt line listing the accepted inputs
    pub const CHOICES: &'static str =
        "Non-factual (0), Factual (1), Intrinsic (I), Unknown (U) or Skip & save annotations (S)";
}

impl FromStr for HumanDecision {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(HumanDecision::Label(Verdict::NonFactual)),
            "1" => Ok(HumanDecision::Label(Verdict::Factual)),
            "I" => Ok(HumanDecision::Label(Verdict::Intrinsic)),
            "U" => Ok(HumanDecision::Unknown),
            "S" => Ok(HumanDecision::SkipAndSave),
            other => Err(EvalError::InvalidLabel {
                label: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HumanDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sentinel = match self {
            HumanDecision::Label(Verdict::NonFactual) => "0",
            HumanDecision::Label(Verdict::Factual) => "1",
            HumanDecision::Label(Verdict::Intrinsic) => "I",
            HumanDecision::Unknown => "U",
            HumanDecision::SkipAndSave => "S",
        };
        f.write_str(sentinel)
    }
}

/// Annotation recorded for `entity` under `verdict`
pub fn classify(entity: &EntityAnnotation, verdict: Verdict) -> EntityAnnotation {
    entity.with_label(verdict.label())
}

/// What a decision source is shown for one entity
#[derive(Debug, Clone, Copy)]
pub struct EntityPrompt<'a> {
    /// Summary id
    pub summary_id: &'a str,
    /// Source document
    pub document: &'a str,
    /// Gold reference summary
    pub reference: &'a str,
    /// Generated summary
    pub summary: &'a str,
    /// Entity to adjudicate
    pub entity: &'a EntityAnnotation,
    /// First prompt for this summary (context should be shown)
    pub first_for_summary: bool,
}

/// Source of human decisions
pub trait DecisionSource {
    /// Yes/no question before a session starts
    fn confirm(&mut self, question: &str) -> crate::Result<bool>;

    /// Decision for one entity
    fn decide(&mut self, prompt: &EntityPrompt<'_>) -> crate::Result<HumanDecision>;
}

/// Pre-recorded decisions; running out means skip & save
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    accept: bool,
    decisions: VecDeque<HumanDecision>,
}

impl ScriptedDecisions {
    /// Script that accepts the session and answers with `decisions` in order
    pub fn new<I>(decisions: I) -> Self
    where
        I: IntoIterator<Item = HumanDecision>,
    {
        Self {
            accept: true,
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Script that declines the session
    pub fn declining() -> Self {
        Self::default()
    }

    /// Decisions not consumed yet
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl DecisionSource for ScriptedDecisions {
    fn confirm(&mut self, _question: &str) -> crate::Result<bool> {
        Ok(self.accept)
    }

    fn decide(&mut self, _prompt: &EntityPrompt<'_>) -> crate::Result<HumanDecision> {
        Ok(self
            .decisions
            .pop_front()
            .unwrap_or(HumanDecision::SkipAndSave))
    }
}
