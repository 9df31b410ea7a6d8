//! Entity labels and annotations

use crate::error::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Factuality label of an entity in a generated summary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum EntityLabel {
    /// No annotation yet; needs human adjudication
    #[default]
    Unknown,
    /// Not supported by the source but verified true
    FactualHallucination,
    /// Contradicts the source document
    IntrinsicHallucination,
    /// Not supported by the source and not verified true
    NonFactualHallucination,
    /// Present in or entailed by the source document
    NonHallucinated,
}

impl EntityLabel {
    /// All labels in reporting order
    pub const ALL: [EntityLabel; 5] = [
        EntityLabel::Unknown,
        EntityLabel::FactualHallucination,
        EntityLabel::IntrinsicHallucination,
        EntityLabel::NonFactualHallucination,
        EntityLabel::NonHallucinated,
    ];

    /// Canonical label string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Unknown => "Unknown",
            EntityLabel::FactualHallucination => "Factual Hallucination",
            EntityLabel::IntrinsicHallucination => "Intrinsic Hallucination",
            EntityLabel::NonFactualHallucination => "Non-factual Hallucination",
            EntityLabel::NonHallucinated => "Non-hallucinated",
        }
    }

    /// Whether the label counts toward the extrinsic factuality ratio
    pub fn is_extrinsic_class(&self) -> bool {
        matches!(
            self,
            EntityLabel::NonHallucinated
                | EntityLabel::FactualHallucination
                | EntityLabel::NonFactualHallucination
        )
    }

    /// Whether the label makes a summary non-factual
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            EntityLabel::IntrinsicHallucination | EntityLabel::NonFactualHallucination
        )
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityLabel {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| EvalError::InvalidLabel {
                label: s.to_string(),
            })
    }
}

impl TryFrom<String> for EntityLabel {
    type Error = EvalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

/// An entity mention in a summary with its factuality label
///
/// `start`/`end` are character offsets into the summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityAnnotation {
    /// Surface text of the entity
    pub ent: String,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Factuality label
    #[serde(default)]
    pub label: EntityLabel,
}

impl EntityAnnotation {
    /// Create an annotation
    pub fn new(ent: impl Into<String>, start: usize, end: usize, label: EntityLabel) -> Self {
        Self {
            ent: ent.into(),
            start,
            end,
            label,
        }
    }

    /// Create an unlabelled entity mention
    pub fn unlabelled(ent: impl Into<String>, start: usize, end: usize) -> Self {
        Self::new(ent, start, end, EntityLabel::Unknown)
    }

    /// Same mention with a different label
    pub fn with_label(&self, label: EntityLabel) -> Self {
        Self {
            label,
            ..self.clone()
        }
    }

    /// Whether both refer to the same span
    pub fn same_span(&self, other: &EntityAnnotation) -> bool {
        self.ent == other.ent && self.start == other.start && self.end == other.end
    }
}
