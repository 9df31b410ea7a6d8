//! How generated entities are matched against annotations and texts

use super::label::{EntityAnnotation, EntityLabel};
use crate::error::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityMatchType {
    /// Annotations must match text and span; text containment is case-sensitive
    Strict,
    /// Case-insensitive text matching, except intrinsic annotations which need
    /// an exact span
    #[default]
    StrictIntrinsic,
    /// Case-insensitive text matching everywhere
    Lenient,
}

impl EntityMatchType {
    /// All match types
    pub const ALL: [EntityMatchType; 3] = [
        EntityMatchType::Strict,
        EntityMatchType::StrictIntrinsic,
        EntityMatchType::Lenient,
    ];

    /// Name used in configuration files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityMatchType::Strict => "strict",
            EntityMatchType::StrictIntrinsic => "strict_intrinsic",
            EntityMatchType::Lenient => "lenient",
        }
    }

    /// Whether `annotation` labels the mention `entity`
    pub fn annotation_matches(
        &self,
        entity: &EntityAnnotation,
        annotation: &EntityAnnotation,
    ) -> bool {
        let needs_span = match self {
            EntityMatchType::Strict => true,
            EntityMatchType::StrictIntrinsic => {
                annotation.label == EntityLabel::IntrinsicHallucination
            }
            EntityMatchType::Lenient => false,
        };

        if needs_span {
            entity.same_span(annotation)
        } else {
            entity.ent.to_lowercase() == annotation.ent.to_lowercase()
        }
    }

    /// Whether `text` mentions `entity`
    pub fn text_contains(&self, text: &str, entity: &str) -> bool {
        if entity.is_empty() {
            return false;
        }
        match self {
            EntityMatchType::Strict => text.contains(entity),
            _ => text.to_lowercase().contains(&entity.to_lowercase()),
        }
    }

    /// Label from the most recent matching annotation, if any
    pub fn find_label(
        &self,
        entity: &EntityAnnotation,
        annotations: &[EntityAnnotation],
    ) -> Option<EntityLabel> {
        annotations
            .iter()
            .rev()
            .find(|annotation| self.annotation_matches(entity, annotation))
            .map(|annotation| annotation.label)
    }
}

impl fmt::Display for EntityMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityMatchType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityMatchType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| EvalError::Config {
                message: format!(
                    "unknown entity match type '{s}' (expected strict, strict_intrinsic or lenient)"
                ),
            })
    }
}
