//! Entity candidates for summaries that come without entity annotations

use super::label::EntityAnnotation;
use crate::error::{EvalError, Result};
use regex::Regex;

/// Source of entity mentions in a summary
pub trait EntityExtractor {
    /// Find entity mentions in `text`; returned annotations are unlabelled
    fn extract(&self, text: &str) -> Vec<EntityAnnotation>;
}

/// Words that start a sentence in capitals without naming anything
const FUNCTION_WORDS: &[&str] = &[
    "A", "An", "And", "As", "At", "But", "By", "For", "From", "He", "Her", "His", "I", "In",
    "It", "Its", "Of", "On", "One", "She", "So", "That", "The", "Their", "There", "These",
    "They", "This", "Those", "To", "We", "What", "When", "Where", "Which", "While", "Who",
    "With", "You",
];

const ENTITY_PATTERN: &str =
    r"\b(?:\p{Lu}[\p{L}\p{N}'’-]*(?:\s+\p{Lu}[\p{L}\p{N}'’-]*)*|\p{N}[\p{N},.]*\p{N}%?|\p{N}%?)";

/// Capitalised word runs and numbers
pub struct PatternExtractor {
    pattern: Regex,
}

impl PatternExtractor {
    /// Create the extractor
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(ENTITY_PATTERN).map_err(|e| EvalError::Config {
            message: format!("invalid entity pattern: {e}"),
        })?;
        Ok(Self { pattern })
    }
}

impl EntityExtractor for PatternExtractor {
    fn extract(&self, text: &str) -> Vec<EntityAnnotation> {
        self.pattern
            .find_iter(text)
            .filter_map(|m| {
                let mut span = m.as_str();
                let mut byte_start = m.start();

                // Drop a leading function word such as "The" in "The BBC"
                if let Some((first, rest)) = span.split_once(char::is_whitespace) {
                    if FUNCTION_WORDS.contains(&first) {
                        byte_start += span.len() - rest.trim_start().len();
                        span = rest.trim_start();
                    }
                } else if FUNCTION_WORDS.contains(&span) {
                    return None;
                }

                let start = text[..byte_start].chars().count();
                let end = start + span.chars().count();
                Some(EntityAnnotation::unlabelled(span, start, end))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(text: &str) -> Vec<String> {
        PatternExtractor::new()
            .unwrap()
            .extract(text)
            .into_iter()
            .map(|e| e.ent)
            .collect()
    }

    #[test]
    fn test_finds_names_and_numbers() {
        assert_eq!(
            surface("The Welsh Rugby Union said 3,000 fans travelled to Paris."),
            vec!["Welsh Rugby Union", "3,000", "Paris"]
        );
    }

    #[test]
    fn test_skips_sentence_initial_function_words() {
        assert_eq!(surface("He said it was over."), Vec::<String>::new());
    }

    #[test]
    fn test_offsets_are_character_based() {
        let entities = PatternExtractor::new().unwrap().extract("Café owner Zoë Ball won 5%");
        let zoe = entities.iter().find(|e| e.ent == "Zoë Ball").unwrap();
        assert_eq!((zoe.start, zoe.end), (11, 19));

        let percent = entities.iter().find(|e| e.ent == "5%").unwrap();
        assert_eq!((percent.start, percent.end), (24, 26));
    }
}
