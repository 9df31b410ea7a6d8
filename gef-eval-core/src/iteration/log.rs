//! Per-iteration generation logs

use crate::error::{EvalError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// One record of an iteration log as written by the generation process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterationRecord {
    /// Iteration number (0-based)
    pub iteration: u64,
    /// Summaries generated during this iteration
    #[serde(rename = "summary_generated")]
    pub summaries_generated: u64,
}

/// Highest iteration number a log may contain
pub const MAX_ITERATION: u64 = 100_000;

/// Iteration log keyed uniquely by iteration number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationLog {
    generated: BTreeMap<u64, u64>,
}

impl IterationLog {
    /// Read a log from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
        let records: Vec<IterationRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EvalError::parse(path, e))?;

        let log = Self::from_records(records)?;
        tracing::debug!(
            "read {} iterations from {}",
            log.len(),
            path.display()
        );
        Ok(log)
    }

    /// Read a log from any reader; `origin` names the source in errors
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self> {
        let records: Vec<IterationRecord> =
            serde_json::from_reader(reader).map_err(|e| EvalError::parse(origin, e))?;
        Self::from_records(records)
    }

    /// Build a log from records, rejecting duplicate iteration numbers
    ///
    /// Iteration numbers above [`MAX_ITERATION`] and counts that do not fit
    /// an `i64` are rejected as malformed.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = IterationRecord>,
    {
        let mut generated = BTreeMap::new();
        for record in records {
            if record.iteration > MAX_ITERATION {
                return Err(EvalError::Format {
                    context: "iteration log".to_string(),
                    message: format!(
                        "iteration {} exceeds the maximum of {MAX_ITERATION}",
                        record.iteration
                    ),
                });
            }
            if i64::try_from(record.summaries_generated).is_err() {
                return Err(EvalError::Format {
                    context: "iteration log".to_string(),
                    message: format!(
                        "iteration {}: summary_generated {} is out of range",
                        record.iteration, record.summaries_generated
                    ),
                });
            }
            if generated
                .insert(record.iteration, record.summaries_generated)
                .is_some()
            {
                return Err(EvalError::DuplicateIteration {
                    iteration: record.iteration,
                });
            }
        }
        Ok(Self { generated })
    }

    /// Summaries generated during `iteration`, if it was logged
    pub fn summaries_generated(&self, iteration: u64) -> Option<u64> {
        self.generated.get(&iteration).copied()
    }

    /// Highest logged iteration number
    pub fn max_iteration(&self) -> Option<u64> {
        self.generated.keys().next_back().copied()
    }

    /// Number of logged iterations
    pub fn len(&self) -> usize {
        self.generated.len()
    }

    /// Whether the log has no iterations
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    /// Logged records in iteration order
    pub fn records(&self) -> impl Iterator<Item = IterationRecord> + '_ {
        self.generated
            .iter()
            .map(|(&iteration, &summaries_generated)| IterationRecord {
                iteration,
                summaries_generated,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_records_in_iteration_order() {
        let json = r#"[
            {"iteration": 1, "summary_generated": 40},
            {"iteration": 0, "summary_generated": 100},
            {"iteration": 2, "summary_generated": 5}
        ]"#;
        let log = IterationLog::from_reader(json.as_bytes(), "inline").unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.max_iteration(), Some(2));
        assert_eq!(log.summaries_generated(0), Some(100));
        assert_eq!(log.summaries_generated(3), None);

        let iterations: Vec<u64> = log.records().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_iteration_is_rejected() {
        let json = r#"[
            {"iteration": 0, "summary_generated": 10},
            {"iteration": 0, "summary_generated": 8}
        ]"#;
        let err = IterationLog::from_reader(json.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, EvalError::DuplicateIteration { iteration: 0 }));
    }

    #[test]
    fn test_huge_iteration_is_rejected() {
        for iteration in ["18446744073709551615", "4000000000000"] {
            let json = format!(r#"[{{"iteration": {iteration}, "summary_generated": 1}}]"#);
            let err = IterationLog::from_reader(json.as_bytes(), "inline").unwrap_err();
            assert!(matches!(err, EvalError::Format { .. }));
            assert!(err.to_string().contains(iteration));
        }

        let json = format!(r#"[{{"iteration": {MAX_ITERATION}, "summary_generated": 1}}]"#);
        let log = IterationLog::from_reader(json.as_bytes(), "inline").unwrap();
        assert_eq!(log.max_iteration(), Some(MAX_ITERATION));
    }

    #[test]
    fn test_count_beyond_i64_is_rejected() {
        let json = r#"[{"iteration": 2, "summary_generated": 9223372036854775808}]"#;
        let err = IterationLog::from_reader(json.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, EvalError::Format { .. }));
        assert!(err.to_string().contains("iteration 2"));

        let json = r#"[{"iteration": 0, "summary_generated": 9223372036854775807}]"#;
        assert!(IterationLog::from_reader(json.as_bytes(), "inline").is_ok());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"[{"iteration": 0}]"#;
        let err = IterationLog::from_reader(json.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
        assert!(err.to_string().contains("summary_generated"));
    }

    #[test]
    fn test_extra_field_is_parse_error() {
        let json = r#"[{"iteration": 0, "summary_generated": 3, "elapsed": 1.5}]"#;
        let err = IterationLog::from_reader(json.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
    }

    #[test]
    fn test_negative_count_is_parse_error() {
        let json = r#"[{"iteration": 0, "summary_generated": -3}]"#;
        assert!(IterationLog::from_reader(json.as_bytes(), "inline").is_err());
    }

    #[test]
    fn test_from_path_reports_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = IterationLog::from_path(file.path()).unwrap_err();
        assert!(err
            .to_string()
            .contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_empty_array_is_empty_log() {
        let log = IterationLog::from_reader("[]".as_bytes(), "inline").unwrap();
        assert!(log.is_empty());
        assert_eq!(log.max_iteration(), None);
    }
}
