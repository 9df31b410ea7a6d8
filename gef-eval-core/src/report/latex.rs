//! LaTeX macro reports
//!
//! Each `(model, metric)` pair becomes one line
//! `\newcommand{\<Model><Metric>}{<value>}`, with the value scaled to a
//! percentage and printed with two decimals.

use crate::error::{EvalError, Result};
use crate::factuality::AggregateMetrics;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Metric values per model, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeMap<String, f64>>")]
pub struct MetricTable {
    rows: Vec<(String, Vec<(String, f64)>)>,
}

impl MetricTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the factuality metrics of one model
    pub fn from_metrics(model: &str, metrics: &AggregateMetrics) -> Self {
        let mut table = Self::new();
        for (metric, value) in metrics.latex_metrics() {
            table.push(model, metric, value);
        }
        table
    }

    /// Add a value; a repeated `(model, metric)` pair is added again
    pub fn push(&mut self, model: &str, metric: &str, value: f64) {
        let index = match self.rows.iter().position(|(m, _)| m == model) {
            Some(i) => i,
            None => {
                self.rows.push((model.to_string(), Vec::new()));
                self.rows.len() - 1
            }
        };
        self.rows[index].1.push((metric.to_string(), value));
    }

    /// `(model, metric, value)` triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.rows.iter().flat_map(|(model, metrics)| {
            metrics
                .iter()
                .map(move |(metric, value)| (model.as_str(), metric.as_str(), *value))
        })
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.rows.iter().map(|(_, metrics)| metrics.len()).sum()
    }

    /// Whether the table holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<BTreeMap<String, BTreeMap<String, f64>>> for MetricTable {
    fn from(map: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        let mut table = Self::new();
        for (model, metrics) in &map {
            for (metric, value) in metrics {
                table.push(model, metric, *value);
            }
        }
        table
    }
}

fn check_macro_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EvalError::InvalidMacroName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Render every value of `table` as a LaTeX macro definition
pub fn render_latex(table: &MetricTable) -> Result<String> {
    let mut out = String::new();
    for (model, metric, value) in table.iter() {
        check_macro_name(model)?;
        check_macro_name(metric)?;
        let line = format!("\\newcommand{{\\{model}{metric}}}{{{:.2}}}\n", value * 100.0);
        out.push_str(&line.replace('%', "\\%"));
    }
    Ok(out)
}

/// Render `table` and write it to `path`
pub fn write_latex_file<P: AsRef<Path>>(path: P, table: &MetricTable) -> Result<()> {
    let path = path.as_ref();
    let rendered = render_latex(table)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
    }
    fs::write(path, rendered).map_err(|e| EvalError::io(path, e))?;
    tracing::info!("wrote {} LaTeX macros to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_in_insertion_order() {
        let mut table = MetricTable::new();
        table.push("Pegasus", "RougeOne", 0.4712);
        table.push("Bart", "RougeOne", 0.45);
        table.push("Pegasus", "RougeTwo", 0.2391);

        let rendered = render_latex(&table).unwrap();
        assert_eq!(
            rendered,
            "\\newcommand{\\PegasusRougeOne}{47.12}\n\
             \\newcommand{\\PegasusRougeTwo}{23.91}\n\
             \\newcommand{\\BartRougeOne}{45.00}\n"
        );
    }

    #[test]
    fn test_rejects_non_letter_names() {
        for (model, metric) in [("Bart2", "Factual"), ("Bart", "Rouge-L"), ("", "Factual")] {
            let mut table = MetricTable::new();
            table.push(model, metric, 0.5);
            assert!(matches!(
                render_latex(&table),
                Err(EvalError::InvalidMacroName { .. })
            ));
        }
    }

    #[test]
    fn test_deserializes_sorted() {
        let table: MetricTable =
            serde_json::from_str(r#"{"Pegasus": {"RougeL": 0.3}, "Bart": {"RougeL": 0.1}}"#)
                .unwrap();
        let models: Vec<&str> = table.iter().map(|(m, _, _)| m).collect();
        assert_eq!(models, vec!["Bart", "Pegasus"]);
    }

    #[test]
    fn test_write_file_creates_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("latex").join("factuality.tex");
        let mut table = MetricTable::new();
        table.push("Oracle", "Factual", 0.65);

        write_latex_file(&path, &table).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\\newcommand{\\OracleFactual}{65.00}\n"
        );
    }
}
