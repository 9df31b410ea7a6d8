//! JSON output formatter

use super::{ConvergenceReport, EvaluationReport, ReportFormatter};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// JSON formatter - collects everything into one document written on finish
pub struct JsonFormatter<W: Write> {
    writer: W,
    document: JsonDocument,
}

#[derive(Debug, Default, Serialize)]
struct JsonDocument {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    convergence: Vec<ConvergenceReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    evaluations: Vec<serde_json::Value>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            document: JsonDocument::default(),
        }
    }
}

impl<W: Write + Send + Sync> ReportFormatter for JsonFormatter<W> {
    fn write_convergence(&mut self, report: &ConvergenceReport) -> Result<()> {
        self.document.convergence.push(report.clone());
        Ok(())
    }

    fn write_evaluation(&mut self, report: &EvaluationReport<'_>) -> Result<()> {
        self.document.evaluations.push(serde_json::to_value(report)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.document)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
