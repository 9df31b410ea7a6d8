//! Interactive decision source reading from a terminal

use gef_eval_core::{DecisionSource, EntityPrompt, EvalError, HumanDecision};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Asks a human on `writer` and reads answers from `reader`
///
/// Invalid answers are asked again. End of input declines a session and
/// stops a running one with skip & save.
pub struct TerminalDecisions<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalDecisions<R, W> {
    /// Create a decision source over `reader` and `writer`
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_answer(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn show_context(&mut self, prompt: &EntityPrompt<'_>) -> io::Result<()> {
        writeln!(self.writer, "----XSUM ID {}----", prompt.summary_id)?;
        writeln!(self.writer, "{}", prompt.document)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "GT summary: {}", prompt.reference)?;
        writeln!(self.writer, "----")?;
        writeln!(self.writer, "Generated summary: {}", prompt.summary)
    }

    fn ask_confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            writeln!(self.writer, "{question}")?;
            self.writer.flush()?;
            match self.read_answer()?.as_deref() {
                None => return Ok(false),
                Some("y") | Some("Y") | Some("yes") => return Ok(true),
                Some("n") | Some("N") | Some("no") => return Ok(false),
                Some(other) => writeln!(self.writer, "Please answer y or n, got '{other}'")?,
            }
        }
    }

    fn ask_decision(&mut self, prompt: &EntityPrompt<'_>) -> io::Result<HumanDecision> {
        if prompt.first_for_summary {
            self.show_context(prompt)?;
        }
        writeln!(
            self.writer,
            "What is the label of '{} (pos {}:{})'?",
            prompt.entity.ent, prompt.entity.start, prompt.entity.end
        )?;

        loop {
            writeln!(self.writer, "{}", HumanDecision::CHOICES)?;
            self.writer.flush()?;
            match self.read_answer()? {
                None => return Ok(HumanDecision::SkipAndSave),
                Some(answer) => match answer.parse::<HumanDecision>() {
                    Ok(decision) => return Ok(decision),
                    Err(_) => log::debug!("ignoring answer '{answer}'"),
                },
            }
        }
    }
}

fn terminal_error(source: io::Error) -> EvalError {
    EvalError::Io {
        path: PathBuf::from("<terminal>"),
        source,
    }
}

impl<R: BufRead, W: Write> DecisionSource for TerminalDecisions<R, W> {
    fn confirm(&mut self, question: &str) -> gef_eval_core::Result<bool> {
        self.ask_confirm(question).map_err(terminal_error)
    }

    fn decide(&mut self, prompt: &EntityPrompt<'_>) -> gef_eval_core::Result<HumanDecision> {
        self.ask_decision(prompt).map_err(terminal_error)
    }
}
