//! Delivering a validation result.

use std::io::{self, Write};

use crate::format::{self, OutputFormat};
use crate::model::ValidationResult;

/// Receives the outcome of a validation run
pub trait ResultSink {
    fn receive(&mut self, result: &ValidationResult) -> io::Result<()>;
}

/// Renders results as JSON or markdown to a writer
pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn receive(&mut self, result: &ValidationResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, result)?;
                writeln!(self.out)?;
            }
            OutputFormat::Markdown => write!(self.out, "{}", format::validation(result))?,
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn render(format: OutputFormat, result: &ValidationResult) -> String {
        let mut sink = ConsoleSink::new(Vec::new(), format);
        sink.receive(result).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn json_output() {
        let out = render(
            OutputFormat::Json,
            &ValidationResult::Invalid {
                kind: FailureKind::Coverage,
                reasons: vec!["create".into()],
            },
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "invalid");
        assert_eq!(value["kind"], "coverage");
        assert_eq!(value["reasons"][0], "create");
    }

    #[test]
    fn markdown_output() {
        let out = render(OutputFormat::Markdown, &ValidationResult::Valid);
        assert_eq!(out, "API Blueprint documents every HTTP function.\n");
    }
}
