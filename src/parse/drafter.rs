//! Parsing through the external `drafter` command.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{refract, reject_error_annotations, DocumentParser};
use crate::error::ValidationError;
use crate::tree::ContentNode;

/// Runs `drafter`, feeding the document on stdin and reading API Elements
/// JSON from stdout.
pub struct DrafterParser {
    program: String,
    args: Vec<String>,
}

impl DrafterParser {
    pub fn new(program: &str) -> Self {
        Self::with_args(program, ["--format", "json"])
    }

    pub fn with_args<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    async fn run(&self, source: &str) -> Result<std::process::Output, ValidationError> {
        tracing::debug!(program = %self.program, args = ?self.args, "spawning parser");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ValidationError::Parse(format!("failed to run {}: {e}", self.program)))?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_owned();
            tokio::spawn(async move {
                // The child may exit without reading everything; its output decides.
                let _ = stdin.write_all(input.as_bytes()).await;
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ValidationError::Parse(format!("failed to run {}: {e}", self.program)))?;

        if let Some(writer) = writer {
            let _ = writer.await;
        }

        tracing::debug!(status = %output.status, stdout_bytes = output.stdout.len(), "parser finished");
        Ok(output)
    }
}

#[async_trait]
impl DocumentParser for DrafterParser {
    fn name(&self) -> &str {
        "drafter"
    }

    async fn parse(&self, source: &str) -> Result<ContentNode, ValidationError> {
        let output = self.run(source).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // drafter exits non-zero on errors but still prints the parse result
        // carrying the error annotation; prefer that over stderr.
        if !stdout.trim().is_empty() {
            if let Ok(tree) = refract::parse_refract(&stdout) {
                return reject_error_annotations(tree);
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(ValidationError::Parse(message));
        }

        refract::parse_refract(&stdout).and_then(reject_error_annotations)
    }
}
