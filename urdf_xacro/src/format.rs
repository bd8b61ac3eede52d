//! External pretty-printer invocation
//!
//! The serializer already indents its output; the external formatter is an
//! optional extra pass (and doubles as a validator, since `xmllint` refuses
//! malformed input).

use crate::error::{Result, XacroError};
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Placeholder replaced by the output file path in formatter arguments
pub const FILE_PLACEHOLDER: &str = "{file}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
}

impl ExternalFormatter {
    /// Formatter with custom arguments; `{file}` expands to the target path
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `xmllint --format FILE -o FILE`
    pub fn xmllint() -> Self {
        Self::new(
            "xmllint",
            ["--format", FILE_PLACEHOLDER, "-o", FILE_PLACEHOLDER],
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Format `path` in place
    pub fn run(&self, path: &Path) -> Result<()> {
        let file = path.display().to_string();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &file))
            .collect();

        info!("Formatting {} with {}", file, self.program);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| XacroError::FormatterFailed {
                program: self.program.clone(),
                status: "failed to start".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(XacroError::FormatterFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ExternalFormatter {
    fn default() -> Self {
        Self::xmllint()
    }
}
