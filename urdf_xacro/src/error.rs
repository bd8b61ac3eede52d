//! Error types
//!
//! Every variant here is fatal for a run. Soft mismatches (an override naming
//! a joint that does not exist, a link without meshes) are not errors; they
//! are collected in the per-step reports and logged as warnings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XacroError {
    /// The document is not well-formed XML
    #[error("Failed to parse '{source_name}': {reason}")]
    MalformedDocument { source_name: String, reason: String },

    /// The root element has no `name` attribute
    #[error("Robot name not found in '{source_name}'")]
    MissingRobotName { source_name: String },

    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Updaters were requested without a configuration file
    #[error("No configuration file given for: {}", updaters.join(", "))]
    MissingConfig { updaters: Vec<String> },

    #[error("Failed to parse configuration '{}': {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Unsupported configuration format: {}", path.display())]
    UnsupportedConfigFormat { path: PathBuf },

    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    /// The external formatter exited unsuccessfully. The document itself
    /// was already written.
    #[error("Formatter '{program}' failed ({status}): {stderr}")]
    FormatterFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl XacroError {
    /// Short, actionable advice shown under the error message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            XacroError::MalformedDocument { .. } => {
                Some("Check the XML syntax, e.g. with: xmllint --noout robot.urdf")
            }
            XacroError::MissingRobotName { .. } => {
                Some("Add a name to the root element: <robot name=\"my_robot\">")
            }
            XacroError::ConfigNotFound { .. } => {
                Some("Check that the configuration path is correct and the file exists")
            }
            XacroError::MissingConfig { .. } => {
                Some("Pass a configuration file with -c/--config")
            }
            XacroError::UnsupportedConfigFormat { .. } => {
                Some("Supported configuration formats: .yaml, .yml, .json, .toml")
            }
            XacroError::FormatterFailed { .. } => Some(
                "The output file was written; only formatting failed. \
                 Install xmllint (libxml2-utils) or rerun without --format",
            ),
            XacroError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Some("Check that the file path is correct and the file exists")
            }
            XacroError::Io { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                Some("Check file permissions")
            }
            _ => None,
        }
    }

    /// Document and configuration errors abort before anything is mutated
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            XacroError::MalformedDocument { .. }
                | XacroError::MissingRobotName { .. }
                | XacroError::ConfigNotFound { .. }
                | XacroError::MissingConfig { .. }
                | XacroError::ConfigParse { .. }
                | XacroError::UnsupportedConfigFormat { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, XacroError>;
