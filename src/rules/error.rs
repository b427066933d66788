use std::fmt;

use super::matcher::MatchConflict;

/// Error types for rule import generation
#[derive(Debug)]
pub enum RuleImportError {
    /// An input file does not have the expected shape
    InputFormat {
        source: String,
        row: Option<usize>,
        message: String,
    },

    /// Records that could not be paired one-to-one with live rules
    Conflicts(Vec<MatchConflict>),

    /// Template registration or rendering failed
    Render(String),
}

impl RuleImportError {
    /// Input format error for a whole document
    pub fn input(source: impl Into<String>, message: impl Into<String>) -> Self {
        RuleImportError::InputFormat {
            source: source.into(),
            row: None,
            message: message.into(),
        }
    }

    /// Input format error for a single row
    pub fn input_row(source: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        RuleImportError::InputFormat {
            source: source.into(),
            row: Some(row),
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleImportError::InputFormat {
                source,
                row,
                message,
            } => {
                write!(f, "Invalid input in {}", source)?;

                if let Some(row) = row {
                    write!(f, " (row {})", row)?;
                }

                write!(f, ": {}", message)
            }
            RuleImportError::Conflicts(conflicts) => {
                write!(
                    f,
                    "{} rule(s) could not be matched one-to-one with live rules",
                    conflicts.len()
                )
            }
            RuleImportError::Render(msg) => {
                write!(f, "Failed to render configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for RuleImportError {}

impl From<handlebars::RenderError> for RuleImportError {
    fn from(err: handlebars::RenderError) -> Self {
        RuleImportError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for RuleImportError {
    fn from(err: handlebars::TemplateError) -> Self {
        RuleImportError::Render(err.to_string())
    }
}

/// Result type for rule import operations
pub type RuleImportResult<T> = Result<T, RuleImportError>;
