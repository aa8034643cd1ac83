//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while loading the catalog or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Registry not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed registry {}: {message}", .path.display())]
    MalformedCatalog { path: PathBuf, message: String },

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Template file not found: {}", .0.display())]
    TemplateFileMissing(PathBuf),

    #[error("Missing required variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("{0}")]
    RenderFailure(String),
}

/// Fieldless discriminant of [`TemplateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MalformedCatalog,
    TemplateNotFound,
    TemplateFileMissing,
    MissingVariables,
    RenderFailure,
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::NotFound(_) => ErrorKind::NotFound,
            TemplateError::MalformedCatalog { .. } => ErrorKind::MalformedCatalog,
            TemplateError::TemplateNotFound(_) => ErrorKind::TemplateNotFound,
            TemplateError::TemplateFileMissing(_) => ErrorKind::TemplateFileMissing,
            TemplateError::MissingVariables(_) => ErrorKind::MissingVariables,
            TemplateError::RenderFailure(_) => ErrorKind::RenderFailure,
        }
    }

    /// Whether the error only affects one operation rather than the whole catalog.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::MalformedCatalog
        )
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TemplateError::MalformedCatalog {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn render(cause: impl ToString) -> Self {
        TemplateError::RenderFailure(cause.to_string())
    }
}
