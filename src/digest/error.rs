// Error taxonomy for digest computation and comparison
// Every variant renders a distinct message so callers never collapse failures into one

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a user-supplied comparison input was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputProblem {
    /// Nothing was typed or pasted
    MissingValue,
    /// Fixed-algorithm mode only: the value has the wrong number of characters
    WrongLength { expected: usize, actual: usize },
    /// Selectable mode with no algorithm chosen
    NoAlgorithm,
}

impl std::fmt::Display for InputProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputProblem::MissingValue => write!(f, "missing comparison value"),
            InputProblem::WrongLength { expected, actual } => {
                write!(f, "wrong length (expected {} characters, got {})", expected, actual)
            }
            InputProblem::NoAlgorithm => write!(f, "no algorithm selected"),
        }
    }
}

/// Main error type for digest operations
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("File not found: {}\nSuggestion: Check that the path exists and refers to a regular file", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error while {operation} {}: {source}\nSuggestion: Check file permissions and that the file is not being modified", path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported hash algorithm: {algorithm}\nSuggestion: Run `hashcheck algorithms` to see available algorithms")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Invalid input: {0}")]
    InvalidInput(InputProblem),

    #[error("Cancelled: no file was selected")]
    Aborted,
}

impl DigestError {
    /// Classify an I/O failure on `path`: a missing file becomes `FileNotFound`,
    /// anything else (permission denied, device errors, truncation) stays `Io`.
    pub fn from_io_error(err: io::Error, operation: &'static str, path: PathBuf) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DigestError::FileNotFound { path },
            _ => DigestError::Io {
                path,
                operation,
                source: err,
            },
        }
    }

    /// Short label used by the status bar and log lines
    pub fn kind_label(&self) -> &'static str {
        match self {
            DigestError::FileNotFound { .. } => "not found",
            DigestError::Io { .. } => "I/O error",
            DigestError::UnsupportedAlgorithm { .. } => "unsupported algorithm",
            DigestError::InvalidInput(_) => "invalid input",
            DigestError::Aborted => "cancelled",
        }
    }

    /// First line of the message, without the suggestion
    pub fn headline(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_string()
    }
}
