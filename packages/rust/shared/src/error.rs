//! Error types for cyclusgen.
//!
//! Library crates use [`CyclusGenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all cyclusgen operations.
#[derive(Debug, thiserror::Error)]
pub enum CyclusGenError {
    /// Malformed date or numeric field in the fleet table.
    #[error("format error in {field}: {message}")]
    Format { field: String, message: String },

    /// Configuration error: bad config file, unknown country, unwritable output.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV reader error (bad quoting, unreadable record).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Template loading or rendering error.
    #[error("template error: {message}")]
    Template { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CyclusGenError>;

impl CyclusGenError {
    /// Create a format error naming the offending field.
    pub fn format(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a template error from any displayable message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Prefix the field of a [`CyclusGenError::Format`] with a row location.
    ///
    /// Other variants pass through unchanged.
    pub fn at_row(self, row: usize) -> Self {
        match self {
            Self::Format { field, message } => Self::Format {
                field: format!("row {row}, {field}"),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CyclusGenError::config("country 'Atlantis' not present in source");
        assert_eq!(
            err.to_string(),
            "configuration error: country 'Atlantis' not present in source"
        );

        let err = CyclusGenError::format("commercial", "unrecognized date '13/45/2001'");
        assert!(err.to_string().contains("format error in commercial"));
    }

    #[test]
    fn at_row_prefixes_format_field() {
        let err = CyclusGenError::format("net_capacity", "not a number: 'abc'").at_row(7);
        assert_eq!(
            err.to_string(),
            "format error in row 7, net_capacity: not a number: 'abc'"
        );

        let err = CyclusGenError::template("missing").at_row(3);
        assert_eq!(err.to_string(), "template error: missing");
    }
}
