//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Page range the user supplied could not be parsed
    #[error("Malformed page range {input:?}: expected a frame number or 'first-last'")]
    MalformedRange {
        /// The offending range token.
        input: String,
    },

    /// Source document is absent
    #[error("Missing input file: {path:?}")]
    MissingInput {
        /// Path that was expected to exist.
        path: std::path::PathBuf,
    },

    /// Theme token present but not one of the supported themes
    #[error("Unrecognized theme {found:?}: expected one of {expected}")]
    UnrecognizedTheme {
        /// The theme name found in the document.
        found: String,
        /// Comma-separated list of accepted theme names.
        expected: &'static str,
    },

    /// A frame delimiter without a partner
    #[error("Unmatched {marker} at line {line}: frames may not nest or dangle")]
    UnmatchedMarker {
        /// The offending marker token.
        marker: &'static str,
        /// 1-based line number of the marker.
        line: usize,
    },

    /// A declared template placeholder survived substitution
    #[error("Unresolved placeholder {token} in template {template:?}")]
    UnresolvedPlaceholder {
        /// The placeholder token that was left in the output.
        token: String,
        /// Template file the token came from.
        template: String,
    },

    /// External compiler exceeded the wall-clock budget
    #[error("Compiler timed out after {seconds}s")]
    CompilerTimeout {
        /// The enforced timeout in seconds.
        seconds: u64,
    },

    /// External compiler failed or produced no artifact
    #[error("Compiler failed (status {status:?})\n--- LOG ---\n{log_tail}")]
    CompilerFailure {
        /// Process exit status, if the process ran to completion.
        status: Option<i32>,
        /// Tail of the compiler diagnostics.
        log_tail: String,
    },

    /// Catalog lookup error with guidance
    #[error("Catalog error: {message}. {hint}")]
    Catalog {
        /// Description of the lookup problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// File parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a malformed-range error
    pub fn malformed_range(input: impl Into<String>) -> Self {
        Self::MalformedRange { input: input.into() }
    }

    /// Create a catalog error with actionable hint
    pub fn catalog(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Catalog { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn malformed_range_mentions_the_token() {
        let err = Error::malformed_range("3-x");
        assert!(err.to_string().contains("3-x"));
    }

    #[test]
    fn catalog_error_carries_hint() {
        let err = Error::catalog("subject 999 not found", "Check dirinfo.yaml");
        match err {
            Error::Catalog { hint, .. } => assert!(hint.contains("dirinfo")),
            _ => panic!("Expected Catalog error"),
        }
    }
}
