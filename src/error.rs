//! Error types and the context-attachment idiom used throughout the
//! pipeline. A generalization of the teacher's `io::open_options::context`
//! module without depending on its `zoe`-provided `ErrorWithContext`.

use std::fmt::{self, Display};
use std::path::Path;

/// The error kinds enumerated in SPEC_FULL.md §7. `AlignerFailed` and
/// `NoAlignments` are assembly-level (reported, pipeline continues);
/// `MalformedRecord` and `IoError` are record-level (dropped, logged);
/// `InvariantViolation` is fatal.
#[derive(Debug)]
pub enum AnalyzerError {
    /// External aligner invocation returned non-zero for one assembly.
    AlignerFailed { assembly: String, status: Option<i32> },
    /// The coords stream was empty, or its last line was malformed.
    NoAlignments { assembly: String },
    /// A single record failed to parse; never escapes the Loader.
    MalformedRecord { context: String, line: String },
    /// A programmer-error invariant was violated (e.g. `aligned_length >
    /// contig_length` after interval surgery).
    InvariantViolation(String),
    /// Wraps an I/O failure with file-path/operation context.
    Io { context: String, source: std::io::Error },
}

impl Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::AlignerFailed { assembly, status } => {
                write!(f, "aligner failed for assembly '{assembly}' (status: {status:?})")
            }
            AnalyzerError::NoAlignments { assembly } => {
                write!(f, "no alignments produced for assembly '{assembly}'")
            }
            AnalyzerError::MalformedRecord { context, line } => {
                write!(f, "{context}: malformed record: {line:?}")
            }
            AnalyzerError::InvariantViolation(msg) => write!(f, "invariant violated: {msg}"),
            AnalyzerError::Io { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzerError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl AnalyzerError {
    /// Is this error kind fatal to the whole process, or only to the one
    /// assembly/record it was raised for?
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalyzerError::InvariantViolation(_))
    }
}

/// Extension trait attaching human-readable context to `std::io::Error`,
/// mirroring the teacher's `WithErrorContext::with_context`/
/// `with_file_context`.
pub trait WithContext<T> {
    fn with_context(self, context: impl Display) -> Result<T, AnalyzerError>;
    fn with_file_context(self, context: impl Display, path: &Path) -> Result<T, AnalyzerError>;
}

impl<T> WithContext<T> for Result<T, std::io::Error> {
    fn with_context(self, context: impl Display) -> Result<T, AnalyzerError> {
        self.map_err(|source| AnalyzerError::Io {
            context: context.to_string(),
            source,
        })
    }

    fn with_file_context(self, context: impl Display, path: &Path) -> Result<T, AnalyzerError> {
        self.map_err(|source| AnalyzerError::Io {
            context: format!("{context} ({})", path.display()),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn with_context_wraps_io_error() {
        let io_err: Result<(), Error> = Err(Error::new(ErrorKind::NotFound, "missing"));
        let wrapped = io_err.with_context("loading coords");
        assert!(wrapped.is_err());
        assert!(matches!(wrapped.unwrap_err(), AnalyzerError::Io { .. }));
    }

    #[test]
    fn invariant_violation_is_fatal() {
        let e = AnalyzerError::InvariantViolation("aligned_length > contig_length".into());
        assert!(e.is_fatal());
        let e = AnalyzerError::NoAlignments { assembly: "a1".into() };
        assert!(!e.is_fatal());
    }
}
