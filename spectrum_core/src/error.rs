//! Error types for spectrum computation, encoding and reconstruction.
//!
//! Every fallible operation in the crate returns [`SpectrumResult`]. Variants
//! carry the operation name and the offending key or path so the caller can
//! report a useful diagnostic without extra bookkeeping.

use std::fmt;
use std::io;

/// Result type alias for spectrum operations
pub type SpectrumResult<T> = Result<T, SpectrumError>;

/// Error type for transform, codec, pipeline and storage operations
#[derive(Debug)]
pub enum SpectrumError {
    /// Image missing, unreadable, empty, or not convertible to grayscale
    InvalidInput { context: String, reason: String },

    /// Two grids that must agree in shape do not
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
        context: String,
    },

    /// Magnitude bounds absent, unparsable, or inconsistent with the image
    MissingMetadata { key: String, reason: String },

    /// Persistence layer failed to fetch or store an object
    Storage {
        operation: &'static str,
        key: String,
        source: io::Error,
    },
}

impl fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumError::InvalidInput { context, reason } => {
                write!(f, "Invalid input for {}: {}", context, reason)
            }
            SpectrumError::DimensionMismatch {
                expected,
                got,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch in {}: expected {}x{}, got {}x{}",
                    context, expected.0, expected.1, got.0, got.1
                )
            }
            SpectrumError::MissingMetadata { key, reason } => {
                write!(
                    f,
                    "Magnitude metadata for '{}' unusable: {}. Reconstruction needs the mag_min/mag_max recorded at encode time.",
                    key, reason
                )
            }
            SpectrumError::Storage {
                operation,
                key,
                source,
            } => {
                write!(f, "Storage {} failed for '{}': {}", operation, key, source)
            }
        }
    }
}

impl std::error::Error for SpectrumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpectrumError::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SpectrumError {
    /// Create an invalid input error
    pub fn invalid_input(context: impl Into<String>, reason: impl Into<String>) -> Self {
        SpectrumError::InvalidInput {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        expected: (usize, usize),
        got: (usize, usize),
        context: impl Into<String>,
    ) -> Self {
        SpectrumError::DimensionMismatch {
            expected,
            got,
            context: context.into(),
        }
    }

    /// Create a missing metadata error
    pub fn missing_metadata(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SpectrumError::MissingMetadata {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a storage error wrapping the underlying I/O failure
    pub fn storage(operation: &'static str, key: impl Into<String>, source: io::Error) -> Self {
        SpectrumError::Storage {
            operation,
            key: key.into(),
            source,
        }
    }

    /// True for errors caused by absent or tampered magnitude bounds.
    pub fn is_missing_metadata(&self) -> bool {
        matches!(self, SpectrumError::MissingMetadata { .. })
    }
}
