//! Error types for hardware probe operations.
//!
//! This module defines the error type shared by every backend and by the
//! portable kernels. Queries that the host cannot answer surface as
//! [`ProbeError::UnsupportedFeature`] rather than as fabricated values.

use thiserror::Error;

/// Errors that can occur while probing the processor.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Hardware query not available on this host.
    ///
    /// Returned when the executing architecture (or the selected backend)
    /// has no way to answer the request, e.g. a cycle counter read on a
    /// target without one.
    #[error("Unsupported feature: {feature} is not available on {arch}")]
    UnsupportedFeature {
        /// Name of the requested query or instruction
        feature: String,
        /// Architecture or backend that rejected it
        arch: String,
    },

    /// The operating system refused access to a resource.
    ///
    /// Model-specific registers are exposed through device files that
    /// usually require elevated privileges.
    #[error("Permission denied: {resource}")]
    PermissionDenied {
        /// The resource that could not be opened
        resource: String,
    },

    /// Invalid argument passed to a probe operation.
    #[error("Invalid argument {parameter}={value}: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: String,
        /// Value that was rejected
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Length mismatch between kernel inputs.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Other I/O failure while talking to the operating system.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What the probe was doing
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Create an UnsupportedFeature error.
    pub fn unsupported<S1, S2>(feature: S1, arch: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::UnsupportedFeature {
            feature: feature.into(),
            arch: arch.into(),
        }
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied<S: Into<String>>(resource: S) -> Self {
        Self::PermissionDenied {
            resource: resource.into(),
        }
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument<S1, S2, S3>(parameter: S1, value: S2, reason: S3) -> Self
    where
        S1: Into<String>,
        S2: std::fmt::Display,
        S3: Into<String>,
    {
        Self::InvalidArgument {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Wrap an I/O error, mapping `PermissionDenied` to its own variant.
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        let context = context.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied { resource: context };
        }
        Self::Io { context, source }
    }

    /// Whether this error means the host simply lacks the capability.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFeature { .. })
    }
}

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
