//! Core error types for the document analysis pipeline.
//!
//! This module defines the central `DocLensError` enum used throughout the
//! crate. Input and service failures abort the current pipeline run;
//! geometry failures are recovered per-record by the field flattener.

use thiserror::Error;

/// Errors that can occur while analyzing and rendering a document.
#[derive(Debug, Error)]
pub enum DocLensError {
    /// The upload contained no bytes.
    #[error("empty upload")]
    EmptyInput,

    /// The upload's file extension is not one of the supported types.
    #[error("unsupported file type: {extension:?}")]
    UnsupportedInput {
        /// The lowercased extension of the rejected file (may be empty).
        extension: String,
    },

    /// The uploaded bytes could not be decoded as an image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// An annotated page could not be encoded for output.
    #[error("image encode")]
    ImageEncode(#[source] image::ImageError),

    /// The uploaded document could not be opened or rasterized.
    #[error("unreadable document: {context}")]
    CorruptInput {
        /// What the rasterizer reported about the bytes.
        context: String,
    },

    /// A bounding region carried a malformed flat coordinate list.
    ///
    /// A polygon needs an even number of coordinates and at least three
    /// vertices (six numbers). Offending regions are dropped by the
    /// flattener; this error never aborts a pipeline run.
    #[error("invalid polygon: expected an even coordinate count of at least 6, got {coordinate_count}")]
    InvalidGeometry {
        /// The length of the rejected coordinate list.
        coordinate_count: usize,
    },

    /// The requested model selector is not one of the supported models.
    #[error("unknown analysis model: {0:?}")]
    UnknownModel(String),

    /// Transport-level failure while talking to the analysis service.
    #[error("{context}")]
    Service {
        /// What the client was doing when the transport failed.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The analysis service reported a failure for the submitted document.
    #[error("analysis failed ({status}): {message}")]
    Analysis {
        /// The HTTP or operation status reported by the service.
        status: String,
        /// The service's error message, verbatim.
        message: String,
    },

    /// The analysis did not complete within the configured polling budget.
    #[error("analysis timed out after {polls} status checks")]
    Timeout {
        /// How many times the operation status was checked.
        polls: usize,
    },

    /// The service answered with a response the client could not interpret.
    #[error("malformed service response: {context}")]
    MalformedResponse {
        /// What was missing or unparseable.
        context: String,
    },
}

impl DocLensError {
    /// Creates a transport-level service error with context.
    pub fn service(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DocLensError::Service {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Whether retrying the same upload could plausibly succeed.
    ///
    /// Transport failures and polling timeouts are transient; input,
    /// geometry, and service-reported analysis failures are not. The
    /// pipeline itself never retries; callers decide.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocLensError::Service { .. } | DocLensError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        let err = DocLensError::service("poll failed", "connection reset".to_string());
        assert!(err.is_retryable());
        assert!(DocLensError::Timeout { polls: 60 }.is_retryable());
    }

    #[test]
    fn input_and_analysis_failures_are_fatal() {
        assert!(!DocLensError::EmptyInput.is_retryable());
        assert!(!DocLensError::InvalidGeometry {
            coordinate_count: 5
        }
        .is_retryable());
        assert!(!DocLensError::Analysis {
            status: "401 Unauthorized".to_string(),
            message: "invalid key".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn error_messages_carry_context() {
        let err = DocLensError::UnknownModel("prebuilt-passport".to_string());
        assert!(err.to_string().contains("prebuilt-passport"));

        let err = DocLensError::InvalidGeometry {
            coordinate_count: 7,
        };
        assert!(err.to_string().contains('7'));
    }
}
