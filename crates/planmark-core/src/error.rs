//! Error handling for PlanMark
//!
//! Provides error types for the two places the engine can actually fail:
//! - Geometry errors (persisted geometry that cannot form a valid shape)
//! - Decode errors (malformed annotation rows at the persistence boundary)
//!
//! Discarded gestures and missing calibration are expected behavior, not
//! errors, and never surface through these types. All error types use
//! `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry validation error type
///
/// Raised when persisted geometry cannot form a valid shape for its kind.
#[derive(Error, Debug, Clone)]
pub enum GeometryError {
    /// Too few points for the shape kind
    #[error("{kind} requires at least {required} points, got {actual}")]
    TooFewPoints {
        /// The annotation kind being decoded.
        kind: String,
        /// The minimum point count for the kind.
        required: usize,
        /// The point count actually present.
        actual: usize,
    },

    /// A field the kind requires is absent
    #[error("{kind} annotation is missing required field '{field}'")]
    MissingField {
        /// The annotation kind being decoded.
        kind: String,
        /// The name of the missing field.
        field: String,
    },
}

/// Persistence-boundary decode error type
///
/// Raised when an annotation row returned by the backend cannot be
/// normalized into the internal model. A row failing to decode is skipped
/// with a warning; it never takes down the drawing surface.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The row's kind discriminant is not a known annotation kind
    #[error("Unknown annotation kind: {kind}")]
    UnknownKind {
        /// The unrecognized kind string.
        kind: String,
    },

    /// The serialized path payload could not be parsed
    #[error("Malformed path payload: {reason}")]
    MalformedPath {
        /// The reason the payload failed to parse.
        reason: String,
    },

    /// The row's JSON could not be deserialized
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The row decoded but its geometry is invalid for the kind
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Main error type for PlanMark
///
/// A unified error type that can represent any error from the engine.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistence-boundary decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Geometry validation error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a decode error
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_) | Error::Decode(DecodeError::Geometry(_)))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
