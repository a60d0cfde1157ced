//! Error types for vertsnap.
//!
//! This module defines all error types used throughout the library. Conditions
//! the snap command treats as silent no-ops (a missing reference object, an
//! empty selection) are not errors; see [`crate::algo::snap::SkipReason`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`SnapError`].
pub type Result<T> = std::result::Result<T, SnapError>;

/// Errors that can occur while building meshes, talking to a host or doing I/O.
#[derive(Error, Debug)]
pub enum SnapError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face uses the same vertex more than once.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A face has fewer than three vertices.
    #[error("face {face} has {count} vertices, at least 3 are required")]
    FaceTooSmall {
        /// The face index.
        face: usize,
        /// Number of vertices the face was given.
        count: usize,
    },

    /// The same directed edge is used by two faces.
    #[error("edge ({v0}, {v1}) is used twice in the same direction")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The host has no object with this name.
    #[error("unknown object: {0}")]
    UnknownObject(String),

    /// A shape handle does not resolve to a mesh.
    #[error("unknown shape: {0}")]
    UnknownShape(String),

    /// A vertex index is out of range for its shape.
    #[error("shape {shape} has no vertex {index}")]
    UnknownVertex {
        /// Name of the shape.
        shape: String,
        /// The requested vertex index.
        index: usize,
    },

    /// A named host capability could not be loaded.
    #[error("capability '{0}' is not available")]
    CapabilityUnavailable(String),

    /// A query handle was used after it was destroyed.
    #[error("nearest point query {0} does not exist")]
    UnknownQuery(usize),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl SnapError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        SnapError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SnapError::InvalidVertexIndex { face: 3, vertex: 17 };
        assert_eq!(err.to_string(), "face 3 references invalid vertex index 17");

        let err = SnapError::CapabilityUnavailable("nearestPointOnMesh".to_string());
        assert_eq!(err.to_string(), "capability 'nearestPointOnMesh' is not available");
    }

    #[test]
    fn test_invalid_param() {
        let err = SnapError::invalid_param("tolerance", f64::NAN, "must be a number");
        assert!(matches!(
            err,
            SnapError::InvalidParameter { name: "tolerance", .. }
        ));
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SnapError = io.into();
        assert!(matches!(err, SnapError::Io(_)));
    }
}
