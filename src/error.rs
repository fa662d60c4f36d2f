//! Error types for halfmesh.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
///
/// Note that a triangle rejected because one of its directed edges already
/// exists is *not* an error: [`TriangleAdder::add`](crate::mesh::TriangleAdder::add)
/// reports it as `Ok(None)` so bulk loaders can skip the face and continue.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The three vertices of a triangle are collinear or coincident.
    #[error("degenerate triangle: vertices are collinear or coincident")]
    DegenerateTriangle,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A handle refers to a slot that is not live: released, or never allocated.
    #[error("stale {kind} handle")]
    StaleHandle {
        /// Which kind of entity the handle addressed.
        kind: &'static str,
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

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

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

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for a file path.
    pub(crate) fn load<P: Into<PathBuf>, M: std::fmt::Display>(path: P, message: M) -> Self {
        MeshError::LoadError {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
