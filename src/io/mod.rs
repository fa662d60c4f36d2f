//! Mesh file I/O.
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | PLY | `.ply` | ✓ | ✓ | Binary little-endian and ASCII |
//!
//! ```no_run
//! use halfmesh::io::{load, save};
//!
//! let mesh = load("model.ply").unwrap();
//! save(&mesh, "copy.ply").unwrap();
//! ```

pub mod ply;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::TriMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh, choosing the format by file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh, choosing the format by file extension.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::save(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("mesh.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("mesh.stl"), None);
        assert_eq!(Format::from_path("mesh"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("model.obj").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "obj"));
        let err = save(&TriMesh::new(), "model").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "(none)"));
    }
}
