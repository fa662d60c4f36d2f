//! PLY (Stanford polygon) format support.
//!
//! Reading goes through `ply-rs` and accepts binary or ASCII files. Any
//! numeric `x`/`y`/`z` vertex properties are used, and faces may name their
//! index list `vertex_index` or `vertex_indices`. Polygons are fan-triangulated.
//!
//! Writing produces a fixed layout with eight float properties per vertex
//! (`x y z nx ny nz u v`, the last five always zero) and a
//! `list uchar int vertex_index` per face.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, TriMesh};

const COMMENT: &str = "comment Written by halfmesh";

/// Encoding of a written PLY file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyEncoding {
    /// Human-readable text.
    Ascii,
    /// Little-endian binary, the default.
    #[default]
    BinaryLittleEndian,
}

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use halfmesh::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// println!("{} triangles", mesh.num_triangles());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    parse(&mut reader, path)
}

/// Read a mesh from any buffered PLY source.
pub fn read<R: BufRead>(mut reader: R) -> Result<TriMesh> {
    parse(&mut reader, Path::new("<stream>"))
}

/// Vertex and face counts from the header of a PLY file, without reading the body.
pub fn read_counts<P: AsRef<Path>>(path: P) -> Result<(usize, usize)> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let header = Parser::<DefaultElement>::new()
        .read_header(&mut reader)
        .map_err(|e| MeshError::load(path, e))?;

    let count = |name: &str| {
        header
            .elements
            .get(name)
            .map(|element| element.count)
            .ok_or_else(|| MeshError::load(path, format!("could not find the '{name}' element")))
    };
    Ok((count("vertex")?, count("face")?))
}

fn parse<R: BufRead>(reader: &mut R, path: &Path) -> Result<TriMesh> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(reader)
        .map_err(|e| MeshError::load(path, e))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshError::load(path, "could not find the 'vertex' element"))?;
    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| MeshError::load(path, "could not find the 'face' element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for (i, vertex) in vertex_element.iter().enumerate() {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| MeshError::load(path, format!("vertex {i} has no numeric '{name}'")))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(face_element.len());
    for (i, face) in face_element.iter().enumerate() {
        let indices = get_list_property(face, "vertex_index")
            .or_else(|| get_list_property(face, "vertex_indices"))
            .ok_or_else(|| MeshError::load(path, format!("face {i} has no vertex index list")))?;

        // Fan triangulation; lists shorter than 3 yield nothing
        for k in 1..indices.len().saturating_sub(1) {
            faces.push([indices[0], indices[k], indices[k + 1]]);
        }
    }

    debug!(
        path = %path.display(),
        vertices = vertices.len(),
        triangles = faces.len(),
        "Read PLY"
    );

    build_from_triangles(&vertices, &faces)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh as binary little-endian PLY.
///
/// # Example
///
/// ```no_run
/// use halfmesh::io::ply;
/// use halfmesh::mesh::TriMesh;
///
/// let mesh = TriMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    save_with_encoding(mesh, path, PlyEncoding::BinaryLittleEndian)
}

/// Save a mesh with the chosen encoding.
pub fn save_with_encoding<P: AsRef<Path>>(
    mesh: &TriMesh,
    path: P,
    encoding: PlyEncoding,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer, encoding)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh to any writer.
///
/// Vertices are numbered in iteration order. Coordinates are narrowed to `f32`.
pub fn write<W: Write>(mesh: &TriMesh, writer: &mut W, encoding: PlyEncoding) -> Result<()> {
    let (vertices, faces) = to_face_vertex(mesh);

    let format = match encoding {
        PlyEncoding::Ascii => "ascii",
        PlyEncoding::BinaryLittleEndian => "binary_little_endian",
    };
    writeln!(writer, "ply")?;
    writeln!(writer, "format {format} 1.0")?;
    writeln!(writer, "{COMMENT}")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    for property in ["x", "y", "z", "nx", "ny", "nz", "u", "v"] {
        writeln!(writer, "property float {property}")?;
    }
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_index")?;
    writeln!(writer, "end_header")?;

    match encoding {
        PlyEncoding::Ascii => {
            for v in &vertices {
                writeln!(writer, "{} {} {} 0 0 0 0 0", v.x as f32, v.y as f32, v.z as f32)?;
            }
            for f in &faces {
                writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
            }
        }
        PlyEncoding::BinaryLittleEndian => {
            let mut record = [0u8; 32];
            for v in &vertices {
                record[0..4].copy_from_slice(&(v.x as f32).to_le_bytes());
                record[4..8].copy_from_slice(&(v.y as f32).to_le_bytes());
                record[8..12].copy_from_slice(&(v.z as f32).to_le_bytes());
                writer.write_all(&record)?;
            }
            for f in &faces {
                writer.write_all(&[3u8])?;
                for &i in f {
                    let index = i32::try_from(i).map_err(|_| {
                        MeshError::invalid_param("vertex index", i, "does not fit a PLY int")
                    })?;
                    writer.write_all(&index.to_le_bytes())?;
                }
            }
        }
    }

    Ok(())
}
