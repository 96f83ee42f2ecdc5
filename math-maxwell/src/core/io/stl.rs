//! STL surface meshes
//!
//! Both ASCII and binary STL are read. STL stores every triangle with its own
//! three corners; corners with bit-identical coordinates are welded into one
//! vertex, which recovers the connectivity of meshes written by gmsh and most
//! CAD tools. The stored facet normals are ignored: orientation comes from the
//! corner order.
//!
//! The mesh is not validated here. Closedness and orientation are checked when
//! the function spaces are built.

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::error::MaxwellError;
use crate::core::mesh::TriangleMesh;
use crate::core::vector::Vec3;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Read an ASCII or binary STL file
pub fn read_stl<P: AsRef<Path>>(path: P) -> Result<TriangleMesh, MaxwellError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mesh = parse_stl(&bytes)?;
    log::debug!(
        "Read {}: {} vertices, {} triangles",
        path.display(),
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

/// Parse STL content, detecting the encoding
pub fn parse_stl(bytes: &[u8]) -> Result<TriangleMesh, MaxwellError> {
    let facets = if is_binary(bytes) {
        parse_binary(bytes)?
    } else {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| MaxwellError::MeshFormat("STL is neither binary nor ASCII".to_string()))?;
        parse_ascii(text)?
    };
    let (vertices, triangles) = weld(&facets);
    log::debug!(
        "Welded {} facet corners into {} vertices",
        3 * facets.len(),
        vertices.len()
    );
    Ok(TriangleMesh::new(vertices, triangles)?)
}

/// Write a binary STL file
pub fn write_stl<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<(), MaxwellError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(fs::File::create(path)?);

    let mut header = [b' '; HEADER_LEN];
    let title = b"math-audio-maxwell binary STL";
    header[..title.len()].copy_from_slice(title);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.num_triangles()).map_err(|_| {
        MaxwellError::MeshFormat(format!(
            "{} triangles do not fit a binary STL",
            mesh.num_triangles()
        ))
    })?;
    writer.write_all(&count.to_le_bytes())?;

    for t in 0..mesh.num_triangles() {
        let normal = mesh.normal(t);
        for c in normal {
            writer.write_all(&(c as f32).to_le_bytes())?;
        }
        for corner in mesh.corners(t) {
            for c in corner {
                writer.write_all(&(c as f32).to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()?;
    log::debug!("Wrote {}: {} triangles", path.display(), count);
    Ok(())
}

/// Binary files announce their facet count right after the header
fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN + 4 {
        return false;
    }
    let count = u32::from_le_bytes([
        bytes[HEADER_LEN],
        bytes[HEADER_LEN + 1],
        bytes[HEADER_LEN + 2],
        bytes[HEADER_LEN + 3],
    ]) as usize;
    bytes.len() == HEADER_LEN + 4 + count * FACET_LEN
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, MaxwellError> {
    let body = &bytes[HEADER_LEN + 4..];
    let read_f32 = |chunk: &[u8], offset: usize| {
        f32::from_le_bytes([
            chunk[offset],
            chunk[offset + 1],
            chunk[offset + 2],
            chunk[offset + 3],
        ]) as f64
    };
    let facets = body
        .chunks_exact(FACET_LEN)
        .map(|chunk| {
            // 12 bytes of normal, then three corners
            let mut corners = [[0.0; 3]; 3];
            for (v, corner) in corners.iter_mut().enumerate() {
                for (c, value) in corner.iter_mut().enumerate() {
                    *value = read_f32(chunk, 12 + 12 * v + 4 * c);
                }
            }
            corners
        })
        .collect::<Vec<_>>();
    if facets.is_empty() {
        return Err(MaxwellError::MeshFormat(
            "binary STL contains no facets".to_string(),
        ));
    }
    Ok(facets)
}

fn parse_ascii(text: &str) -> Result<Vec<[Vec3; 3]>, MaxwellError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
    match lines.next() {
        Some((_, first)) if first.starts_with("solid") => {}
        _ => {
            return Err(MaxwellError::MeshFormat(
                "ASCII STL must start with 'solid'".to_string(),
            ));
        }
    }

    let mut facets = Vec::new();
    let mut corners: Vec<Vec3> = Vec::with_capacity(3);
    for (line_no, line) in lines {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut corner = [0.0; 3];
                for value in corner.iter_mut() {
                    *value = tokens
                        .next()
                        .and_then(|t| t.parse::<f64>().ok())
                        .ok_or_else(|| {
                            MaxwellError::MeshFormat(format!(
                                "line {line_no}: malformed vertex '{line}'"
                            ))
                        })?;
                }
                corners.push(corner);
            }
            Some("endfacet") => {
                if corners.len() != 3 {
                    return Err(MaxwellError::MeshFormat(format!(
                        "line {line_no}: facet has {} vertices, expected 3",
                        corners.len()
                    )));
                }
                facets.push([corners[0], corners[1], corners[2]]);
                corners.clear();
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    if facets.is_empty() {
        return Err(MaxwellError::MeshFormat(
            "ASCII STL contains no facets".to_string(),
        ));
    }
    Ok(facets)
}

/// Merge corners with bit-identical coordinates
fn weld(facets: &[[Vec3; 3]]) -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let mut index: HashMap<[u64; 3], usize> = HashMap::new();
    let mut vertices = Vec::new();
    let triangles = facets
        .iter()
        .map(|facet| {
            facet.map(|corner| {
                // +0.0 and -0.0 are the same point
                let key = corner.map(|c| (c + 0.0).to_bits());
                *index.entry(key).or_insert_with(|| {
                    vertices.push(corner);
                    vertices.len() - 1
                })
            })
        })
        .collect();
    (vertices, triangles)
}
