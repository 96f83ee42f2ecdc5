//! Mesh generators for analytical test geometries
//!
//! Closed, outward-oriented sphere meshes used by tests, benchmarks and the
//! command-line driver.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::surface::TriangleMesh;
use crate::core::error::GeometryError;
use crate::core::vector::Vec3;

/// Generate a spherical surface mesh using UV-sphere discretization
///
/// Creates a triangulated sphere with vertices distributed along
/// latitude/longitude lines and a single vertex at each pole.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `n_theta` - Number of divisions in polar direction (latitude), at least 2
/// * `n_phi` - Number of divisions in azimuthal direction (longitude), at least 3
pub fn uv_sphere(radius: f64, n_theta: usize, n_phi: usize) -> Result<TriangleMesh, GeometryError> {
    if n_theta < 2 || n_phi < 3 {
        return Err(GeometryError::Empty);
    }
    let mut nodes: Vec<Vec3> = Vec::with_capacity(2 + (n_theta - 1) * n_phi);
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(2 * n_theta * n_phi);

    // North pole
    nodes.push([0.0, 0.0, radius]);

    // Interior latitude bands
    for i in 1..n_theta {
        let theta = PI * i as f64 / n_theta as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for j in 0..n_phi {
            let phi = 2.0 * PI * j as f64 / n_phi as f64;
            nodes.push([
                radius * sin_theta * phi.cos(),
                radius * sin_theta * phi.sin(),
                radius * cos_theta,
            ]);
        }
    }

    // South pole
    nodes.push([0.0, 0.0, -radius]);
    let south_pole = nodes.len() - 1;

    // North polar cap
    for j in 0..n_phi {
        let j_next = (j + 1) % n_phi;
        faces.push([0, 1 + j, 1 + j_next]);
    }

    // Middle bands (quad → 2 triangles)
    for i in 0..(n_theta - 2) {
        let row_start = 1 + i * n_phi;
        let next_row_start = 1 + (i + 1) * n_phi;
        for j in 0..n_phi {
            let j_next = (j + 1) % n_phi;
            let n0 = row_start + j;
            let n1 = row_start + j_next;
            let n2 = next_row_start + j;
            let n3 = next_row_start + j_next;
            faces.push([n0, n2, n1]);
            faces.push([n1, n2, n3]);
        }
    }

    // South polar cap
    let last_row_start = 1 + (n_theta - 2) * n_phi;
    for j in 0..n_phi {
        let j_next = (j + 1) % n_phi;
        faces.push([last_row_start + j, south_pole, last_row_start + j_next]);
    }

    TriangleMesh::new(nodes, faces)
}

/// Generate an icosphere mesh (subdivided icosahedron)
///
/// More uniform element sizes than the UV-sphere, better for BEM. The mesh is
/// symmetric under reflection in each coordinate plane.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `subdivisions` - Number of subdivision iterations (0 = 20 triangles, 1 = 80, 2 = 320)
pub fn icosphere(radius: f64, subdivisions: usize) -> Result<TriangleMesh, GeometryError> {
    // Golden ratio
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<Vec3> = vec![
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ];
    for v in &mut vertices {
        *v = project_to_unit_sphere(v);
    }

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::with_capacity(4 * faces.len());
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for &[v0, v1, v2] in &faces {
            let m01 = midpoint(&mut vertices, &mut midpoints, v0, v1);
            let m12 = midpoint(&mut vertices, &mut midpoints, v1, v2);
            let m20 = midpoint(&mut vertices, &mut midpoints, v2, v0);

            new_faces.push([v0, m01, m20]);
            new_faces.push([v1, m12, m01]);
            new_faces.push([v2, m20, m12]);
            new_faces.push([m01, m12, m20]);
        }
        faces = new_faces;
    }

    let nodes = vertices
        .iter()
        .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
        .collect();

    TriangleMesh::new(nodes, faces)
}

fn project_to_unit_sphere(v: &Vec3) -> Vec3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Get or create the (projected) midpoint of edge v0-v1
fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(usize, usize), usize>,
    v0: usize,
    v1: usize,
) -> usize {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let (a, b) = (vertices[key.0], vertices[key.1]);
    let mid = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0, (a[2] + b[2]) / 2.0];
    let idx = vertices.len();
    vertices.push(project_to_unit_sphere(&mid));
    cache.insert(key, idx);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::MeshValidation;
    use crate::core::vector::norm;
    use approx::assert_relative_eq;

    #[test]
    fn test_icosphere_counts() {
        for (sub, tris, verts) in [(0, 20, 12), (1, 80, 42), (2, 320, 162)] {
            let mesh = icosphere(1.0, sub).unwrap();
            assert_eq!(mesh.num_triangles(), tris);
            assert_eq!(mesh.num_vertices(), verts);
        }
    }

    #[test]
    fn test_icosphere_vertices_on_sphere() {
        let mesh = icosphere(2.5, 2).unwrap();
        for v in mesh.vertices() {
            assert_relative_eq!(norm(v), 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_icosphere_outward_and_closed() {
        let mesh = icosphere(1.0, 2).unwrap();
        let topo = mesh.validate(&MeshValidation::default()).unwrap();
        // Inscribed polyhedron: slightly less than the ball volume
        let ball = 4.0 / 3.0 * PI;
        assert!(topo.volume < ball && topo.volume > 0.9 * ball);
    }

    #[test]
    fn test_uv_sphere_outward_and_closed() {
        let mesh = uv_sphere(1.0, 8, 12).unwrap();
        assert_eq!(mesh.num_vertices(), 2 + 7 * 12);
        assert_eq!(mesh.num_triangles(), 2 * 12 * 7);
        let topo = mesh.validate(&MeshValidation::default()).unwrap();
        assert!(topo.volume > 0.0);
        for t in 0..mesh.num_triangles() {
            let c = mesh.centroid(t);
            let n = mesh.normal(t);
            assert!(c[0] * n[0] + c[1] * n[1] + c[2] * n[2] > 0.0);
        }
    }

    #[test]
    fn test_uv_sphere_rejects_too_coarse() {
        assert!(uv_sphere(1.0, 1, 8).is_err());
        assert!(uv_sphere(1.0, 4, 2).is_err());
    }
}
