//! Triangulated surface mesh
//!
//! [`TriangleMesh`] holds the vertex coordinates and triangle connectivity
//! together with per-triangle derived data (area, outward normal, centroid,
//! diameter). The derived data is computed once on construction; the mesh is
//! immutable afterwards.

use ndarray::Array2;

use super::aabb::Aabb;
use crate::core::error::GeometryError;
use crate::core::vector::{Vec3, cross, distance, dot, norm, scale, sub};

/// Relative area below which a triangle counts as degenerate
const DEGENERATE_AREA_TOL: f64 = 1e-14;

/// Closed, oriented surface made of flat triangles
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[usize; 3]>,
    normals: Vec<Vec3>,
    areas: Vec<f64>,
    centroids: Vec<Vec3>,
    diameters: Vec<f64>,
    bounds: Aabb,
}

impl TriangleMesh {
    /// Build a mesh, rejecting empty meshes, bad indices, non-finite
    /// coordinates and zero-area triangles
    ///
    /// Normals follow the right-hand rule on the vertex order. Topological
    /// checks (closedness, orientation) are done by [`TriangleMesh::validate`].
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>) -> Result<Self, GeometryError> {
        if vertices.is_empty() || triangles.is_empty() {
            return Err(GeometryError::Empty);
        }
        if let Some(vertex) = vertices
            .iter()
            .position(|v| v.iter().any(|c| !c.is_finite()))
        {
            return Err(GeometryError::NonFiniteVertex { vertex });
        }

        let num_vertices = vertices.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v >= num_vertices) {
                return Err(GeometryError::InvalidIndex {
                    triangle,
                    vertex,
                    num_vertices,
                });
            }
        }

        let bounds = Aabb::from_points(&vertices);
        let diag = bounds.diagonal();
        let min_area = DEGENERATE_AREA_TOL * diag * diag;

        let n = triangles.len();
        let mut normals = Vec::with_capacity(n);
        let mut areas = Vec::with_capacity(n);
        let mut centroids = Vec::with_capacity(n);
        let mut diameters = Vec::with_capacity(n);

        for (triangle, tri) in triangles.iter().enumerate() {
            let [a, b, c] = tri.map(|i| vertices[i]);
            let twice_normal = cross(&sub(&b, &a), &sub(&c, &a));
            let twice_area = norm(&twice_normal);
            let area = 0.5 * twice_area;
            if !(area > min_area) || tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(GeometryError::DegenerateTriangle { triangle, area });
            }
            normals.push(scale(1.0 / twice_area, &twice_normal));
            areas.push(area);
            centroids.push([
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ]);
            diameters.push(distance(&a, &b).max(distance(&b, &c)).max(distance(&c, &a)));
        }

        log::debug!(
            "Mesh: {} vertices, {} triangles, bounding box diagonal {:.4e}",
            num_vertices,
            n,
            diag
        );

        Ok(Self {
            vertices,
            triangles,
            normals,
            areas,
            centroids,
            diameters,
            bounds,
        })
    }

    /// Build a mesh from an (n × 3) coordinate array and (m × 3) index array
    pub fn from_arrays(
        vertices: &Array2<f64>,
        triangles: &Array2<usize>,
    ) -> Result<Self, GeometryError> {
        if vertices.ncols() != 3 {
            return Err(GeometryError::BadVertexShape {
                columns: vertices.ncols(),
            });
        }
        if triangles.ncols() != 3 {
            return Err(GeometryError::BadVertexShape {
                columns: triangles.ncols(),
            });
        }
        let verts = vertices
            .rows()
            .into_iter()
            .map(|r| [r[0], r[1], r[2]])
            .collect();
        let tris = triangles
            .rows()
            .into_iter()
            .map(|r| [r[0], r[1], r[2]])
            .collect();
        Self::new(verts, tris)
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex coordinates
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Triangle connectivity
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Vertex indices of triangle `t`
    #[inline]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        self.triangles[t]
    }

    /// Corner coordinates of triangle `t`
    #[inline]
    pub fn corners(&self, t: usize) -> [Vec3; 3] {
        self.triangles[t].map(|i| self.vertices[i])
    }

    /// Outward unit normal of triangle `t`
    #[inline]
    pub fn normal(&self, t: usize) -> Vec3 {
        self.normals[t]
    }

    /// Area of triangle `t`
    #[inline]
    pub fn area(&self, t: usize) -> f64 {
        self.areas[t]
    }

    /// Centroid of triangle `t`
    #[inline]
    pub fn centroid(&self, t: usize) -> Vec3 {
        self.centroids[t]
    }

    /// Longest edge of triangle `t`
    #[inline]
    pub fn diameter(&self, t: usize) -> f64 {
        self.diameters[t]
    }

    /// Bounding box of all vertices
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.areas.iter().sum()
    }

    /// Mean edge length, a characteristic mesh size
    pub fn mean_edge_length(&self) -> f64 {
        let total: f64 = (0..self.num_triangles())
            .map(|t| {
                let [a, b, c] = self.corners(t);
                distance(&a, &b) + distance(&b, &c) + distance(&c, &a)
            })
            .sum();
        total / (3 * self.num_triangles()) as f64
    }

    /// Signed enclosed volume (divergence theorem); positive when the normals
    /// point outward
    pub fn signed_volume(&self) -> f64 {
        let origin = self.bounds.center();
        (0..self.num_triangles())
            .map(|t| {
                let [a, b, c] = self.corners(t).map(|v| sub(&v, &origin));
                dot(&a, &cross(&b, &c)) / 6.0
            })
            .sum()
    }

    /// Vertex coordinates as an (n × 3) array
    pub fn vertex_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.num_vertices(), 3), |(i, j)| self.vertices[i][j])
    }
}
