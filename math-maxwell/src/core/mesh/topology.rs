//! Edge topology and closed-surface validation

use std::collections::BTreeMap;

use super::surface::TriangleMesh;
use crate::core::error::GeometryError;
use crate::core::vector::distance;

/// An interior edge of a closed surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEdge {
    /// Sorted vertex indices
    pub vertices: [usize; 2],
    /// The two triangles sharing the edge; the first is the "plus" side
    pub triangles: [usize; 2],
    /// Edge length
    pub length: f64,
}

/// Edge structure of a validated mesh
#[derive(Debug, Clone)]
pub struct MeshTopology {
    /// Edges ordered by their sorted vertex pair
    pub edges: Vec<MeshEdge>,
    /// Signed enclosed volume
    pub volume: f64,
}

impl MeshTopology {
    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

/// Validation options
#[derive(Debug, Clone, Copy)]
pub struct MeshValidation {
    /// Run the O(T log T + pairs) self-intersection sweep
    pub check_self_intersection: bool,
}

impl Default for MeshValidation {
    fn default() -> Self {
        Self {
            check_self_intersection: true,
        }
    }
}

impl TriangleMesh {
    /// Check that the mesh is a closed, manifold, consistently and outwardly
    /// oriented surface and return its edge topology
    pub fn validate(&self, options: &MeshValidation) -> Result<MeshTopology, GeometryError> {
        // Each sorted edge maps to (triangle, traversed in sorted direction)
        let mut uses: BTreeMap<[usize; 2], Vec<(usize, bool)>> = BTreeMap::new();
        for (t, tri) in self.triangles().iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let key = if a < b { [a, b] } else { [b, a] };
                uses.entry(key).or_default().push((t, a < b));
            }
        }

        let mut edges = Vec::with_capacity(uses.len());
        for (key, incident) in &uses {
            match incident.as_slice() {
                [(t0, fwd0), (t1, fwd1)] => {
                    if fwd0 == fwd1 {
                        return Err(GeometryError::InconsistentOrientation {
                            triangles: [*t0, *t1],
                        });
                    }
                    let length = distance(&self.vertices()[key[0]], &self.vertices()[key[1]]);
                    edges.push(MeshEdge {
                        vertices: *key,
                        triangles: [*t0, *t1],
                        length,
                    });
                }
                [(t, _)] => {
                    return Err(GeometryError::OpenBoundary {
                        edge: *key,
                        triangle: *t,
                    });
                }
                _ => {
                    return Err(GeometryError::NonManifoldEdge {
                        edge: *key,
                        count: incident.len(),
                    });
                }
            }
        }

        let volume = self.signed_volume();
        if volume <= 0.0 {
            return Err(GeometryError::InwardOrientation {
                signed_volume: volume,
            });
        }

        if options.check_self_intersection {
            if let Some(triangles) = self.find_self_intersection() {
                return Err(GeometryError::SelfIntersection { triangles });
            }
        }

        log::debug!(
            "Validated closed surface: {} edges, enclosed volume {:.6e}",
            edges.len(),
            volume
        );

        Ok(MeshTopology { edges, volume })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::generators::icosphere;
    use crate::core::vector::Vec3;

    fn tetrahedron(offset: Vec3) -> (Vec<Vec3>, Vec<[usize; 3]>) {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]
        .map(|v| [v[0] + offset[0], v[1] + offset[1], v[2] + offset[2]])
        .to_vec();
        let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
        (vertices, triangles)
    }

    #[test]
    fn test_closed_icosphere_is_valid() {
        let mesh = icosphere(1.0, 1).unwrap();
        let topo = mesh.validate(&MeshValidation::default()).unwrap();
        // Euler: E = 3T/2 on a closed triangulated surface
        assert_eq!(topo.num_edges(), 3 * mesh.num_triangles() / 2);
        assert!(topo.volume > 0.0);
    }

    #[test]
    fn test_open_surface() {
        let (v, mut t) = tetrahedron([0.0; 3]);
        t.pop();
        let mesh = TriangleMesh::new(v, t).unwrap();
        assert!(matches!(
            mesh.validate(&MeshValidation::default()),
            Err(GeometryError::OpenBoundary { .. })
        ));
    }

    #[test]
    fn test_non_manifold_edge() {
        let (mut v, mut t) = tetrahedron([0.0; 3]);
        // A fin hanging off edge (0, 1)
        v.push([0.5, -1.0, 0.0]);
        t.push([0, 1, 4]);
        let mesh = TriangleMesh::new(v, t).unwrap();
        assert_eq!(
            mesh.validate(&MeshValidation::default()).unwrap_err(),
            GeometryError::NonManifoldEdge {
                edge: [0, 1],
                count: 3
            }
        );
    }

    #[test]
    fn test_inconsistent_orientation() {
        let (v, mut t) = tetrahedron([0.0; 3]);
        t[2] = [1, 3, 2];
        let mesh = TriangleMesh::new(v, t).unwrap();
        assert!(matches!(
            mesh.validate(&MeshValidation::default()),
            Err(GeometryError::InconsistentOrientation { .. })
        ));
    }

    #[test]
    fn test_inward_orientation() {
        let (v, t) = tetrahedron([0.0; 3]);
        let flipped = t.into_iter().map(|[a, b, c]| [a, c, b]).collect();
        let mesh = TriangleMesh::new(v, flipped).unwrap();
        assert!(matches!(
            mesh.validate(&MeshValidation::default()),
            Err(GeometryError::InwardOrientation { .. })
        ));
    }

    #[test]
    fn test_self_intersection() {
        let (mut v, mut t) = tetrahedron([0.0; 3]);
        let (v2, t2) = tetrahedron([0.2, 0.2, 0.2]);
        let base = v.len();
        v.extend(v2);
        t.extend(t2.into_iter().map(|tri| tri.map(|i| i + base)));
        let mesh = TriangleMesh::new(v, t).unwrap();

        let err = mesh.validate(&MeshValidation::default()).unwrap_err();
        assert!(matches!(err, GeometryError::SelfIntersection { .. }));

        // Topologically fine when the check is disabled
        let relaxed = MeshValidation {
            check_self_intersection: false,
        };
        assert!(mesh.validate(&relaxed).is_ok());
    }

    #[test]
    fn test_disjoint_bodies_do_not_intersect() {
        let (mut v, mut t) = tetrahedron([0.0; 3]);
        let (v2, t2) = tetrahedron([3.0, 0.0, 0.0]);
        let base = v.len();
        v.extend(v2);
        t.extend(t2.into_iter().map(|tri| tri.map(|i| i + base)));
        let mesh = TriangleMesh::new(v, t).unwrap();
        assert!(mesh.validate(&MeshValidation::default()).is_ok());
    }
}
