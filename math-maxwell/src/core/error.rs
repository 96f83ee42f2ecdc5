//! Error types for the scattering pipeline
//!
//! Geometry, assembly and singular-system errors abort a solve. Classification
//! ambiguities and evaluation errors are per point: they end up in a
//! [`PointReport`](crate::core::postprocess::PointReport) next to the regular
//! output.

use math_audio_solvers::LuError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::io::config::ConfigError;

/// Defects of the input surface mesh
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The mesh has no vertices or no triangles
    #[error("mesh is empty")]
    Empty,

    /// The vertex array does not have three columns
    #[error("vertex array must have 3 columns, got {columns}")]
    BadVertexShape {
        /// Number of columns found
        columns: usize,
    },

    /// A triangle references a vertex that does not exist
    #[error("triangle {triangle} references vertex {vertex}, mesh has {num_vertices} vertices")]
    InvalidIndex {
        /// Triangle index
        triangle: usize,
        /// Offending vertex index
        vertex: usize,
        /// Number of vertices in the mesh
        num_vertices: usize,
    },

    /// A vertex has NaN or infinite coordinates
    #[error("vertex {vertex} has non-finite coordinates")]
    NonFiniteVertex {
        /// Vertex index
        vertex: usize,
    },

    /// A triangle has (numerically) zero area
    #[error("triangle {triangle} is degenerate (area {area:e})")]
    DegenerateTriangle {
        /// Triangle index
        triangle: usize,
        /// Computed area
        area: f64,
    },

    /// An edge is shared by more than two triangles
    #[error("edge ({}, {}) is shared by {count} triangles", .edge[0], .edge[1])]
    NonManifoldEdge {
        /// Sorted vertex pair
        edge: [usize; 2],
        /// Number of incident triangles
        count: usize,
    },

    /// An edge belongs to a single triangle, so the surface is not closed
    #[error("surface is open: edge ({}, {}) of triangle {triangle} has no neighbour", .edge[0], .edge[1])]
    OpenBoundary {
        /// Sorted vertex pair
        edge: [usize; 2],
        /// The only triangle using this edge
        triangle: usize,
    },

    /// Two neighbouring triangles traverse their shared edge in the same direction
    #[error("triangles {} and {} have inconsistent orientation", .triangles[0], .triangles[1])]
    InconsistentOrientation {
        /// The two neighbouring triangles
        triangles: [usize; 2],
    },

    /// The normals point into the enclosed volume
    #[error("surface normals point inward (signed volume {signed_volume:e})")]
    InwardOrientation {
        /// Signed enclosed volume; positive for outward normals
        signed_volume: f64,
    },

    /// Two non-adjacent triangles intersect
    #[error("triangles {} and {} intersect", .triangles[0], .triangles[1])]
    SelfIntersection {
        /// The intersecting pair
        triangles: [usize; 2],
    },
}

/// A point whose inside/outside status could not be decided cleanly
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassificationAmbiguity {
    /// The point lies on the surface (within tolerance); treated as interior
    #[error("point {index} lies on the surface (distance {distance:e}); treated as interior")]
    OnSurface {
        /// Index of the observation point
        index: usize,
        /// Distance to the closest triangle
        distance: f64,
    },

    /// The winding number is not close to an integer (leaky mesh)
    #[error("point {index} has non-integer winding number {winding:.4}; classified {}", side(.interior))]
    Inconclusive {
        /// Index of the observation point
        index: usize,
        /// Computed generalized winding number
        winding: f64,
        /// Classification that was applied
        interior: bool,
    },
}

fn side(interior: &bool) -> &'static str {
    if *interior { "interior" } else { "exterior" }
}

/// Failures while building operator blocks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// Wavenumber is zero, negative or not finite
    #[error("invalid wavenumber {wavenumber}")]
    InvalidWavenumber {
        /// Offending wavenumber
        wavenumber: f64,
    },

    /// A material or excitation parameter is not a positive finite number
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Quadrature order without a tabulated rule
    #[error("no triangle quadrature rule with {points} points")]
    UnsupportedQuadrature {
        /// Requested number of points
        points: usize,
    },

    /// Operators or grid functions live on different function spaces
    #[error("incompatible function spaces: {0}")]
    IncompatibleSpaces(String),

    /// A matrix entry came out NaN or infinite
    #[error("non-finite entry in {operator} operator at ({row}, {col})")]
    NonFiniteEntry {
        /// Operator name
        operator: &'static str,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },
}

/// The combined system cannot be solved reliably
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SingularSystemError {
    /// LU elimination met a vanishing pivot
    #[error("system matrix is singular (vanishing pivot in column {pivot})")]
    ZeroPivot {
        /// Column of the failing pivot
        pivot: usize,
    },

    /// Factorization succeeded but the matrix is severely ill-conditioned
    #[error(
        "system matrix is ill-conditioned: condition estimate {condition:e} (rcond {rcond:e} < {threshold:e})"
    )]
    IllConditioned {
        /// 1-norm condition estimate
        condition: f64,
        /// Reciprocal condition estimate
        rcond: f64,
        /// Configured rejection threshold
        threshold: f64,
    },

    /// The system handed to the solver is inconsistent
    #[error("malformed linear system: {0}")]
    InvalidSystem(String),

    /// Any other failure of the dense solver
    #[error("dense solver failed: {0}")]
    Solver(LuError),
}

impl From<LuError> for SingularSystemError {
    fn from(err: LuError) -> Self {
        match err {
            LuError::SingularMatrix { pivot } => SingularSystemError::ZeroPivot { pivot },
            other => SingularSystemError::Solver(other),
        }
    }
}

/// Potential evaluation failed at one observation point
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvaluationError {
    /// The point is too close to the surface for the potentials to be defined
    #[error("point {index} is within {distance:e} of the surface")]
    OnSurface {
        /// Index of the observation point
        index: usize,
        /// Distance to the closest triangle
        distance: f64,
    },

    /// The evaluated field contains NaN or infinite components
    #[error("field at point {index} is not finite")]
    NonFinite {
        /// Index of the observation point
        index: usize,
    },
}

impl EvaluationError {
    /// Index of the observation point concerned
    pub fn index(&self) -> usize {
        match self {
            EvaluationError::OnSurface { index, .. } | EvaluationError::NonFinite { index } => {
                *index
            }
        }
    }

    /// The same error for another point index
    pub fn with_index(self, index: usize) -> Self {
        match self {
            EvaluationError::OnSurface { distance, .. } => {
                EvaluationError::OnSurface { index, distance }
            }
            EvaluationError::NonFinite { .. } => EvaluationError::NonFinite { index },
        }
    }
}

/// Top-level error of the scattering solver
#[derive(Error, Debug)]
pub enum MaxwellError {
    /// Invalid surface mesh
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Operator assembly failed
    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// The linear system is singular or ill-conditioned
    #[error("singular system: {0}")]
    SingularSystem(#[from] SingularSystemError),

    /// Invalid user-supplied parameters (grid, frequency, ...)
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Requested option is recognised but not available
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Malformed mesh file
    #[error("mesh format error: {0}")]
    MeshFormat(String),

    /// Unreadable or malformed configuration file
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lu_error_maps_to_zero_pivot() {
        let err: SingularSystemError = LuError::SingularMatrix { pivot: 7 }.into();
        assert_eq!(err, SingularSystemError::ZeroPivot { pivot: 7 });
    }

    #[test]
    fn test_messages_name_the_defect() {
        let err = MaxwellError::from(GeometryError::OpenBoundary {
            edge: [3, 9],
            triangle: 4,
        });
        let msg = err.to_string();
        assert!(msg.contains("open"));
        assert!(msg.contains("(3, 9)"));

        let amb = ClassificationAmbiguity::Inconclusive {
            index: 2,
            winding: 0.5,
            interior: true,
        };
        assert!(amb.to_string().contains("interior"));
    }
}
