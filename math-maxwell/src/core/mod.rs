//! Pure Rust BEM solver for dielectric scattering
//!
//! Plane-wave scattering by a homogeneous dielectric body in vacuum, in the
//! multitrace (PMCHWT) formulation with RWG boundary elements.
//!
//! ## Architecture
//!
//! - `types`: Physical parameters, media and the solver configuration record
//! - `constants`: Physical and numerical constants
//! - `vector`: Small real and complex 3-vector helpers
//! - `error`: Error taxonomy of the pipeline
//! - `mesh`: Triangle meshes, closed-surface validation and generators
//! - `space`: RWG function spaces and grid functions
//! - `integration`: Triangle quadrature, Helmholtz kernels, singular integrals
//! - `incident`: The exciting plane wave and its surface traces
//! - `assembly`: Boundary operators, multitrace operators and the linear system
//! - `solver`: Dense LU solve with condition estimation
//! - `postprocess`: Point classification, potentials and field combination
//! - `io`: STL meshes, run configuration and JSON output
//! - `maxwell_solver`: High-level API tying the pipeline together
//! - `parallel`: Portable parallel iteration (rayon or sequential)

pub mod assembly;
pub mod constants;
pub mod error;
pub mod incident;
pub mod integration;
pub mod io;
pub mod maxwell_solver;
pub mod mesh;
pub mod parallel;
pub mod postprocess;
pub mod solver;
pub mod space;
pub mod types;
pub mod vector;

// Re-exports for convenience
pub use error::{
    AssemblyError, ClassificationAmbiguity, EvaluationError, GeometryError, MaxwellError,
    SingularSystemError,
};
pub use incident::IncidentPlaneWave;
pub use maxwell_solver::{
    IntensityMaps, MaxwellSolver, ScatteringProblem, ScatteringSolution, solve,
};
pub use mesh::TriangleMesh;
pub use postprocess::{FieldSamples, ObservationGrid, PointReport};
pub use types::*;
