//! High-level scattering API
//!
//! Ties the pipeline together: mesh validation and function spaces, operator
//! assembly, the dense solve, and field evaluation at observation points.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use math_audio_maxwell::core::{MaxwellSolver, ScatteringProblem, PhysicsParams};
//! use math_audio_maxwell::core::mesh::icosphere;
//!
//! let mesh = Arc::new(icosphere(1.0, 2)?);
//! let physics = PhysicsParams::new(15e6, 2.1, 1.0)?;
//! let problem = ScatteringProblem::plane_wave(mesh, physics, 0.0)?;
//!
//! let solution = MaxwellSolver::new().with_verbose(true).solve(&problem)?;
//! let samples = solution.evaluate(&points)?;
//! let intensity = samples.total_intensity();
//! ```

use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::assembly::{DenseAssembler, MultitraceSystemBuilder, OperatorAssembler};
use crate::core::error::MaxwellError;
use crate::core::incident::IncidentPlaneWave;
use crate::core::integration::triangle_rule;
use crate::core::mesh::{MeshValidation, TriangleMesh};
use crate::core::postprocess::{
    FieldCombiner, FieldSamples, ObservationGrid, PointClassifier, PointReport,
    PotentialEvaluator,
};
use crate::core::solver::{LinearSolver, MultitraceSolution};
use crate::core::space::MultitraceSpaces;
use crate::core::types::{
    AssemblerKind, ClassifierConfig, Device, PhysicsParams, QuadratureConfig, SolverConfig,
    SpaceType,
};

/// Definition of a scattering problem
#[derive(Debug, Clone)]
pub struct ScatteringProblem {
    /// Closed, outward-oriented surface of the scatterer
    pub mesh: Arc<TriangleMesh>,
    /// Material and frequency
    pub physics: PhysicsParams,
    /// Exciting plane wave
    pub incident: IncidentPlaneWave,
}

impl ScatteringProblem {
    /// Problem with an explicit incident wave
    pub fn new(
        mesh: Arc<TriangleMesh>,
        physics: PhysicsParams,
        incident: IncidentPlaneWave,
    ) -> Self {
        Self {
            mesh,
            physics,
            incident,
        }
    }

    /// Plane wave travelling along `(cos θ, sin θ, 0)`, polarized along z
    pub fn plane_wave(
        mesh: Arc<TriangleMesh>,
        physics: PhysicsParams,
        theta: f64,
    ) -> Result<Self, MaxwellError> {
        let incident = IncidentPlaneWave::in_xy_plane(physics.k_ext, theta)?;
        Ok(Self::new(mesh, physics, incident))
    }

    /// Size parameter `k_ext · r` with `r` the largest vertex distance from the origin
    pub fn size_parameter(&self) -> f64 {
        let radius = self
            .mesh
            .vertices()
            .iter()
            .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
            .fold(0.0f64, f64::max);
        self.physics.k_ext * radius
    }
}

/// Scattering solver configuration
#[derive(Debug, Clone, Default)]
pub struct MaxwellSolver {
    config: SolverConfig,
}

impl MaxwellSolver {
    /// Solver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration record
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the function space layout
    pub fn with_space_type(mut self, space_type: SpaceType) -> Self {
        self.config.space_type = space_type;
        self
    }

    /// Set the assembly backend
    pub fn with_assembler(mut self, assembler: AssemblerKind) -> Self {
        self.config.assembler = assembler;
        self
    }

    /// Set the compute backend
    pub fn with_device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    /// Set the quadrature orders and near-field factor
    pub fn with_quadrature(mut self, quadrature: QuadratureConfig) -> Self {
        self.config.quadrature = quadrature;
        self
    }

    /// Set the point classification tolerances
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Set the reciprocal condition number below which a solve is rejected
    pub fn with_rcond_threshold(mut self, threshold: f64) -> Self {
        self.config.rcond_threshold = threshold;
        self
    }

    /// Enable or disable the mesh self-intersection check
    pub fn with_self_intersection_check(mut self, check: bool) -> Self {
        self.config.check_self_intersection = check;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the surface currents of a problem
    pub fn solve(&self, problem: &ScatteringProblem) -> Result<ScatteringSolution, MaxwellError> {
        let config = &self.config;
        if config.assembler == AssemblerKind::Accelerated {
            return Err(MaxwellError::NotImplemented(
                "accelerated operator assembly is not available, use the dense assembler"
                    .to_string(),
            ));
        }
        if !(config.rcond_threshold.is_finite() && config.rcond_threshold >= 0.0) {
            return Err(MaxwellError::InvalidParameters(format!(
                "rcond threshold must be a non-negative number, got {}",
                config.rcond_threshold
            )));
        }

        let validation = MeshValidation {
            check_self_intersection: config.check_self_intersection,
        };
        let spaces = MultitraceSpaces::new(config.space_type, problem.mesh.clone(), &validation)?;
        if config.verbose {
            log::info!(
                "Solving scattering problem: {} triangles, {} dofs per trace, k_ext = {:.4}, k_int = {:.4}, k·r = {:.3}",
                problem.mesh.num_triangles(),
                spaces.domain.global_dof_count(),
                problem.physics.k_ext,
                problem.physics.k_int,
                problem.size_parameter()
            );
        }

        let assembler = DenseAssembler::new(config.quadrature, config.device);
        let rule = triangle_rule(config.quadrature.regular_points)?;
        let system = MultitraceSystemBuilder::new(&assembler, &spaces, rule)
            .build(&problem.physics, &problem.incident)?;
        if config.verbose {
            log::info!(
                "Assembled {} system of size {}",
                assembler.name(),
                system.matrix.nrows()
            );
        }

        let solution = LinearSolver::new(config.rcond_threshold)
            .with_verbose(config.verbose)
            .solve(&system)?;

        Ok(ScatteringSolution {
            spaces,
            solution,
            physics: problem.physics,
            incident: problem.incident,
            config: *config,
        })
    }
}

/// Solved surface currents together with what is needed to evaluate fields
#[derive(Debug, Clone)]
pub struct ScatteringSolution {
    spaces: MultitraceSpaces,
    solution: MultitraceSolution,
    physics: PhysicsParams,
    incident: IncidentPlaneWave,
    config: SolverConfig,
}

impl ScatteringSolution {
    /// Function spaces of the unknowns
    pub fn spaces(&self) -> &MultitraceSpaces {
        &self.spaces
    }

    /// Surface unknowns and condition estimate
    pub fn currents(&self) -> &MultitraceSolution {
        &self.solution
    }

    /// Physical parameters
    pub fn physics(&self) -> &PhysicsParams {
        &self.physics
    }

    /// Incident wave
    pub fn incident(&self) -> &IncidentPlaneWave {
        &self.incident
    }

    /// Number of degrees of freedom per trace
    pub fn num_dofs(&self) -> usize {
        self.spaces.domain.global_dof_count()
    }

    /// Evaluate scattered, interior and total fields at the rows of `points`
    pub fn evaluate(&self, points: &Array2<f64>) -> Result<FieldSamples, MaxwellError> {
        if points.ncols() != 3 {
            return Err(MaxwellError::InvalidParameters(format!(
                "observation points must have 3 columns, got {}",
                points.ncols()
            )));
        }
        let mesh = self.spaces.domain.mesh();
        let classifier =
            PointClassifier::new(mesh, self.config.classifier).with_device(self.config.device);
        let partition = classifier.classify(points);
        if self.config.verbose {
            log::info!(
                "Classified {} points: {} interior, {} exterior, {} ambiguous",
                partition.len(),
                partition.interior_indices.len(),
                partition.exterior_indices.len(),
                partition.ambiguities.len()
            );
        }

        let tolerance = self.config.classifier.surface_tolerance * mesh.bounds().diagonal();
        let evaluator = PotentialEvaluator::new(&self.spaces.domain, self.config.quadrature, tolerance)?
            .with_device(self.config.device);
        let combiner = FieldCombiner::new(&evaluator, self.physics, &self.incident);
        let samples = combiner.combine(&self.solution, points, &partition)?;
        if self.config.verbose && !samples.report.is_clean() {
            log::info!("{} points reported", samples.report.len());
        }
        Ok(samples)
    }

    /// Intensity maps on an observation grid
    pub fn intensity_maps(&self, grid: &ObservationGrid) -> Result<IntensityMaps, MaxwellError> {
        grid.validate()?;
        let samples = self.evaluate(&grid.points())?;
        Ok(IntensityMaps {
            total: samples.total_intensity().to_vec(),
            scattered: samples.scattered_intensity().to_vec(),
            grid: grid.clone(),
            report: samples.report,
        })
    }
}

/// Total and scattered intensity on an observation grid, in raster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityMaps {
    /// `|E_total|²` per grid point
    #[serde(with = "nan_as_null")]
    pub total: Vec<f64>,
    /// `|E_scattered|²` per grid point; NaN inside the scatterer
    #[serde(with = "nan_as_null")]
    pub scattered: Vec<f64>,
    /// The grid the maps were computed on
    pub grid: ObservationGrid,
    /// Per-point problems
    pub report: PointReport,
}

impl IntensityMaps {
    /// Total intensity as a `(ny, nx)` image with x horizontal
    pub fn total_image(&self) -> Result<Array2<f64>, MaxwellError> {
        self.grid.to_image(ndarray::ArrayView1::from(&self.total[..]))
    }

    /// Scattered intensity as a `(ny, nx)` image with x horizontal
    pub fn scattered_image(&self) -> Result<Array2<f64>, MaxwellError> {
        self.grid.to_image(ndarray::ArrayView1::from(&self.scattered[..]))
    }
}

/// JSON has no NaN: undefined values are written as `null`
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}

/// Solve a plane-wave scattering problem and sample intensities on a grid
///
/// The wave travels along `(cos θ, sin θ, 0)` with polarization `(0, 0, 1)`;
/// the `nx × ny` grid lies in the plane `z = 0`.
pub fn solve(
    mesh: &TriangleMesh,
    frequency_hz: f64,
    eps_r: f64,
    mu_r: f64,
    theta: f64,
    nx: usize,
    ny: usize,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) -> Result<IntensityMaps, MaxwellError> {
    let physics = PhysicsParams::new(frequency_hz, eps_r, mu_r)?;
    let grid = ObservationGrid::new(nx, ny, [x_min, x_max], [y_min, y_max])?;
    let problem = ScatteringProblem::plane_wave(Arc::new(mesh.clone()), physics, theta)?;
    MaxwellSolver::new().solve(&problem)?.intensity_maps(&grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::icosphere;
    use ndarray::array;

    fn problem(eps_r: f64) -> ScatteringProblem {
        let mesh = Arc::new(icosphere(1.0, 0).unwrap());
        let physics = PhysicsParams::with_wavenumber(0.5, eps_r, 1.0).unwrap();
        ScatteringProblem::plane_wave(mesh, physics, 0.0).unwrap()
    }

    #[test]
    fn test_solver_builder() {
        let solver = MaxwellSolver::new()
            .with_device(Device::Sequential)
            .with_rcond_threshold(1e-10)
            .with_verbose(true);
        assert_eq!(solver.config().device, Device::Sequential);
        assert_eq!(solver.config().rcond_threshold, 1e-10);
        assert!(solver.config().verbose);
        assert_eq!(solver.config().assembler, AssemblerKind::Dense);
    }

    #[test]
    fn test_accelerated_assembly_is_not_implemented() {
        let result = MaxwellSolver::new()
            .with_assembler(AssemblerKind::Accelerated)
            .solve(&problem(2.1));
        assert!(matches!(result, Err(MaxwellError::NotImplemented(_))));
    }

    #[test]
    fn test_small_problem_solves_and_evaluates() {
        let solution = MaxwellSolver::new().solve(&problem(2.1)).unwrap();
        assert_eq!(solution.num_dofs(), 30);
        assert!(solution.currents().condition.rcond > 1e-13);

        let points = array![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        let samples = solution.evaluate(&points).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.locations[0].is_interior());
        assert!(samples.scattered[[0, 2]].re.is_nan());
        assert!(samples.total[[0, 2]].re.is_finite());
        assert!(samples.total[[1, 2]].re.is_finite());
        assert!(samples.report.is_clean());
    }

    #[test]
    fn test_evaluate_rejects_bad_point_shape() {
        let solution = MaxwellSolver::new().solve(&problem(2.1)).unwrap();
        let points = Array2::zeros((2, 2));
        assert!(matches!(
            solution.evaluate(&points),
            Err(MaxwellError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_intensity_maps_follow_the_grid() {
        let solution = MaxwellSolver::new().solve(&problem(2.1)).unwrap();
        let grid = ObservationGrid::new(3, 2, [2.0, 4.0], [-1.0, 1.0]).unwrap();
        let maps = solution.intensity_maps(&grid).unwrap();
        assert_eq!(maps.total.len(), 6);
        assert_eq!(maps.scattered.len(), 6);
        assert_eq!(maps.total_image().unwrap().dim(), (2, 3));
    }
}
