//! Field reconstruction from the solved surface currents
//!
//! With tangential unknown `T` and Neumann unknown `N`:
//!
//! ```text
//! exterior(x) = −𝓔(k_ext) N − 𝓗(k_ext) T
//! interior(x) =  ρ 𝓔(k_int) N + 𝓗(k_int) T        ρ = √(μ_r/ε_r)
//! ```
//!
//! The scattered field is the exterior field outside and NaN inside; the total
//! field adds the incident wave outside and is the interior field inside.

use ndarray::{Array1, Array2, Axis};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::classify::{PointLocation, PointPartition};
use super::potential::{PotentialEvaluator, PotentialField};
use crate::core::error::{AssemblyError, ClassificationAmbiguity, EvaluationError};
use crate::core::incident::IncidentPlaneWave;
use crate::core::solver::MultitraceSolution;
use crate::core::types::PhysicsParams;

/// Non-fatal, per-point problems of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointReport {
    /// Points classified by convention
    pub ambiguities: Vec<ClassificationAmbiguity>,
    /// Points whose field could not be evaluated (NaN in the output)
    pub evaluation_errors: Vec<EvaluationError>,
}

impl PointReport {
    /// True when nothing was reported
    pub fn is_clean(&self) -> bool {
        self.ambiguities.is_empty() && self.evaluation_errors.is_empty()
    }

    /// Total number of reported conditions
    pub fn len(&self) -> usize {
        self.ambiguities.len() + self.evaluation_errors.len()
    }

    /// True when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}

/// Field samples at a set of observation points
#[derive(Debug, Clone)]
pub struct FieldSamples {
    /// Observation points (`m × 3`)
    pub points: Array2<f64>,
    /// Interior/exterior label of each point
    pub locations: Vec<PointLocation>,
    /// Scattered field; NaN at interior points
    pub scattered: Array2<Complex64>,
    /// Interior field; NaN at exterior points
    pub interior: Array2<Complex64>,
    /// Total field
    pub total: Array2<Complex64>,
    /// Per-point problems
    pub report: PointReport,
}

impl FieldSamples {
    /// Number of points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// True without points
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// `Σ |E_c|²` of the scattered field per point
    pub fn scattered_intensity(&self) -> Array1<f64> {
        intensity(&self.scattered)
    }

    /// `Σ |E_c|²` of the total field per point
    pub fn total_intensity(&self) -> Array1<f64> {
        intensity(&self.total)
    }
}

/// Per-row `Σ |v_c|²`; NaN rows stay NaN
pub fn intensity(field: &Array2<Complex64>) -> Array1<f64> {
    field.map_axis(Axis(1), |row| row.iter().map(|v| v.norm_sqr()).sum())
}

/// Combines potentials, the incident wave and the classification
pub struct FieldCombiner<'a> {
    evaluator: &'a PotentialEvaluator<'a>,
    physics: PhysicsParams,
    incident: &'a IncidentPlaneWave,
}

impl<'a> FieldCombiner<'a> {
    /// Combiner for one solved problem
    pub fn new(
        evaluator: &'a PotentialEvaluator<'a>,
        physics: PhysicsParams,
        incident: &'a IncidentPlaneWave,
    ) -> Self {
        Self {
            evaluator,
            physics,
            incident,
        }
    }

    /// Exterior representation at `points`; meaningful for exterior points only
    pub fn exterior_field(
        &self,
        solution: &MultitraceSolution,
        points: &Array2<f64>,
    ) -> Result<PotentialField, AssemblyError> {
        let k = self.physics.k_ext;
        let e = self.evaluator.electric(k, &solution.neumann, points)?;
        let h = self.evaluator.magnetic(k, &solution.tangential, points)?;
        Ok(linear_combination(
            Complex64::new(-1.0, 0.0),
            e,
            Complex64::new(-1.0, 0.0),
            h,
        ))
    }

    /// Interior representation at `points`; meaningful for interior points only
    pub fn interior_field(
        &self,
        solution: &MultitraceSolution,
        points: &Array2<f64>,
    ) -> Result<PotentialField, AssemblyError> {
        let medium = self.physics.interior_medium();
        let k = medium.wavenumber;
        let e = self.evaluator.electric(k, &solution.neumann, points)?;
        let h = self.evaluator.magnetic(k, &solution.tangential, points)?;
        Ok(linear_combination(
            Complex64::new(medium.impedance_ratio(), 0.0),
            e,
            Complex64::new(1.0, 0.0),
            h,
        ))
    }

    /// Evaluate scattered, interior and total fields at classified points
    pub fn combine(
        &self,
        solution: &MultitraceSolution,
        points: &Array2<f64>,
        partition: &PointPartition,
    ) -> Result<FieldSamples, AssemblyError> {
        let m = points.nrows();
        if partition.len() != m {
            return Err(AssemblyError::IncompatibleSpaces(format!(
                "partition covers {} points, {} given",
                partition.len(),
                m
            )));
        }

        let nan = Complex64::new(f64::NAN, f64::NAN);
        let mut scattered = Array2::from_elem((m, 3), nan);
        let mut interior = Array2::from_elem((m, 3), nan);
        let mut total = Array2::from_elem((m, 3), nan);
        let mut evaluation_errors = Vec::new();

        let exterior_points = partition.exterior_points(points);
        let field = self.exterior_field(solution, &exterior_points)?;
        let incident = self.incident.evaluate_field(&exterior_points);
        for (local, &global) in partition.exterior_indices.iter().enumerate() {
            for c in 0..3 {
                let value = field.values[[local, c]];
                scattered[[global, c]] = value;
                total[[global, c]] = value + incident[[local, c]];
            }
        }
        evaluation_errors.extend(
            field
                .errors
                .into_iter()
                .map(|e| {
                    let index = partition.exterior_indices[e.index()];
                    e.with_index(index)
                }),
        );

        let interior_points = partition.interior_points(points);
        let field = self.interior_field(solution, &interior_points)?;
        for (local, &global) in partition.interior_indices.iter().enumerate() {
            for c in 0..3 {
                let value = field.values[[local, c]];
                interior[[global, c]] = value;
                total[[global, c]] = value;
            }
        }
        evaluation_errors.extend(
            field
                .errors
                .into_iter()
                .map(|e| {
                    let index = partition.interior_indices[e.index()];
                    e.with_index(index)
                }),
        );

        evaluation_errors.sort_by_key(|e| e.index());
        for err in &evaluation_errors {
            log::warn!("{err}");
        }

        Ok(FieldSamples {
            points: points.clone(),
            locations: partition.locations.clone(),
            scattered,
            interior,
            total,
            report: PointReport {
                ambiguities: partition.ambiguities.clone(),
                evaluation_errors,
            },
        })
    }
}

/// `a·E + b·H`, merging the per-point errors of both
fn linear_combination(
    a: Complex64,
    e: PotentialField,
    b: Complex64,
    h: PotentialField,
) -> PotentialField {
    let values = &e.values * a + &h.values * b;
    let mut errors = e.errors;
    for err in h.errors {
        if !errors.iter().any(|known| known.index() == err.index()) {
            errors.push(err);
        }
    }
    errors.sort_by_key(|e| e.index());
    PotentialField { values, errors }
}
