//! Dense direct solve of the multitrace system
//!
//! Wraps the LU factorization of `math-solvers`. Every solve is preceded by
//! a 1-norm condition estimate; a system whose reciprocal condition number
//! falls below the configured threshold is reported instead of solved.

pub use math_audio_solvers::{ConditionEstimate, LuFactorization};

use math_audio_solvers::{estimate_condition, lu_factorize};
use ndarray::s;

use crate::core::assembly::LinearSystem;
use crate::core::error::SingularSystemError;
use crate::core::space::GridFunction;

/// Solved surface unknowns
#[derive(Debug, Clone)]
pub struct MultitraceSolution {
    /// Coefficients of the tangential trace
    pub tangential: GridFunction,
    /// Coefficients of the Neumann trace
    pub neumann: GridFunction,
    /// Condition estimate of the system matrix
    pub condition: ConditionEstimate<f64>,
}

/// LU-based solver with an ill-conditioning guard
#[derive(Debug, Clone, Copy)]
pub struct LinearSolver {
    rcond_threshold: f64,
    verbose: bool,
}

impl Default for LinearSolver {
    fn default() -> Self {
        Self::new(1e-13)
    }
}

impl LinearSolver {
    /// Solver rejecting systems with `rcond < rcond_threshold`
    pub fn new(rcond_threshold: f64) -> Self {
        Self {
            rcond_threshold,
            verbose: false,
        }
    }

    /// Log the condition estimate at info level
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Rejection threshold
    pub fn rcond_threshold(&self) -> f64 {
        self.rcond_threshold
    }

    /// Solve `A x = b` and split `x` into its two traces
    pub fn solve(&self, system: &LinearSystem) -> Result<MultitraceSolution, SingularSystemError> {
        let n = system.num_dofs();
        let rhs = system
            .rhs_vector()
            .map_err(|e| SingularSystemError::InvalidSystem(e.to_string()))?;

        let lu = lu_factorize(&system.matrix)?;
        let condition = estimate_condition(&system.matrix, &lu)?;
        if self.verbose {
            log::info!(
                "System {}x{}: condition estimate {:.3e} (rcond {:.3e})",
                2 * n,
                2 * n,
                condition.condition,
                condition.rcond
            );
        } else {
            log::debug!("Condition estimate {:.3e}", condition.condition);
        }
        if condition.rcond.is_nan() || condition.rcond < self.rcond_threshold {
            return Err(SingularSystemError::IllConditioned {
                condition: condition.condition,
                rcond: condition.rcond,
                threshold: self.rcond_threshold,
            });
        }

        let x = lu.solve(&rhs)?;
        let coefficients = |block: usize| {
            GridFunction::from_coefficients(
                &system.domain,
                x.slice(s![block * n..(block + 1) * n]).to_owned(),
                system.exterior,
            )
        };
        let tangential = coefficients(0)
            .map_err(|e| SingularSystemError::InvalidSystem(e.to_string()))?;
        let neumann = coefficients(1)
            .map_err(|e| SingularSystemError::InvalidSystem(e.to_string()))?;

        Ok(MultitraceSolution {
            tangential,
            neumann,
            condition,
        })
    }
}
