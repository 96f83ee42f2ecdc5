//! Direct solvers for dense linear systems
//!
//! - [`lu_factorize`] / [`lu_solve`]: LU decomposition with partial pivoting
//! - [`estimate_condition`]: 1-norm condition estimate from the LU factors

mod condition;
mod lu;

pub use condition::{ConditionEstimate, estimate_condition, estimate_inverse_norm1, norm1};
pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve};
