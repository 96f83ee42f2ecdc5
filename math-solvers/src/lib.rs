//! Dense linear solvers for boundary element systems
//!
//! Boundary integral discretizations produce dense, complex, non-Hermitian
//! matrices. This crate provides the direct solver used for them, together
//! with a cheap condition estimate so ill-posed systems are reported instead
//! of silently solved.
//!
//! # Features
//!
//! - **Direct Solvers**: LU decomposition with partial pivoting, solves with A and A^H
//! - **Diagnostics**: Hager/Higham 1-norm condition estimation
//! - **Generic Scalar Types**: Works with Complex64, Complex32, f64, f32
//!
//! # Example
//!
//! ```ignore
//! use math_audio_solvers::{lu_factorize, estimate_condition};
//!
//! let lu = lu_factorize(&matrix)?;
//! let cond = estimate_condition(&matrix, &lu)?;
//! let x = lu.solve(&rhs)?;
//! ```

pub mod direct;
pub mod traits;

pub use traits::ComplexField;

pub use direct::{
    ConditionEstimate, LuError, LuFactorization, estimate_condition, lu_factorize, lu_solve,
};
