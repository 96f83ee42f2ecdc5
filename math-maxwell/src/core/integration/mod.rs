//! Numerical integration
//!
//! - `gauss`: symmetric triangle rules
//! - `kernel`: Helmholtz Green's function and its gradient, with regularized forms
//! - `singular`: analytic integrals of the static kernels over flat triangles

pub mod gauss;
pub mod kernel;
pub mod singular;

pub use gauss::{TriangleRule, triangle_rule};
pub use kernel::HelmholtzKernel;
pub use singular::{StaticIntegrals, static_integrals};
