//! Boundary operator assembly
//!
//! - [`dense`] - Galerkin assembly of the electric and magnetic boundary
//!   operators into dense O(N²) blocks
//! - [`multitrace`] - per-medium multitrace operators, their sum and the
//!   linear system with the incident-field right-hand side
//!
//! Assemblers sit behind [`OperatorAssembler`], so a compressed backend can
//! replace [`DenseAssembler`] without touching the system builder or the
//! linear solver.

pub mod dense;
pub mod multitrace;

pub use dense::DenseAssembler;
pub use multitrace::{LinearSystem, MultitraceOperator, MultitraceSystemBuilder};

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::error::AssemblyError;
use crate::core::space::MultitraceSpaces;

/// Electric and magnetic boundary operators of one wavenumber
#[derive(Debug, Clone)]
pub struct OperatorBlocks {
    /// Wavenumber the blocks were assembled for
    pub wavenumber: f64,
    /// Electric-field operator, `N × N`
    pub electric: Array2<Complex64>,
    /// Magnetic-field operator, `N × N`
    pub magnetic: Array2<Complex64>,
}

impl OperatorBlocks {
    /// Number of degrees of freedom
    pub fn num_dofs(&self) -> usize {
        self.electric.nrows()
    }
}

/// Produces the electric and magnetic operator blocks on a set of spaces
pub trait OperatorAssembler: Sync {
    /// Short backend name for logging
    fn name(&self) -> &'static str;

    /// Assemble both operators for wavenumber `k`
    fn assemble(
        &self,
        spaces: &MultitraceSpaces,
        wavenumber: f64,
    ) -> Result<OperatorBlocks, AssemblyError>;
}
