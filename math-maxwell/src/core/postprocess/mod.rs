//! Field evaluation away from the surface
//!
//! - [`classify`] - interior/exterior partition of observation points
//! - [`potential`] - electric and magnetic potential operators
//! - [`field`] - scattered, interior and total fields with per-point reports
//! - [`grid`] - planar observation grids and image reshaping

pub mod classify;
pub mod field;
pub mod grid;
pub mod potential;

pub use classify::{PointClassifier, PointLocation, PointPartition};
pub use field::{FieldCombiner, FieldSamples, PointReport, intensity};
pub use grid::ObservationGrid;
pub use potential::{PotentialEvaluator, PotentialField, PotentialKind};
