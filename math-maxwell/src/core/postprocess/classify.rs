//! Interior / exterior classification of observation points
//!
//! Uses the generalized winding number: the solid angle subtended by the
//! closed surface, divided by 4π, is 1 inside and 0 outside. Each triangle
//! contributes its solid angle by the Van Oosterom–Strackee formula
//!
//! ```text
//! tan(Ω/2) = a·(b × c) / (|a||b||c| + (a·b)|c| + (a·c)|b| + (b·c)|a|)
//! ```
//!
//! with `a, b, c` the corners relative to the point.
//!
//! Points on the surface are interior by convention and reported as
//! [`ClassificationAmbiguity::OnSurface`]. A winding number far from an
//! integer means the mesh leaks; the point is then classified by the rounded
//! winding number and reported as [`ClassificationAmbiguity::Inconclusive`].

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::constants::PI4;
use crate::core::error::ClassificationAmbiguity;
use crate::core::mesh::TriangleMesh;
use crate::core::parallel::map_indexed;
use crate::core::types::{ClassifierConfig, Device};
use crate::core::vector::{Vec3, cross, dot, norm, sub};

/// Side of the surface a point was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLocation {
    /// Inside the closed surface, or on it
    Interior,
    /// Outside the closed surface
    Exterior,
}

impl PointLocation {
    /// True for interior points
    pub fn is_interior(self) -> bool {
        self == PointLocation::Interior
    }
}

/// A total, disjoint split of a point set
#[derive(Debug, Clone, Default)]
pub struct PointPartition {
    /// Location of every point, in input order
    pub locations: Vec<PointLocation>,
    /// Indices of interior points, ascending
    pub interior_indices: Vec<usize>,
    /// Indices of exterior points, ascending
    pub exterior_indices: Vec<usize>,
    /// Points whose classification needed a convention
    pub ambiguities: Vec<ClassificationAmbiguity>,
}

impl PointPartition {
    /// Number of classified points
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when no point was classified
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Rows of `points` that are interior
    pub fn interior_points(&self, points: &Array2<f64>) -> Array2<f64> {
        select_rows(points, &self.interior_indices)
    }

    /// Rows of `points` that are exterior
    pub fn exterior_points(&self, points: &Array2<f64>) -> Array2<f64> {
        select_rows(points, &self.exterior_indices)
    }
}

fn select_rows(points: &Array2<f64>, rows: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), points.ncols()), |(i, c)| points[[rows[i], c]])
}

/// Point-in-closed-surface test against a triangle mesh
#[derive(Debug, Clone, Copy)]
pub struct PointClassifier<'a> {
    mesh: &'a TriangleMesh,
    config: ClassifierConfig,
    device: Device,
}

impl<'a> PointClassifier<'a> {
    /// Classifier for a closed, outward-oriented mesh
    pub fn new(mesh: &'a TriangleMesh, config: ClassifierConfig) -> Self {
        Self {
            mesh,
            config,
            device: Device::default(),
        }
    }

    /// Compute backend for batch classification
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Generalized winding number of the surface around `p`
    pub fn winding_number(&self, p: &Vec3) -> f64 {
        let total: f64 = (0..self.mesh.num_triangles())
            .map(|t| {
                let [v0, v1, v2] = self.mesh.corners(t);
                solid_angle(&sub(&v0, p), &sub(&v1, p), &sub(&v2, p))
            })
            .sum();
        total / PI4
    }

    /// Classify one point; `index` labels a reported ambiguity
    pub fn locate(
        &self,
        index: usize,
        p: &Vec3,
    ) -> (PointLocation, Option<ClassificationAmbiguity>) {
        let bounds = self.mesh.bounds();
        let diagonal = bounds.diagonal();
        if !bounds
            .inflated(self.config.bbox_margin * diagonal)
            .contains(p)
        {
            return (PointLocation::Exterior, None);
        }

        let distance = self.mesh.distance_to(p);
        if distance <= self.config.surface_tolerance * diagonal {
            return (
                PointLocation::Interior,
                Some(ClassificationAmbiguity::OnSurface { index, distance }),
            );
        }

        let winding = self.winding_number(p);
        let rounded = winding.round();
        let location = if rounded != 0.0 {
            PointLocation::Interior
        } else {
            PointLocation::Exterior
        };
        if !winding.is_finite() || (winding - rounded).abs() > self.config.winding_tolerance {
            return (
                location,
                Some(ClassificationAmbiguity::Inconclusive {
                    index,
                    winding,
                    interior: location.is_interior(),
                }),
            );
        }
        (location, None)
    }

    /// Classify the rows of an `(m × 3)` point array
    pub fn classify(&self, points: &Array2<f64>) -> PointPartition {
        let located = map_indexed(points.nrows(), self.device, |i| {
            let row = points.row(i);
            self.locate(i, &[row[0], row[1], row[2]])
        });

        let mut partition = PointPartition {
            locations: Vec::with_capacity(located.len()),
            ..PointPartition::default()
        };
        for (i, (location, ambiguity)) in located.into_iter().enumerate() {
            match location {
                PointLocation::Interior => partition.interior_indices.push(i),
                PointLocation::Exterior => partition.exterior_indices.push(i),
            }
            partition.locations.push(location);
            if let Some(ambiguity) = ambiguity {
                log::warn!("{ambiguity}");
                partition.ambiguities.push(ambiguity);
            }
        }
        partition
    }
}

/// Signed solid angle of triangle `(a, b, c)` seen from the origin
fn solid_angle(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    let (la, lb, lc) = (norm(a), norm(b), norm(c));
    let numerator = dot(a, &cross(b, c));
    let denominator = la * lb * lc + dot(a, b) * lc + dot(a, c) * lb + dot(b, c) * la;
    2.0 * numerator.atan2(denominator)
}
