//! Symmetric quadrature rules on triangles
//!
//! Rules are stored in barycentric form with weights summing to one, so a
//! physical integral is `area * Σ w_i f(x_i)`.

use crate::core::error::AssemblyError;
use crate::core::vector::{Vec3, barycentric};

/// Quadrature rule on the reference triangle
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleRule {
    /// Barycentric coordinates (λ1, λ2) of each point; λ0 = 1 - λ1 - λ2
    pub points: Vec<(f64, f64)>,
    /// Weights (summing to 1)
    pub weights: Vec<f64>,
}

impl TriangleRule {
    /// Number of points
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True for an empty rule
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Physical points and area-scaled weights on a triangle
    pub fn map_to(&self, corners: &[Vec3; 3], area: f64) -> Vec<(Vec3, f64)> {
        self.points
            .iter()
            .zip(&self.weights)
            .map(|(&(l1, l2), &w)| (barycentric(corners, l1, l2), w * area))
            .collect()
    }
}

/// Triangle rule with the given number of points (1, 4, 7 or 13)
///
/// Exact for polynomials of degree 1, 3, 5 and 7 respectively.
pub fn triangle_rule(points: usize) -> Result<TriangleRule, AssemblyError> {
    let table: &[[f64; 3]] = match points {
        1 => &GAUCORWEI_TR1,
        4 => &GAUCORWEI_TR4,
        7 => &GAUCORWEI_TR7,
        13 => &GAUCORWEI_TR13,
        _ => return Err(AssemblyError::UnsupportedQuadrature { points }),
    };
    Ok(TriangleRule {
        points: table.iter().map(|&[x, y, _]| (x, y)).collect(),
        weights: table.iter().map(|&[_, _, w]| w).collect(),
    })
}

// Triangle quadrature rules
// Format: [xi, eta, weight]

static GAUCORWEI_TR1: [[f64; 3]; 1] = [[0.333333333333333, 0.333333333333333, 1.0]];

static GAUCORWEI_TR4: [[f64; 3]; 4] = [
    [0.333333333333333, 0.333333333333333, -0.5625],
    [0.6, 0.2, 0.520833333333333],
    [0.2, 0.6, 0.520833333333333],
    [0.2, 0.2, 0.520833333333333],
];

static GAUCORWEI_TR7: [[f64; 3]; 7] = [
    [0.333333333333333, 0.333333333333333, 0.225],
    [0.797426985353087, 0.101286507323456, 0.125939180544827],
    [0.101286507323456, 0.797426985353087, 0.125939180544827],
    [0.101286507323456, 0.101286507323456, 0.125939180544827],
    [0.470142064105115, 0.059715871789770, 0.132394152788506],
    [0.059715871789770, 0.470142064105115, 0.132394152788506],
    [0.470142064105115, 0.470142064105115, 0.132394152788506],
];

static GAUCORWEI_TR13: [[f64; 3]; 13] = [
    [0.333333333333333, 0.333333333333333, -0.149570044467682],
    [0.260345966079040, 0.260345966079040, 0.175615257433208],
    [0.260345966079040, 0.479308067841920, 0.175615257433208],
    [0.479308067841920, 0.260345966079040, 0.175615257433208],
    [0.065130102902216, 0.065130102902216, 0.053347235608838],
    [0.065130102902216, 0.869739794195568, 0.053347235608838],
    [0.869739794195568, 0.065130102902216, 0.053347235608838],
    [0.638444188569810, 0.048690315425316, 0.077113760890257],
    [0.048690315425316, 0.638444188569810, 0.077113760890257],
    [0.638444188569810, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.638444188569810, 0.077113760890257],
    [0.048690315425316, 0.312865496004874, 0.077113760890257],
    [0.312865496004874, 0.048690315425316, 0.077113760890257],
];
