//! Analytic integrals of the static kernels over flat triangles
//!
//! For an observation point `r` and a flat triangle T these are closed-form
//! (Wilton et al. 1984, Graglia 1993):
//!
//! - `∫_T 1/R dy`
//! - `∫_T (y − r)/R dy`
//! - `∫_T (r − y)/R³ dy`
//!
//! They carry the singular part of the Helmholtz kernels for near and
//! coincident element pairs; the smooth remainder is left to quadrature.

use crate::core::vector::{Vec3, add, cross, dot, norm, scale, sub};

/// Projected distance below which the edge lies in the line of `r`
const EDGE_LINE_TOL: f64 = 1e-24;

/// Height below which `r` counts as lying in the triangle plane
const IN_PLANE_TOL: f64 = 1e-14;

/// Static potential integrals of one triangle at one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticIntegrals {
    /// `∫ 1/R`
    pub inverse_distance: f64,
    /// `∫ (y − r)/R`
    pub vector: Vec3,
    /// `∫ (r − y)/R³`; the in-plane principal value when `r` lies in the plane
    pub gradient: Vec3,
}

/// `ln((R⁺ + l⁺)/(R⁻ + l⁻))`, evaluated in the form without cancellation
#[inline]
fn edge_log(r_plus: f64, l_plus: f64, r_minus: f64, l_minus: f64) -> f64 {
    if l_plus + l_minus >= 0.0 {
        ((r_plus + l_plus) / (r_minus + l_minus)).ln()
    } else {
        ((r_minus - l_minus) / (r_plus - l_plus)).ln()
    }
}

/// Evaluate the static integrals of a triangle with unit normal `normal`
pub fn static_integrals(corners: &[Vec3; 3], normal: &Vec3, r: &Vec3) -> StaticIntegrals {
    let d = dot(normal, &sub(r, &corners[0]));
    let rho = sub(r, &scale(d, normal));
    let abs_d = d.abs();

    let mut inverse_distance = 0.0;
    let mut in_plane = [0.0; 3];
    let mut solid_angle = 0.0;
    let mut edge_sum = [0.0; 3];

    for i in 0..3 {
        let a = &corners[i];
        let b = &corners[(i + 1) % 3];
        let e = sub(b, a);
        let l_hat = scale(1.0 / norm(&e), &e);
        let u_hat = cross(&l_hat, normal);

        let l_minus = dot(&sub(a, &rho), &l_hat);
        let l_plus = dot(&sub(b, &rho), &l_hat);
        let p0 = dot(&sub(a, &rho), &u_hat);
        let r0_sq = p0 * p0 + d * d;
        let r_minus = norm(&sub(a, r));
        let r_plus = norm(&sub(b, r));

        if r0_sq < EDGE_LINE_TOL {
            in_plane = add(
                &in_plane,
                &scale(0.5 * (l_plus * r_plus - l_minus * r_minus), &u_hat),
            );
            continue;
        }

        let f = edge_log(r_plus, l_plus, r_minus, l_minus);
        let beta = (p0 * l_plus / (r0_sq + abs_d * r_plus)).atan()
            - (p0 * l_minus / (r0_sq + abs_d * r_minus)).atan();

        inverse_distance += p0 * f - abs_d * beta;
        in_plane = add(
            &in_plane,
            &scale(0.5 * (r0_sq * f + l_plus * r_plus - l_minus * r_minus), &u_hat),
        );
        solid_angle += beta;
        edge_sum = add(&edge_sum, &scale(f, &u_hat));
    }

    let vector = sub(&in_plane, &scale(d * inverse_distance, normal));
    let sign = if abs_d < IN_PLANE_TOL { 0.0 } else { d.signum() };
    let gradient = add(&scale(sign * solid_angle, normal), &edge_sum);

    StaticIntegrals {
        inverse_distance,
        vector,
        gradient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::barycentric;
    use approx::assert_relative_eq;

    const TRI: [Vec3; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.2, 0.9, 0.0]];
    const NORMAL: Vec3 = [0.0, 0.0, 1.0];

    /// Midpoint rule on an m × m subdivision of the triangle
    fn brute_force(r: &Vec3, m: usize) -> (f64, Vec3, Vec3) {
        let area = 0.5 * 0.9;
        let w = area / (m * m) as f64;
        let (mut i1, mut iv, mut ig) = (0.0, [0.0; 3], [0.0; 3]);
        for i in 0..m {
            for j in 0..(m - i) {
                let mut cells = vec![(
                    (i as f64 + 1.0 / 3.0) / m as f64,
                    (j as f64 + 1.0 / 3.0) / m as f64,
                )];
                if i + j + 1 < m {
                    cells.push((
                        (i as f64 + 2.0 / 3.0) / m as f64,
                        (j as f64 + 2.0 / 3.0) / m as f64,
                    ));
                }
                for (l1, l2) in cells {
                    let y = barycentric(&TRI, l1, l2);
                    let diff = sub(&y, r);
                    let dist = norm(&diff);
                    i1 += w / dist;
                    iv = add(&iv, &scale(w / dist, &diff));
                    ig = add(&ig, &scale(-w / (dist * dist * dist), &diff));
                }
            }
        }
        (i1, iv, ig)
    }

    #[test]
    fn test_matches_brute_force_off_plane() {
        let r = [0.4, 0.3, 0.35];
        let exact = static_integrals(&TRI, &NORMAL, &r);
        let (i1, iv, ig) = brute_force(&r, 200);
        assert_relative_eq!(exact.inverse_distance, i1, max_relative = 1e-4);
        for c in 0..3 {
            assert_relative_eq!(exact.vector[c], iv[c], epsilon = 1e-4);
            assert_relative_eq!(exact.gradient[c], ig[c], epsilon = 1e-3);
        }
    }

    #[test]
    fn test_matches_brute_force_outside_projection() {
        let r = [1.5, -0.6, -0.4];
        let exact = static_integrals(&TRI, &NORMAL, &r);
        let (i1, iv, ig) = brute_force(&r, 120);
        assert_relative_eq!(exact.inverse_distance, i1, max_relative = 1e-4);
        for c in 0..3 {
            assert_relative_eq!(exact.vector[c], iv[c], epsilon = 1e-4);
            assert_relative_eq!(exact.gradient[c], ig[c], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_far_point_approaches_point_source() {
        let r = [30.0, -20.0, 45.0];
        let exact = static_integrals(&TRI, &NORMAL, &r);
        let centroid = [0.4, 0.3, 0.0];
        let dist = norm(&sub(&r, &centroid));
        let area = 0.45;
        assert_relative_eq!(exact.inverse_distance, area / dist, max_relative = 1e-4);
    }

    #[test]
    fn test_point_in_triangle_is_finite() {
        // Observation point at the centroid: weakly singular integrand
        let r = [0.4, 0.3, 0.0];
        let exact = static_integrals(&TRI, &NORMAL, &r);
        assert!(exact.inverse_distance.is_finite() && exact.inverse_distance > 0.0);
        // In-plane principal value has no normal component
        assert_eq!(exact.gradient[2], 0.0);
        assert!(exact.vector.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_gradient_normal_component_is_solid_angle() {
        // Just above the centroid the triangle subtends almost 2π
        let r = [0.4, 0.3, 1e-6];
        let exact = static_integrals(&TRI, &NORMAL, &r);
        assert_relative_eq!(exact.gradient[2], 2.0 * std::f64::consts::PI, max_relative = 1e-4);
    }
}
