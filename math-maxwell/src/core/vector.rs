//! Small fixed-size vector helpers
//!
//! Geometry is carried in `[f64; 3]` and field values in `[Complex64; 3]`.
//! These helpers keep the quadrature loops free of allocations.

use num_complex::Complex64;

/// Real 3-vector
pub type Vec3 = [f64; 3];

/// Complex 3-vector
pub type CVec3 = [Complex64; 3];

/// Complex zero vector
pub const CZERO3: CVec3 = [Complex64::new(0.0, 0.0); 3];

/// Component-wise sum
#[inline]
pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Component-wise difference `a - b`
#[inline]
pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scalar multiple
#[inline]
pub fn scale(s: f64, a: &Vec3) -> Vec3 {
    [s * a[0], s * a[1], s * a[2]]
}

/// Dot product
#[inline]
pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product `a × b`
#[inline]
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length
#[inline]
pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Distance between two points
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub(a, b))
}

/// Unit vector along `a`, or `None` for a (numerically) zero vector
pub fn normalize(a: &Vec3) -> Option<Vec3> {
    let n = norm(a);
    if n > 0.0 && n.is_finite() {
        Some(scale(1.0 / n, a))
    } else {
        None
    }
}

/// Convex combination of three points with barycentric weights
#[inline]
pub fn barycentric(v: &[Vec3; 3], l1: f64, l2: f64) -> Vec3 {
    let l0 = 1.0 - l1 - l2;
    [
        l0 * v[0][0] + l1 * v[1][0] + l2 * v[2][0],
        l0 * v[0][1] + l1 * v[1][1] + l2 * v[2][1],
        l0 * v[0][2] + l1 * v[1][2] + l2 * v[2][2],
    ]
}

/// Promote a real vector with a complex factor
#[inline]
pub fn cscale(s: Complex64, a: &Vec3) -> CVec3 {
    [s * a[0], s * a[1], s * a[2]]
}

/// Complex vector sum
#[inline]
pub fn cadd(a: &CVec3, b: &CVec3) -> CVec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// In-place complex vector sum
#[inline]
pub fn cadd_assign(a: &mut CVec3, b: &CVec3) {
    a[0] += b[0];
    a[1] += b[1];
    a[2] += b[2];
}

/// Complex scalar multiple of a complex vector
#[inline]
pub fn cmul(s: Complex64, a: &CVec3) -> CVec3 {
    [s * a[0], s * a[1], s * a[2]]
}

/// Bilinear (non-conjugating) product of a complex and a real vector
#[inline]
pub fn cdot_real(a: &CVec3, b: &Vec3) -> Complex64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of a complex and a real vector
#[inline]
pub fn ccross_real(a: &CVec3, b: &Vec3) -> CVec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Sum of squared magnitudes of the components
#[inline]
pub fn intensity(a: &CVec3) -> f64 {
    a.iter().map(|c| c.norm_sqr()).sum()
}
