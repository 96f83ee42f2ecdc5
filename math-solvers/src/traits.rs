//! Scalar abstraction shared by the dense solvers
//!
//! [`ComplexField`] lets the LU factorization and the condition estimator run
//! on real and complex matrices alike.

use num_complex::{Complex32, Complex64};
use num_traits::{Float, FromPrimitive, NumAssign, One, Zero};
use std::fmt::Debug;
use std::ops::Neg;

/// Trait for scalar types that can be used in dense factorizations.
///
/// Provided for `Complex64`, `Complex32`, `f64` and `f32`.
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// The real number type underlying this field
    type Real: Float + NumAssign + FromPrimitive + Send + Sync + Debug + 'static;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Create from a real value
    fn from_real(r: Self::Real) -> Self;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;

    /// z / |z|, or one when z is zero
    fn unit_phase(&self) -> Self {
        let n = self.norm();
        if n == Self::Real::zero() {
            Self::one()
        } else {
            *self * Self::from_real(n.recip())
        }
    }

    /// True when every component is finite
    fn is_finite(&self) -> bool {
        self.norm_sqr().is_finite()
    }
}

impl ComplexField for Complex64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    fn inv(&self) -> Self {
        let denom = self.norm_sqr();
        Complex64::new(self.re / denom, -self.im / denom)
    }
}

impl ComplexField for Complex32 {
    type Real = f32;

    #[inline]
    fn conj(&self) -> Self {
        Complex32::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        Complex32::new(r, 0.0)
    }

    #[inline]
    fn re(&self) -> f32 {
        self.re
    }

    #[inline]
    fn inv(&self) -> Self {
        let denom = self.norm_sqr();
        Complex32::new(self.re / denom, -self.im / denom)
    }
}

impl ComplexField for f64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn re(&self) -> f64 {
        *self
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

impl ComplexField for f32 {
    type Real = f32;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f32 {
        *self * *self
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        r
    }

    #[inline]
    fn re(&self) -> f32 {
        *self
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_complex64_field() {
        let z = Complex64::new(3.0, 4.0);
        assert_relative_eq!(ComplexField::norm_sqr(&z), 25.0);
        assert_relative_eq!(ComplexField::norm(&z), 5.0);
        assert_eq!(ComplexField::conj(&z), Complex64::new(3.0, -4.0));

        let w = ComplexField::inv(&z) * z;
        assert_relative_eq!(w.re, 1.0, epsilon = 1e-14);
        assert_relative_eq!(w.im, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_unit_phase() {
        let z = Complex64::new(3.0, 4.0);
        let u = z.unit_phase();
        assert_relative_eq!(u.re, 0.6, epsilon = 1e-14);
        assert_relative_eq!(u.im, 0.8, epsilon = 1e-14);

        assert_eq!(0.0_f64.unit_phase(), 1.0);
        assert_eq!((-2.5_f64).unit_phase(), -1.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Complex64::new(1.0, -2.0).is_finite());
        assert!(!Complex64::new(f64::NAN, 0.0).is_finite());
        assert!(!f64::INFINITY.is_finite());
    }
}
