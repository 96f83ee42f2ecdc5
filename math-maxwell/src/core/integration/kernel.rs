//! Helmholtz kernels
//!
//! Green's function `G(R) = exp(ikR) / (4πR)` and its gradient factor
//! `g₁(R)` with `∇ₓG = (x − y) g₁(R)`. The `regular` variants subtract the
//! static singularity (`1/(4πR)` and `−1/(4πR³)` respectively); the removed
//! parts are integrated analytically by [`super::singular`].

use num_complex::Complex64;

use crate::core::constants::{GRADIENT_SERIES_THRESHOLD, GREEN_SERIES_THRESHOLD, PI4};

/// Helmholtz kernel for one wavenumber
#[derive(Debug, Clone, Copy)]
pub struct HelmholtzKernel {
    k: f64,
    ik: Complex64,
}

impl HelmholtzKernel {
    /// Kernel with wavenumber `k`
    pub fn new(k: f64) -> Self {
        Self {
            k,
            ik: Complex64::new(0.0, k),
        }
    }

    /// Wavenumber
    pub fn wavenumber(&self) -> f64 {
        self.k
    }

    /// `i k`
    pub fn ik(&self) -> Complex64 {
        self.ik
    }

    /// `G(R) = exp(ikR) / (4πR)`
    #[inline]
    pub fn green(&self, r: f64) -> Complex64 {
        (self.ik * r).exp() / (PI4 * r)
    }

    /// `G(R) − 1/(4πR) = (exp(ikR) − 1) / (4πR)`, finite at R = 0
    #[inline]
    pub fn green_regular(&self, r: f64) -> Complex64 {
        let kr = self.k * r;
        if kr.abs() < GREEN_SERIES_THRESHOLD {
            (self.ik - 0.5 * self.k * kr) / PI4
        } else {
            ((self.ik * r).exp() - 1.0) / (PI4 * r)
        }
    }

    /// `g₁(R) = (ikR − 1) exp(ikR) / (4πR³)`
    #[inline]
    pub fn gradient_factor(&self, r: f64) -> Complex64 {
        let ikr = self.ik * r;
        (ikr - 1.0) * ikr.exp() / (PI4 * r * r * r)
    }

    /// `g₁(R) + 1/(4πR³)`, behaves like `−k²/(8πR)` at small R
    #[inline]
    pub fn gradient_factor_regular(&self, r: f64) -> Complex64 {
        let kr = self.k * r;
        if kr.abs() < GRADIENT_SERIES_THRESHOLD {
            let lead = -self.k * self.k / (2.0 * PI4 * r);
            lead * Complex64::new(1.0, 2.0 * kr / 3.0)
        } else {
            let ikr = self.ik * r;
            ((ikr - 1.0) * ikr.exp() + 1.0) / (PI4 * r * r * r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_green_static_limit() {
        let kernel = HelmholtzKernel::new(1e-9);
        let g = kernel.green(2.0);
        assert_relative_eq!(g.re, 1.0 / (PI4 * 2.0), max_relative = 1e-12);
    }

    #[test]
    fn test_regular_parts_are_continuous_across_series_switch() {
        let kernel = HelmholtzKernel::new(3.0);
        for threshold in [GREEN_SERIES_THRESHOLD, GRADIENT_SERIES_THRESHOLD] {
            let r = threshold / 3.0;
            let below = r * (1.0 - 1e-9);
            let above = r * (1.0 + 1e-9);
            let dg = kernel.green_regular(below) - kernel.green_regular(above);
            assert!(dg.norm() < 1e-8 * kernel.green_regular(above).norm());
        }
        let r = GRADIENT_SERIES_THRESHOLD / 3.0;
        let a = kernel.gradient_factor_regular(r * (1.0 - 1e-9));
        let b = kernel.gradient_factor_regular(r * (1.0 + 1e-9));
        assert!((a - b).norm() < 1e-5 * b.norm());
    }

    #[test]
    fn test_regular_matches_full_minus_static() {
        let kernel = HelmholtzKernel::new(2.0);
        let r = 0.7;
        let g = kernel.green(r) - 1.0 / (PI4 * r);
        assert_relative_eq!((kernel.green_regular(r) - g).norm(), 0.0, epsilon = 1e-14);
        let g1 = kernel.gradient_factor(r) + 1.0 / (PI4 * r * r * r);
        assert_relative_eq!(
            (kernel.gradient_factor_regular(r) - g1).norm(),
            0.0,
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_green_regular_at_zero() {
        let kernel = HelmholtzKernel::new(2.0);
        let g0 = kernel.green_regular(0.0);
        assert_relative_eq!(g0.im, 2.0 / PI4, epsilon = 1e-15);
        assert_relative_eq!(g0.re, 0.0, epsilon = 1e-15);
    }
}
