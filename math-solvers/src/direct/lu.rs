//! LU decomposition solver
//!
//! Dense LU factorization with partial pivoting. The factors are kept in a
//! row-major buffer so the elimination updates run over contiguous rows.
//! Besides the usual `A x = b` solve the factorization also solves the
//! conjugate-transposed system `A^H x = b`, which the condition estimator needs.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::{Float, Zero};
use thiserror::Error;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    /// A zero (or numerically vanishing) pivot was met during elimination
    #[error("Matrix is singular: vanishing pivot in column {pivot}")]
    SingularMatrix {
        /// Column in which elimination broke down
        pivot: usize,
    },
    /// Right-hand side length does not match the matrix
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Provided length
        got: usize,
    },
    /// The matrix is not square
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },
    /// The matrix contains NaN or infinite entries
    #[error("Matrix contains non-finite entries")]
    NonFinite,
}

/// LU factorization result, `P A = L U`
///
/// L is unit lower triangular and stored below the diagonal, U is stored on
/// and above it.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    lu: Vec<T>,
    perm: Vec<usize>,
    n: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Matrix dimension
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Row permutation: row `i` of `P A` is row `perm[i]` of `A`
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Combined L and U factors as a matrix
    pub fn factors(&self) -> Array2<T> {
        Array2::from_shape_fn((self.n, self.n), |(i, j)| self.lu[i * self.n + j])
    }

    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_rhs(b)?;
        let n = self.n;

        // x = P b
        let mut x: Vec<T> = self.perm.iter().map(|&p| b[p]).collect();

        // Forward substitution: Ly = Pb
        for i in 0..n {
            let row = &self.lu[i * n..i * n + i];
            let mut acc = x[i];
            for (l_ij, x_j) in row.iter().zip(&x[..i]) {
                acc -= *l_ij * *x_j;
            }
            x[i] = acc;
        }

        // Backward substitution: Ux = y
        for i in (0..n).rev() {
            let row = &self.lu[i * n..(i + 1) * n];
            let mut acc = x[i];
            for j in (i + 1)..n {
                acc -= row[j] * x[j];
            }
            x[i] = acc * row[i].inv();
        }

        Ok(Array1::from(x))
    }

    /// Solve A^H x = b (conjugate transpose) with the same factors
    ///
    /// With `P A = L U` this is `U^H L^H P x = b`.
    pub fn solve_adjoint(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_rhs(b)?;
        let n = self.n;
        let mut w: Vec<T> = b.to_vec();

        // U^H w = b, U^H is lower triangular
        for i in 0..n {
            let mut acc = w[i];
            for j in 0..i {
                acc -= self.lu[j * n + i].conj() * w[j];
            }
            w[i] = acc * self.lu[i * n + i].conj().inv();
        }

        // L^H v = w, L^H is unit upper triangular
        for i in (0..n).rev() {
            let mut acc = w[i];
            for j in (i + 1)..n {
                acc -= self.lu[j * n + i].conj() * w[j];
            }
            w[i] = acc;
        }

        // x = P^T v
        let mut x = Array1::from_elem(n, T::zero());
        for (i, &p) in self.perm.iter().enumerate() {
            x[p] = w[i];
        }
        Ok(x)
    }

    fn check_rhs(&self, b: &Array1<T>) -> Result<(), LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        Ok(())
    }
}

/// Compute LU factorization with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LuError::NotSquare { rows, cols });
    }
    let n = rows;

    // Logical row-major copy, whatever the memory layout of `a`
    let mut lu: Vec<T> = a.iter().copied().collect();
    if lu.iter().any(|v| !v.is_finite()) {
        return Err(LuError::NonFinite);
    }
    let mut perm: Vec<usize> = (0..n).collect();

    let scale = lu
        .iter()
        .map(|v| v.norm())
        .fold(T::Real::zero(), |acc, v| acc.max(v));
    let tiny = scale * T::Real::epsilon() * T::Real::epsilon();

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[k * n + k].norm();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[i * n + k].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val <= tiny {
            return Err(LuError::SingularMatrix { pivot: k });
        }

        if max_row != k {
            for j in 0..n {
                lu.swap(k * n + j, max_row * n + j);
            }
            perm.swap(k, max_row);
        }

        // Compute multipliers and eliminate
        let pivot_inv = lu[k * n + k].inv();
        let (upper, lower) = lu.split_at_mut((k + 1) * n);
        let row_k = &upper[k * n..];
        for row_i in lower.chunks_exact_mut(n) {
            let mult = row_i[k] * pivot_inv;
            row_i[k] = mult;
            if mult == T::zero() {
                continue;
            }
            for (a_ij, u_kj) in row_i[k + 1..].iter_mut().zip(&row_k[k + 1..]) {
                *a_ij -= mult * *u_kj;
            }
        }
    }

    Ok(LuFactorization { lu, perm, n })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_lu_solve_real() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0],];
        let b = array![1.0_f64, 2.0];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_lu_solve_complex() {
        let a = array![
            [Complex64::new(4.0, 1.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(3.0, -1.0)],
        ];
        let b = array![Complex64::new(1.0, 1.0), Complex64::new(2.0, -1.0)];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!((ax[i] - b[i]).norm(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_lu_cyclic_permutation() {
        // Pivoting visits rows 2, 0, 1: a three-cycle
        let a = array![[0.0_f64, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0],];
        let b = array![1.0_f64, 2.0, 3.0];

        let x = lu_solve(&a, &b).expect("permutation matrix is regular");
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-14);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[2], 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_lu_singular() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0],];
        let b = array![1.0_f64, 2.0];

        let result = lu_solve(&a, &b);
        assert!(matches!(result, Err(LuError::SingularMatrix { pivot: 1 })));
    }

    #[test]
    fn test_lu_rejects_rectangular_and_nan() {
        let rect = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            lu_factorize(&rect),
            Err(LuError::NotSquare { rows: 2, cols: 3 })
        ));

        let bad = array![[1.0_f64, f64::NAN], [0.0, 1.0]];
        assert_eq!(lu_factorize(&bad).unwrap_err(), LuError::NonFinite);
    }

    #[test]
    fn test_lu_factorize_and_solve() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0],];

        let factorization = lu_factorize(&a).expect("Factorization should succeed");

        // Solve multiple RHS
        for b in [array![1.0_f64, 2.0, 3.0], array![4.0_f64, 5.0, 6.0]] {
            let x = factorization.solve(&b).expect("Solve should succeed");
            let ax = a.dot(&x);
            for i in 0..3 {
                assert_relative_eq!(ax[i], b[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_solve_adjoint() {
        let a = array![
            [Complex64::new(1.0, 2.0), Complex64::new(3.0, 0.0), Complex64::new(0.0, 1.0)],
            [Complex64::new(4.0, -1.0), Complex64::new(0.5, 0.5), Complex64::new(2.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 1.0), Complex64::new(-3.0, 2.0)],
        ];
        let b = array![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(2.0, 3.0)
        ];

        let factorization = lu_factorize(&a).expect("Factorization should succeed");
        let x = factorization.solve_adjoint(&b).expect("Solve should succeed");

        let a_h = a.t().mapv(|v| v.conj());
        let residual = a_h.dot(&x) - &b;
        for r in residual.iter() {
            assert_relative_eq!(r.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = array![[2.0_f64, 0.0], [0.0, 2.0]];
        let factorization = lu_factorize(&a).expect("Factorization should succeed");
        let err = factorization.solve(&array![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            LuError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }
}
