// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Small dense complex-matrix helpers shared by the quantum modules.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Complex64 from a real scalar.
#[inline]
pub fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// d × d identity.
pub fn identity(d: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(d, c(1.0))
}

/// Conjugate transpose (dagger) of a matrix.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Trace of a square matrix.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    m.diag().iter().sum()
}

/// Real part of the trace.
pub fn trace_real(m: &Array2<Complex64>) -> f64 {
    trace(m).re
}

/// Purity Tr(ρ²).
pub fn purity(rho: &Array2<Complex64>) -> f64 {
    trace_real(&rho.dot(rho))
}

/// Induced 1-norm: max column sum of absolute values.
pub fn norm_1(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Largest elementwise deviation between two matrices of equal shape.
pub fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Euclidean norm of a state vector.
pub fn vector_norm(v: &Array1<Complex64>) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Inner product ⟨a|b⟩ = Σ conj(a_i) b_i.
pub fn inner(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}

/// Projector |ψ⟩⟨ψ|.
pub fn outer(psi: &Array1<Complex64>) -> Array2<Complex64> {
    let d = psi.len();
    Array2::from_shape_fn((d, d), |(i, j)| psi[i] * psi[j].conj())
}

/// True if every entry is finite.
pub fn is_finite(m: &Array2<Complex64>) -> bool {
    m.iter().all(|z| z.re.is_finite() && z.im.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dagger() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = Complex64::new(1.0, 2.0);
        m[[1, 0]] = Complex64::new(3.0, 4.0);
        let dag = dagger(&m);
        assert_eq!(dag[[0, 1]], Complex64::new(3.0, -4.0));
        assert_eq!(dag[[1, 0]], Complex64::new(1.0, -2.0));
    }

    #[test]
    fn test_trace_and_purity_of_projector() {
        let psi = Array1::from(vec![c(1.0 / 2f64.sqrt()), Complex64::new(0.0, 1.0 / 2f64.sqrt())]);
        let rho = outer(&psi);
        assert_relative_eq!(trace_real(&rho), 1.0, epsilon = 1e-12);
        assert_relative_eq!(purity(&rho), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_1() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 0]] = c(1.0);
        m[[1, 0]] = c(-2.0);
        m[[1, 1]] = c(0.5);
        assert_relative_eq!(norm_1(&m), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inner_is_conjugate_linear_in_first_argument() {
        let a = Array1::from(vec![Complex64::new(0.0, 1.0), c(0.0)]);
        let b = Array1::from(vec![c(1.0), c(0.0)]);
        assert_eq!(inner(&a, &b), Complex64::new(0.0, -1.0));
    }
}
