// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Right-hand side of the master equation used by the RK4 stages in
//! [`super::integrate`].
//!
//! The generator is evaluated once per RK4 stage with the Hamiltonian
//! already sampled at that stage time, so nothing here depends on t.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use ndarray::Array2;
use num_complex::Complex64;

use super::types::CollapseOperator;
use crate::linalg::{c, dagger};

/// Contribution of one (operator, rate) channel:
/// γ (L ρ L† − ½{L†L, ρ}).
///
/// A zero-rate channel contributes nothing and skips the products.
pub fn dissipator(op: &CollapseOperator, rho: &Array2<Complex64>) -> Array2<Complex64> {
    if op.rate == 0.0 {
        return Array2::zeros(rho.raw_dim());
    }

    let l = &op.matrix;
    let l_dag = dagger(l);
    let jump = l.dot(rho).dot(&l_dag);
    let anticommutator = anticommutator(&l_dag.dot(l), rho);

    (jump - anticommutator * c(0.5)) * c(op.rate)
}

/// Sum of [`dissipator`] over every channel of the model.
///
/// Channel dimensions are checked by `solve_lindblad` before the first
/// stage, so a mismatch here is a caller bug and panics in `ndarray`.
pub fn total_dissipator(
    collapse_ops: &[CollapseOperator],
    rho: &Array2<Complex64>,
) -> Array2<Complex64> {
    collapse_ops
        .iter()
        .fold(Array2::zeros(rho.raw_dim()), |acc, op| acc + dissipator(op, rho))
}

/// dρ/dt = −i[H, ρ] + Σ_k D[L_k](ρ) for a Hamiltonian sampled at one stage
/// time.
pub fn lindblad_rhs(
    hamiltonian: &Array2<Complex64>,
    collapse_ops: &[CollapseOperator],
    rho: &Array2<Complex64>,
) -> Array2<Complex64> {
    let minus_i = Complex64::new(0.0, -1.0);
    commutator(hamiltonian, rho) * minus_i + total_dissipator(collapse_ops, rho)
}

#[inline]
fn commutator(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    a.dot(b) - b.dot(a)
}

#[inline]
fn anticommutator(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    a.dot(b) + b.dot(a)
}
