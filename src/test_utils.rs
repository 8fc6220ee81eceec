// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::chaos::Trajectory;
use crate::lindblad::types::sigma_minus;
use crate::lindblad::CollapseOperator;
use crate::linalg::c;

/// Trajectory on the grid 0, 1, …, n−1 whose y-component is `y` and whose
/// x and z components are zero.
pub fn trajectory_from_y(y: &[f64]) -> Trajectory {
    let n = y.len();
    let times = Array1::from_shape_fn(n, |i| i as f64);
    let mut states = Array2::zeros((n, 3));
    for (i, v) in y.iter().enumerate() {
        states[[i, 1]] = *v;
    }
    Trajectory::from_samples(times, states).unwrap()
}

/// Elementwise comparison of two complex matrices.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff < tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// ρ = |0⟩⟨0|
pub fn ground_rho() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = c(1.0);
    m
}

/// ρ = |1⟩⟨1|
pub fn excited_rho() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[1, 1]] = c(1.0);
    m
}

/// ρ = |+⟩⟨+| = ½(I + σx)
pub fn plus_rho() -> Array2<Complex64> {
    Array2::from_elem((2, 2), c(0.5))
}

/// σ⁻ channel with rate γ.
pub fn relaxation(rate: f64) -> CollapseOperator {
    CollapseOperator::new(sigma_minus(), rate, "relaxation").unwrap()
}
