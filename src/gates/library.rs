// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Standard single-qubit gates.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use ndarray::{array, Array2};
use num_complex::Complex64;

use crate::linalg::c;

pub use crate::linalg::identity;

/// Hadamard: 1/√2 [[1, 1], [1, -1]].
pub fn hadamard() -> Array2<Complex64> {
    let a = c(FRAC_1_SQRT_2);
    array![[a, a], [a, -a]]
}

/// Pauli X.
pub fn pauli_x() -> Array2<Complex64> {
    array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]]
}

/// Pauli Y.
pub fn pauli_y() -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);
    array![[c(0.0), -i], [i, c(0.0)]]
}

/// Pauli Z.
pub fn pauli_z() -> Array2<Complex64> {
    array![[c(1.0), c(0.0)], [c(0.0), c(-1.0)]]
}

/// Phase gate diag(1, e^{iθ}).
pub fn phase(theta: f64) -> Array2<Complex64> {
    array![[c(1.0), c(0.0)], [c(0.0), Complex64::from_polar(1.0, theta)]]
}

/// The ten-gate reference list, in application order:
/// H, X, Y, Z, P(π/2), P(π/4), P(−π/2), P(−π/4), X·P(π/4), Y·P(π/2).
pub fn reference_sequence() -> Vec<Array2<Complex64>> {
    vec![
        hadamard(),
        pauli_x(),
        pauli_y(),
        pauli_z(),
        phase(FRAC_PI_2),
        phase(FRAC_PI_4),
        phase(-FRAC_PI_2),
        phase(-FRAC_PI_4),
        pauli_x().dot(&phase(FRAC_PI_4)),
        pauli_y().dot(&phase(FRAC_PI_2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::is_unitary;
    use crate::test_utils::assert_matrix_close;

    #[test]
    fn test_all_library_gates_are_unitary() {
        for g in reference_sequence() {
            assert!(is_unitary(&g, 1e-12));
        }
        assert!(is_unitary(&identity(3), 0.0));
    }

    #[test]
    fn test_pauli_algebra() {
        // XY = iZ
        let i = Complex64::new(0.0, 1.0);
        assert_matrix_close(&pauli_x().dot(&pauli_y()), &(pauli_z() * i), 1e-15);
        // H X H = Z
        let hxh = hadamard().dot(&pauli_x()).dot(&hadamard());
        assert_matrix_close(&hxh, &pauli_z(), 1e-12);
    }

    #[test]
    fn test_phase_gate() {
        assert_matrix_close(&phase(std::f64::consts::PI), &pauli_z(), 1e-15);
        let s = phase(FRAC_PI_2);
        assert_matrix_close(&s.dot(&s), &pauli_z(), 1e-15);
        assert_matrix_close(&phase(0.0), &identity(2), 1e-15);
    }

    #[test]
    fn test_reference_sequence_shape() {
        let seq = reference_sequence();
        assert_eq!(seq.len(), 10);
        // X·P(π/4) maps |1⟩ to e^{iπ/4}|0⟩
        let g = &seq[8];
        assert_eq!(g[[1, 1]], c(0.0));
        assert!((g[[0, 1]] - Complex64::from_polar(1.0, FRAC_PI_4)).norm() < 1e-15);
    }
}
