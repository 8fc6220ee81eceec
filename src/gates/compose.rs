// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gate composition and application.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result, ValidationError};
use crate::linalg::{dagger, identity, max_abs_diff};
use crate::state::QuantumState;
use crate::validation::validate_square;

/// Product of a gate list plus how many gates went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct NetUnitary {
    matrix: Array2<Complex64>,
    gate_count: usize,
}

impl NetUnitary {
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// U|ψ⟩ for pure states, U ρ U† for density matrices.
    pub fn apply(&self, state: &QuantumState) -> Result<QuantumState> {
        if state.dim() != self.dim() {
            return Err(Error::DimensionMismatch {
                context: "unitary application".into(),
                expected: self.dim(),
                actual: state.dim(),
            });
        }
        Ok(match state {
            QuantumState::Pure(psi) => QuantumState::Pure(self.matrix.dot(psi)),
            QuantumState::Mixed(rho) => {
                QuantumState::Mixed(self.matrix.dot(rho).dot(&dagger(&self.matrix)))
            }
        })
    }
}

/// Compose gates given in application order: U = g_{M−1} ⋯ g_1 g_0.
///
/// # Errors
/// - `Validation` for an empty list.
/// - `DimensionMismatch` for non-square gates or gates of different sizes.
pub fn compose(gates: &[Array2<Complex64>]) -> Result<NetUnitary> {
    let first = gates.first().ok_or_else(|| ValidationError::Field {
        field: "gates".into(),
        message: "gate list is empty".into(),
    })?;
    let d = validate_square("gate 0", first)?;

    let mut matrix = first.clone();
    for (i, g) in gates.iter().enumerate().skip(1) {
        let gd = validate_square(&format!("gate {i}"), g)?;
        if gd != d {
            return Err(Error::DimensionMismatch {
                context: format!("gate {i}"),
                expected: d,
                actual: gd,
            });
        }
        matrix = g.dot(&matrix);
    }

    debug!(gates = gates.len(), dim = d, "Composed gate sequence");
    Ok(NetUnitary {
        matrix,
        gate_count: gates.len(),
    })
}

/// ‖U U† − I‖_max ≤ tol. Non-square matrices are never unitary.
pub fn is_unitary(u: &Array2<Complex64>, tol: f64) -> bool {
    if u.nrows() != u.ncols() {
        return false;
    }
    max_abs_diff(&u.dot(&dagger(u)), &identity(u.nrows())) <= tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::library::{hadamard, pauli_x, pauli_y, pauli_z, phase, reference_sequence};
    use crate::linalg::c;
    use crate::test_utils::assert_matrix_close;
    use ndarray::Array1;

    #[test]
    fn test_single_gate_returned_unchanged() {
        let h = hadamard();
        let net = compose(std::slice::from_ref(&h)).unwrap();
        assert_eq!(net.matrix(), &h);
        assert_eq!(net.gate_count(), 1);
    }

    #[test]
    fn test_first_gate_is_rightmost_factor() {
        // Apply H then Z: U = Z H
        let net = compose(&[hadamard(), pauli_z()]).unwrap();
        assert_matrix_close(net.matrix(), &pauli_z().dot(&hadamard()), 1e-15);
        // Not H Z
        assert!(max_abs_diff(net.matrix(), &hadamard().dot(&pauli_z())) > 0.1);
    }

    #[test]
    fn test_reference_sequence_is_unitary() {
        let net = compose(&reference_sequence()).unwrap();
        assert_eq!(net.gate_count(), 10);
        assert_eq!(net.dim(), 2);
        assert!(is_unitary(net.matrix(), 1e-9));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(compose(&[]), Err(Error::Validation(_))));
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let err = compose(&[pauli_x(), identity(3)]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        let err = compose(&[Array2::zeros((2, 3))]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_is_unitary_rejects_non_unitary() {
        let mut m = pauli_x();
        m[[0, 0]] = c(0.5);
        assert!(!is_unitary(&m, 1e-9));
        assert!(!is_unitary(&Array2::zeros((2, 3)), 1e-9));
    }

    #[test]
    fn test_apply_pure_and_mixed_agree() {
        let net = compose(&[hadamard(), phase(0.3), pauli_y()]).unwrap();
        let psi = QuantumState::basis(2, 0).unwrap();
        let rho = QuantumState::Mixed(psi.to_density_matrix());

        let pure_out = net.apply(&psi).unwrap();
        let mixed_out = net.apply(&rho).unwrap();
        assert_matrix_close(
            &pure_out.to_density_matrix(),
            &mixed_out.to_density_matrix(),
            1e-12,
        );
    }

    #[test]
    fn test_apply_x_flips_basis_state() {
        let net = compose(&[pauli_x()]).unwrap();
        let out = net.apply(&QuantumState::basis(2, 0).unwrap()).unwrap();
        assert_eq!(out, QuantumState::Pure(Array1::from(vec![c(0.0), c(1.0)])));
    }

    #[test]
    fn test_apply_dimension_mismatch() {
        let net = compose(&[pauli_x()]).unwrap();
        let err = net.apply(&QuantumState::basis(4, 0).unwrap()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
