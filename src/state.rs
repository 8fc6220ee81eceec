// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum state representations shared by the evolution, gate and fusion
//! stages.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::linalg::{c, outer};
use crate::validation::{validate_density_matrix, validate_normalized};

/// A pure state vector or a density matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumState {
    /// Normalized amplitude vector |ψ⟩.
    Pure(Array1<Complex64>),
    /// Trace-1 Hermitian positive-semidefinite ρ.
    Mixed(Array2<Complex64>),
}

impl QuantumState {
    /// Computational basis state |k⟩ in dimension `d`.
    pub fn basis(d: usize, k: usize) -> Result<Self> {
        Ok(Self::Pure(basis_vector(d, k)?))
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        match self {
            Self::Pure(psi) => psi.len(),
            Self::Mixed(rho) => rho.nrows(),
        }
    }

    /// ρ = |ψ⟩⟨ψ| for pure states, a copy otherwise.
    pub fn to_density_matrix(&self) -> Array2<Complex64> {
        match self {
            Self::Pure(psi) => outer(psi),
            Self::Mixed(rho) => rho.clone(),
        }
    }

    /// Measurement probabilities in the computational basis.
    pub fn probabilities(&self) -> Vec<f64> {
        match self {
            Self::Pure(psi) => psi.iter().map(|z| z.norm_sqr()).collect(),
            Self::Mixed(rho) => rho.diag().iter().map(|z| z.re).collect(),
        }
    }

    /// Check normalization (pure) or trace/Hermiticity (mixed).
    pub fn validate(&self, tol: f64) -> Result<()> {
        match self {
            Self::Pure(psi) => validate_normalized("state", psi, tol),
            Self::Mixed(rho) => validate_density_matrix("state", rho, tol),
        }
    }
}

/// Basis vector |k⟩ in dimension `d`.
pub fn basis_vector(d: usize, k: usize) -> Result<Array1<Complex64>> {
    if k >= d {
        return Err(Error::DimensionMismatch {
            context: "basis state index".into(),
            expected: d,
            actual: k,
        });
    }
    let mut v = Array1::zeros(d);
    v[k] = c(1.0);
    Ok(v)
}

/// Bell state |Φ+⟩ = (|00⟩ + |11⟩)/√2.
pub fn bell_phi_plus() -> Array1<Complex64> {
    let a = c(std::f64::consts::FRAC_1_SQRT_2);
    Array1::from(vec![a, c(0.0), c(0.0), a])
}
