// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Qubit model parameterized by the chaos coupling ratio.
//!
//! For a coupling ratio r the model is
//!
//!   H(t) = (ω/2) Z + (k / r) sin(2π f t) X
//!   L    = (c / √r) σ⁻, i.e. σ⁻ with rate c² / r
//!
//! The coupling law is kept as tunable constants in [`CouplingConstants`];
//! it is a modeling choice rather than a derived physical quantity.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::integrate::solve_lindblad;
use super::types::{
    sigma_minus, CollapseOperator, Envelope, EvolutionResult, SolverOptions,
    TimeDependentHamiltonian,
};
use crate::error::{Error, Result};
use crate::gates::{pauli_x, pauli_z};
use crate::linalg::c;
use crate::state::QuantumState;
use crate::validation::validate_finite;

/// Default end of the quantum sample grid (seconds).
pub const DEFAULT_EVOLUTION_END: f64 = 10e-6;

/// Default number of quantum samples.
pub const DEFAULT_EVOLUTION_SAMPLES: usize = 100;

/// Constants of the coupling law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingConstants {
    /// Qubit splitting ω.
    pub omega: f64,
    /// Drive coupling k; drive amplitude is k / r.
    pub drive_coupling: f64,
    /// Drive frequency in Hz.
    pub drive_frequency: f64,
    /// Relaxation coupling c; relaxation rate is c² / r.
    pub relaxation_coupling: f64,
}

impl Default for CouplingConstants {
    fn default() -> Self {
        Self {
            omega: 5.0,
            drive_coupling: 1000.0,
            drive_frequency: 528.0,
            relaxation_coupling: 1e3,
        }
    }
}

impl CouplingConstants {
    pub fn validate(&self) -> Result<()> {
        validate_finite("quantum.omega", self.omega)?;
        validate_finite("quantum.drive_coupling", self.drive_coupling)?;
        validate_finite("quantum.drive_frequency", self.drive_frequency)?;
        validate_finite("quantum.relaxation_coupling", self.relaxation_coupling)?;
        Ok(())
    }
}

/// Single-qubit open-system model built from a coupling ratio.
#[derive(Debug, Clone)]
pub struct QuantumEvolutionEngine {
    ratio: f64,
    hamiltonian: TimeDependentHamiltonian,
    collapse_ops: Vec<CollapseOperator>,
}

impl QuantumEvolutionEngine {
    /// Build the model for coupling ratio `ratio`.
    ///
    /// # Errors
    /// `InvalidCouplingRatio` if `ratio` is not finite or not > 0.
    pub fn new(ratio: f64, constants: &CouplingConstants) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(Error::InvalidCouplingRatio(ratio));
        }
        constants.validate()?;

        let drive_amplitude = constants.drive_coupling / ratio;
        let relaxation_amplitude = constants.relaxation_coupling / ratio.sqrt();

        let hamiltonian = TimeDependentHamiltonian::constant(pauli_z() * c(constants.omega / 2.0))
            .with_drive(
                pauli_x(),
                Envelope::Sinusoid {
                    amplitude: drive_amplitude,
                    frequency: constants.drive_frequency,
                    phase: 0.0,
                },
            );
        let collapse_ops = vec![CollapseOperator::from_amplitude(
            sigma_minus(),
            relaxation_amplitude,
            "relaxation",
        )?];

        Ok(Self {
            ratio,
            hamiltonian,
            collapse_ops,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn hamiltonian(&self) -> &TimeDependentHamiltonian {
        &self.hamiltonian
    }

    pub fn collapse_ops(&self) -> &[CollapseOperator] {
        &self.collapse_ops
    }

    /// Peak of the X drive coefficient, k / r.
    pub fn drive_amplitude(&self) -> f64 {
        self.hamiltonian.drives[0].envelope.peak()
    }

    /// Rate of the σ⁻ channel, c² / r.
    pub fn relaxation_rate(&self) -> f64 {
        self.collapse_ops[0].rate
    }

    /// Evolve `initial` over `times`.
    #[instrument(skip(self, initial, times, options), fields(ratio = self.ratio, samples = times.len()))]
    pub fn evolve(
        &self,
        initial: &QuantumState,
        times: &[f64],
        options: &SolverOptions,
    ) -> Result<EvolutionResult> {
        if initial.dim() != 2 {
            return Err(Error::DimensionMismatch {
                context: "initial qubit state".into(),
                expected: 2,
                actual: initial.dim(),
            });
        }
        initial.validate(options.trace_tolerance)?;
        let rho0 = initial.to_density_matrix();
        let result = solve_lindblad(&rho0, &self.hamiltonian, &self.collapse_ops, times, options)?;

        info!(
            substeps = result.substeps,
            drive_amplitude = self.drive_amplitude(),
            relaxation_rate = self.relaxation_rate(),
            "Quantum evolution complete"
        );
        Ok(result)
    }
}

/// Evenly spaced grid with the last entry pinned to `end`.
pub fn time_grid(start: f64, end: f64, samples: usize) -> Vec<f64> {
    if samples < 2 {
        return vec![start; samples];
    }
    let step = (end - start) / (samples - 1) as f64;
    let mut grid: Vec<f64> = (0..samples).map(|i| start + i as f64 * step).collect();
    grid[samples - 1] = end;
    grid
}

/// `linspace(0, 10 µs, 100)`.
pub fn default_time_grid() -> Vec<f64> {
    time_grid(0.0, DEFAULT_EVOLUTION_END, DEFAULT_EVOLUTION_SAMPLES)
}

/// ⟨X⟩(t) along an evolution.
pub fn x_expectation(result: &EvolutionResult) -> Vec<f64> {
    result.expectation(&pauli_x())
}
