// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation solver for open quantum systems.
//!
//! Implements the Gorini–Kossakowski–Sudarshan–Lindblad (GKSL) master equation:
//!
//!   dρ/dt = -i[H(t), ρ] + Σ_k γ_k (L_k ρ L_k† − ½{L_k†L_k, ρ})
//!
//! This module provides:
//! - Time-dependent Hamiltonians built from a static term and enveloped drives
//! - Collapse operators as explicit (operator, rate) pairs
//! - RK4 integrator with a generator-norm substep rule and a substep budget
//! - The coupling-ratio qubit model in [`engine`]
//!
//! # Example
//!
//! ```ignore
//! use qubit_os_chaos::lindblad::{default_time_grid, CouplingConstants, QuantumEvolutionEngine, SolverOptions};
//! use qubit_os_chaos::state::QuantumState;
//!
//! let engine = QuantumEvolutionEngine::new(ratio, &CouplingConstants::default())?;
//! let result = engine.evolve(
//!     &QuantumState::basis(2, 0)?,
//!     &default_time_grid(),
//!     &SolverOptions::default(),
//! )?;
//! println!("Final purity: {:.4}", result.purities().last().unwrap());
//! ```
//!
//! # References
//!
//! - Lindblad, G. (1976). Commun. Math. Phys. 48, 119.
//!   DOI: 10.1007/BF01608499
//! - Gorini, V., Kossakowski, A., & Sudarshan, E. C. G. (1976). J. Math. Phys. 17, 821.
//!   DOI: 10.1063/1.522979
//! - Breuer, H.-P. & Petruccione, F. (2002). "The Theory of Open Quantum Systems." Oxford.

pub mod dissipator;
pub mod engine;
pub mod integrate;
pub mod types;

pub use engine::{default_time_grid, x_expectation, CouplingConstants, QuantumEvolutionEngine};
pub use integrate::{solve_lindblad, state_fidelity, trace_distance};
pub use types::{
    CollapseOperator, DriveTerm, Envelope, EvolutionResult, SolverOptions,
    TimeDependentHamiltonian,
};
