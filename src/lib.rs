// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS chaos coupling pipeline
//!
//! Couples a driven chaotic oscillator to an open-system qubit model:
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ Lorenz, undriven     │   │ Lorenz, driven       │
//! │ (Dormand–Prince 5(4))│   │ A sin(2π f t) on y   │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            └────────── Var(y) ratio ──┘
//!                           │ r
//!              ┌────────────▼─────────────┐
//!              │ Lindblad qubit, H(t; r), │
//!              │ σ⁻ at rate c²/r (RK4)    │
//!              └────────────┬─────────────┘
//!                           │ ρ(t_end)
//!              ┌────────────▼─────────────┐
//!              │ Gate sequence U ρ U†     │
//!              └────────────┬─────────────┘
//!                           │
//!              ┌────────────▼─────────────┐
//!              │ Fusion score |⟨a|b⟩|²/2  │
//!              └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`chaos`]: Driven Lorenz integration and the coupling ratio
//! - [`lindblad`]: Master-equation solver and the coupling-ratio qubit model
//! - [`gates`]: Gate library and composition
//! - [`fusion`]: Overlap-based fusion score
//! - [`pipeline`]: End-to-end run and JSON export
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod chaos;
pub mod config;
pub mod error;
pub mod fusion;
pub mod gates;
pub mod linalg;
pub mod lindblad;
pub mod pipeline;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{Error, PipelineStage, Result};
pub use pipeline::{run_pipeline, PipelineExport, PipelineParams, PipelineReport};
pub use state::QuantumState;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
