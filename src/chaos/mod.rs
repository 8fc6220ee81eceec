// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Driven chaotic oscillator and the coupling metric derived from it.
//!
//! The oscillator is a Lorenz system with a sinusoidal force on the y
//! equation:
//!
//!   dx/dt = σ (y − x)
//!   dy/dt = x (ρ − z) − y + A sin(2π f t)
//!   dz/dt = x y − β z
//!
//! Running it once undriven (A = 0) and once driven gives two trajectories
//! on the same grid; the ratio of their y-variances is the coupling ratio
//! that parameterizes the qubit model in [`crate::lindblad::engine`].
//!
//! # Example
//!
//! ```ignore
//! use qubit_os_chaos::chaos::{
//!     coupling_ratio, integrate_lorenz, DriveParameters, IntegratorOptions, TimeSpan,
//! };
//!
//! let params = DriveParameters::default();
//! let span = TimeSpan::new(0.0, 50.0, 20_000);
//! let opts = IntegratorOptions::default();
//!
//! let baseline = integrate_lorenz(&params.baseline(), [1.0, 1.0, 1.0], &span, &opts)?;
//! let driven = integrate_lorenz(&params, [1.0, 1.0, 1.0], &span, &opts)?;
//! let ratio = coupling_ratio(&driven, &baseline)?;
//! ```
//!
//! # References
//!
//! - Lorenz, E. N. (1963). J. Atmos. Sci. 20, 130.
//! - Dormand, J. R. & Prince, P. J. (1980). J. Comput. Appl. Math. 6, 19.

pub mod integrate;
pub mod metric;
pub mod types;

pub use integrate::{dormand_prince, integrate_lorenz};
pub use metric::{coupling_ratio, variance, CouplingRatio};
pub use types::{DriveParameters, IntegratorOptions, TimeSpan, Trajectory};
