// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Overlap-based fusion score between two state vectors.
//!
//!   fusion(a, b) = |⟨a|b⟩|² / 2
//!
//! For normalized inputs the score lies in [0, 0.5]: 0 for orthogonal states,
//! 0.5 for states equal up to a global phase.

use ndarray::Array1;
use num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result, ValidationError};
use crate::linalg::inner;
use crate::validation::validate_normalized;

pub use crate::state::{basis_vector as basis_state, bell_phi_plus};

/// Allowed deviation of ‖ψ‖ from 1.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Upper end of the score range.
pub const MAX_FUSION_STRENGTH: f64 = 0.5;

/// Fusion strength |⟨a|b⟩|² / 2.
///
/// # Errors
/// - `DimensionMismatch` if `a` and `b` differ in length.
/// - `Validation` if either input is not unit-norm, or the score falls
///   outside [0, 0.5].
pub fn fusion_strength(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            context: "fusion inputs".into(),
            expected: a.len(),
            actual: b.len(),
        });
    }
    validate_normalized("fusion input a", a, NORMALIZATION_TOLERANCE)?;
    validate_normalized("fusion input b", b, NORMALIZATION_TOLERANCE)?;

    let score = inner(a, b).norm_sqr() / 2.0;
    // Inputs within tolerance of unit norm can overshoot by the same amount.
    let slack = 2.0 * NORMALIZATION_TOLERANCE;
    if !(score >= 0.0 && score <= MAX_FUSION_STRENGTH + slack) {
        return Err(ValidationError::PhysicsConstraint(format!(
            "fusion strength {} outside [0, {}]",
            score, MAX_FUSION_STRENGTH
        ))
        .into());
    }

    debug!(score, dim = a.len(), "Computed fusion strength");
    Ok(score.min(MAX_FUSION_STRENGTH))
}
