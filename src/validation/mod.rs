// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for pipeline stages.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::config::ResourceLimits;
use crate::error::{Error, Result, ValidationError};
use crate::linalg::{dagger, max_abs_diff, trace_real, vector_norm};

/// Validate that a scalar parameter is finite.
pub fn validate_finite(field: &str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "is NaN".into(),
        }
        .into());
    }
    if value.is_infinite() {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "is infinite".into(),
        }
        .into());
    }
    Ok(())
}

/// Validate that a scalar parameter is finite and strictly positive.
pub fn validate_positive(field: &str, value: f64) -> Result<()> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("must be > 0, got {}", value),
        }
        .into());
    }
    Ok(())
}

/// Validate that a sample grid is finite and strictly increasing.
pub fn validate_time_grid(field: &str, times: &[f64]) -> Result<()> {
    if times.is_empty() {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "time grid is empty".into(),
        }
        .into());
    }
    for (i, t) in times.iter().enumerate() {
        if !t.is_finite() {
            return Err(ValidationError::Field {
                field: field.into(),
                message: format!("contains non-finite time at index {}", i),
            }
            .into());
        }
    }
    if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("not strictly increasing at index {}", i + 1),
        }
        .into());
    }
    Ok(())
}

/// Validate requested grid sizes against the configured limits.
pub fn validate_run_limits(
    trajectory_samples: usize,
    evolution_samples: usize,
    limits: &ResourceLimits,
) -> Result<()> {
    if trajectory_samples < 2 {
        return Err(ValidationError::Field {
            field: "chaos.num_samples".into(),
            message: "must be at least 2".into(),
        }
        .into());
    }
    if trajectory_samples > limits.max_trajectory_samples {
        return Err(ValidationError::ResourceLimit {
            resource: "chaos.num_samples".into(),
            limit: limits.max_trajectory_samples as u64,
            requested: trajectory_samples as u64,
        }
        .into());
    }
    if evolution_samples < 2 {
        return Err(ValidationError::Field {
            field: "quantum.num_samples".into(),
            message: "must be at least 2".into(),
        }
        .into());
    }
    if evolution_samples > limits.max_evolution_samples {
        return Err(ValidationError::ResourceLimit {
            resource: "quantum.num_samples".into(),
            limit: limits.max_evolution_samples as u64,
            requested: evolution_samples as u64,
        }
        .into());
    }
    Ok(())
}

/// Validate that a matrix is square and return its dimension.
pub fn validate_square(context: &str, m: &Array2<Complex64>) -> Result<usize> {
    if m.nrows() != m.ncols() {
        return Err(Error::DimensionMismatch {
            context: format!("{} (non-square)", context),
            expected: m.nrows(),
            actual: m.ncols(),
        });
    }
    Ok(m.nrows())
}

/// Validate that a state vector has unit norm.
pub fn validate_normalized(field: &str, psi: &Array1<Complex64>, tol: f64) -> Result<()> {
    let norm = vector_norm(psi);
    if !norm.is_finite() || (norm - 1.0).abs() > tol {
        return Err(ValidationError::PhysicsConstraint(format!(
            "{} is not normalized (norm = {})",
            field, norm
        ))
        .into());
    }
    Ok(())
}

/// Validate that a matrix is a plausible density matrix: square,
/// Hermitian and unit trace.
pub fn validate_density_matrix(field: &str, rho: &Array2<Complex64>, tol: f64) -> Result<()> {
    validate_square(field, rho)?;
    let trace = trace_real(rho);
    if !trace.is_finite() || (trace - 1.0).abs() > tol {
        return Err(ValidationError::PhysicsConstraint(format!(
            "{} has trace {} (expected 1)",
            field, trace
        ))
        .into());
    }
    if max_abs_diff(rho, &dagger(rho)) > tol {
        return Err(
            ValidationError::PhysicsConstraint(format!("{} is not Hermitian", field)).into(),
        );
    }
    Ok(())
}
