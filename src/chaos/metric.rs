// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Variance-based coupling ratio between a driven and an undriven run.
//!
//! ratio = Var(driven.y) / Var(baseline.y)
//!
//! Variance is the population variance (divide by N).

use ndarray::ArrayView1;
use serde::Serialize;
use tracing::info;

use super::types::Trajectory;
use crate::error::{Error, Result, ValidationError};

/// Index of the designated state component (y).
pub const COUPLING_COMPONENT: usize = 1;

/// Relative tolerance when checking that two trajectories share a grid.
const GRID_TOLERANCE: f64 = 1e-12;

/// Scalar coupling ratio plus the two variances it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CouplingRatio {
    pub ratio: f64,
    pub driven_variance: f64,
    pub baseline_variance: f64,
}

impl CouplingRatio {
    pub fn value(&self) -> f64 {
        self.ratio
    }
}

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: ArrayView1<'_, f64>) -> f64 {
    values.sum() / values.len() as f64
}

/// Population variance (two-pass). Returns NaN for an empty slice.
pub fn variance(values: ArrayView1<'_, f64>) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Compute the coupling ratio from a driven and a baseline trajectory
/// sampled on the same grid.
///
/// # Errors
/// - `DimensionMismatch` if the trajectories differ in length.
/// - `Validation` if their sample times disagree or a trajectory is empty.
/// - `DegenerateBaseline` if the baseline y-component has no spread.
pub fn coupling_ratio(driven: &Trajectory, baseline: &Trajectory) -> Result<CouplingRatio> {
    if driven.len() != baseline.len() {
        return Err(Error::DimensionMismatch {
            context: "trajectory length".into(),
            expected: baseline.len(),
            actual: driven.len(),
        });
    }
    if baseline.is_empty() {
        return Err(ValidationError::Field {
            field: "baseline".into(),
            message: "trajectory is empty".into(),
        }
        .into());
    }
    let misaligned = driven
        .times()
        .iter()
        .zip(baseline.times().iter())
        .position(|(a, b)| (a - b).abs() > GRID_TOLERANCE * a.abs().max(b.abs()).max(1.0));
    if let Some(i) = misaligned {
        return Err(ValidationError::Field {
            field: "driven.times".into(),
            message: format!("sample {} does not match the baseline grid", i),
        }
        .into());
    }

    let base_y = baseline.component(COUPLING_COMPONENT);
    let baseline_variance = variance(base_y);
    let constant = base_y.iter().all(|v| *v == base_y[0]);
    // `!(x > 0)` also catches NaN.
    if constant || !(baseline_variance > 0.0) {
        return Err(Error::DegenerateBaseline {
            variance: baseline_variance,
        });
    }

    let driven_variance = variance(driven.component(COUPLING_COMPONENT));
    let ratio = driven_variance / baseline_variance;
    if !ratio.is_finite() {
        return Err(ValidationError::PhysicsConstraint(format!(
            "coupling ratio is not finite (driven variance {})",
            driven_variance
        ))
        .into());
    }

    info!(
        ratio,
        driven_variance, baseline_variance, "Computed chaos coupling ratio"
    );

    Ok(CouplingRatio {
        ratio,
        driven_variance,
        baseline_variance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::integrate::integrate_lorenz;
    use crate::chaos::types::{DriveParameters, IntegratorOptions, TimeSpan};
    use crate::test_utils::trajectory_from_y;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_population_variance() {
        let v = array![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(v.view()), 2.5);
        // Σ(x-2.5)² / 4 = 5 / 4
        assert_relative_eq!(variance(v.view()), 1.25, epsilon = 1e-15);
    }

    #[test]
    fn test_ratio_of_known_variances() {
        let baseline = trajectory_from_y(&[1.0, -1.0, 1.0, -1.0]);
        let driven = trajectory_from_y(&[3.0, -3.0, 3.0, -3.0]);
        let r = coupling_ratio(&driven, &baseline).unwrap();
        assert_relative_eq!(r.baseline_variance, 1.0, epsilon = 1e-15);
        assert_relative_eq!(r.driven_variance, 9.0, epsilon = 1e-15);
        assert_relative_eq!(r.value(), 9.0, epsilon = 1e-15);
    }

    #[test]
    fn test_constant_driven_gives_zero_ratio() {
        let baseline = trajectory_from_y(&[1.0, 2.0, 3.0]);
        let driven = trajectory_from_y(&[5.0, 5.0, 5.0]);
        let r = coupling_ratio(&driven, &baseline).unwrap();
        assert_eq!(r.value(), 0.0);
    }

    #[test]
    fn test_constant_baseline_is_degenerate() {
        let baseline = trajectory_from_y(&[0.1, 0.1, 0.1, 0.1, 0.1]);
        let driven = trajectory_from_y(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let err = coupling_ratio(&driven, &baseline).unwrap_err();
        assert!(matches!(err, Error::DegenerateBaseline { .. }));
    }

    #[test]
    fn test_baseline_at_fixed_point_is_degenerate() {
        // The undriven system started at the origin never moves.
        let span = TimeSpan::new(0.0, 5.0, 200);
        let opts = IntegratorOptions::default();
        let params = DriveParameters::default();
        let baseline = integrate_lorenz(&params.baseline(), [0.0, 0.0, 0.0], &span, &opts).unwrap();
        let driven = integrate_lorenz(&params, [0.0, 0.0, 0.0], &span, &opts).unwrap();

        let err = coupling_ratio(&driven, &baseline).unwrap_err();
        match err {
            Error::DegenerateBaseline { variance } => assert_eq!(variance, 0.0),
            other => panic!("expected DegenerateBaseline, got {other}"),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let baseline = trajectory_from_y(&[1.0, 2.0, 3.0]);
        let driven = trajectory_from_y(&[1.0, 2.0]);
        assert!(matches!(
            coupling_ratio(&driven, &baseline),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_grid_mismatch() {
        let span_a = TimeSpan::new(0.0, 1.0, 50);
        let span_b = TimeSpan::new(0.0, 2.0, 50);
        let opts = IntegratorOptions::default();
        let params = DriveParameters::default().baseline();
        let a = integrate_lorenz(&params, [1.0, 1.0, 1.0], &span_a, &opts).unwrap();
        let b = integrate_lorenz(&params, [1.0, 1.0, 1.0], &span_b, &opts).unwrap();
        assert!(matches!(
            coupling_ratio(&a, &b),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_real_trajectories_give_finite_nonnegative_ratio() {
        let span = TimeSpan::new(0.0, 10.0, 2000);
        let opts = IntegratorOptions::default();
        let params = DriveParameters {
            amplitude: 50.0,
            frequency: 2.0,
            ..DriveParameters::default()
        };
        let baseline = integrate_lorenz(&params.baseline(), [1.0, 1.0, 1.0], &span, &opts).unwrap();
        let driven = integrate_lorenz(&params, [1.0, 1.0, 1.0], &span, &opts).unwrap();

        let r = coupling_ratio(&driven, &baseline).unwrap();
        assert!(r.value().is_finite());
        assert!(r.value() >= 0.0);
        assert!(r.baseline_variance > 0.0);
    }
}
