// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Adaptive Dormand–Prince 5(4) integrator for three-dimensional systems.
//!
//! Steps are accepted when the RMS of the embedded 4th-order error estimate,
//! scaled by `atol + rtol·max(|y_old|, |y_new|)`, is ≤ 1. The solution is
//! reported on a fixed grid by cubic Hermite interpolation inside each
//! accepted step (FSAL gives the derivative at both ends for free).
//!
//! Ref: Dormand & Prince (1980), J. Comput. Appl. Math. 6, 19.
//! Ref: Hairer, Nørsett & Wanner, "Solving ODEs I" (1993), §II.4 (step-size
//! selection and starting step).

use ndarray::Array2;
use tracing::debug;

use super::types::{DriveParameters, IntegratorOptions, TimeSpan, Trajectory};
use crate::error::{IntegrationError, Result};
use crate::validation::validate_finite;

type State = [f64; 3];

// Butcher tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of the tableau, hence FSAL).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b − b̂ (5th minus embedded 4th order).
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Integrate the driven Lorenz system and sample it on `span`'s grid.
///
/// # Errors
/// - `Validation` for non-finite parameters, a bad span or bad tolerances.
/// - `Integration` if the solver underflows its step size, exhausts
///   `options.max_steps`, or the state stops being finite.
pub fn integrate_lorenz(
    params: &DriveParameters,
    initial: [f64; 3],
    span: &TimeSpan,
    options: &IntegratorOptions,
) -> Result<Trajectory> {
    params.validate()?;
    let trajectory = dormand_prince(|t, y| params.derivative(t, y), initial, span, options)?;
    debug!(
        amplitude = params.amplitude,
        frequency = params.frequency,
        accepted = trajectory.accepted_steps(),
        rejected = trajectory.rejected_steps(),
        "Lorenz integration complete"
    );
    Ok(trajectory)
}

/// Integrate an arbitrary three-dimensional system `dy/dt = rhs(t, y)`.
pub fn dormand_prince<F>(
    rhs: F,
    initial: State,
    span: &TimeSpan,
    options: &IntegratorOptions,
) -> Result<Trajectory>
where
    F: Fn(f64, &State) -> State,
{
    span.validate()?;
    options.validate()?;
    for (i, v) in initial.iter().enumerate() {
        validate_finite(&format!("initial_state[{}]", i), *v)?;
    }

    let grid = span.grid();
    let n = grid.len();
    let t_end = span.end;

    let mut states = Array2::zeros((n, 3));
    write_row(&mut states, 0, &initial);
    let mut next_sample = 1;

    let mut t = span.start;
    let mut y = initial;
    let mut f = rhs(t, &y);
    if !all_finite(&f) {
        return Err(IntegrationError::NonFinite { t }.into());
    }

    let mut h = initial_step(&rhs, t, &y, &f, t_end - t, options);
    if let Some(max_h) = options.max_step {
        h = h.min(max_h);
    }

    let mut attempts = 0usize;
    let mut accepted = 0usize;
    let mut rejected = 0usize;
    let mut last_rejected = false;
    let mut last_non_finite = false;

    while t < t_end {
        let min_step = 10.0 * f64::EPSILON * t.abs();
        if h <= min_step || h <= 0.0 {
            return Err(if last_non_finite {
                IntegrationError::NonFinite { t }
            } else {
                IntegrationError::StepSizeUnderflow { t, step: h }
            }
            .into());
        }
        if attempts >= options.max_steps {
            return Err(IntegrationError::StepBudgetExceeded {
                max_steps: options.max_steps,
                t,
            }
            .into());
        }
        attempts += 1;

        let mut h_step = h;
        if let Some(max_h) = options.max_step {
            h_step = h_step.min(max_h);
        }
        let t_new = if t + h_step >= t_end {
            t_end
        } else {
            t + h_step
        };
        h_step = t_new - t;

        let (y_new, f_new, err) = dp_step(&rhs, t, &y, &f, h_step, options);
        let finite = err.is_finite() && all_finite(&y_new) && all_finite(&f_new);

        if finite && err <= 1.0 {
            accepted += 1;

            while next_sample < n && grid[next_sample] <= t_new {
                let ts = grid[next_sample];
                let ys = if ts == t_new {
                    y_new
                } else {
                    hermite(t, &y, &f, t_new, &y_new, &f_new, ts)
                };
                write_row(&mut states, next_sample, &ys);
                next_sample += 1;
            }

            let mut factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
            };
            if last_rejected {
                factor = factor.min(1.0);
            }
            h = h_step * factor;

            t = t_new;
            y = y_new;
            f = f_new;
            last_rejected = false;
            last_non_finite = false;
        } else {
            rejected += 1;
            let factor = if finite {
                (SAFETY * err.powf(ERROR_EXPONENT)).max(MIN_FACTOR)
            } else {
                MIN_FACTOR
            };
            h = h_step * factor;
            last_rejected = true;
            last_non_finite = !finite;
        }
    }

    // Grid end coincides with t_end, so every sample has been written.
    debug_assert_eq!(next_sample, n);

    Ok(Trajectory::from_samples(grid, states)?.with_diagnostics(accepted, rejected))
}

/// One Dormand–Prince step. Returns (y_new, f(t+h, y_new), error norm).
fn dp_step<F>(
    rhs: &F,
    t: f64,
    y: &State,
    f0: &State,
    h: f64,
    options: &IntegratorOptions,
) -> (State, State, f64)
where
    F: Fn(f64, &State) -> State,
{
    let k1 = *f0;
    let k2 = rhs(t + C2 * h, &combine(y, h, &[(A21, &k1)]));
    let k3 = rhs(t + C3 * h, &combine(y, h, &[(A31, &k1), (A32, &k2)]));
    let k4 = rhs(
        t + C4 * h,
        &combine(y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
    );
    let k5 = rhs(
        t + C5 * h,
        &combine(y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
    );
    let k6 = rhs(
        t + h,
        &combine(
            y,
            h,
            &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
        ),
    );
    let y_new = combine(
        y,
        h,
        &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
    );
    let k7 = rhs(t + h, &y_new);

    let mut sum_sq = 0.0;
    for i in 0..3 {
        let err_i =
            h * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
        let scale = options.atol + options.rtol * y[i].abs().max(y_new[i].abs());
        sum_sq += (err_i / scale).powi(2);
    }

    (y_new, k7, (sum_sq / 3.0).sqrt())
}

/// Starting step from Hairer, Nørsett & Wanner §II.4.
fn initial_step<F>(
    rhs: &F,
    t0: f64,
    y0: &State,
    f0: &State,
    interval: f64,
    options: &IntegratorOptions,
) -> f64
where
    F: Fn(f64, &State) -> State,
{
    let scale: State = std::array::from_fn(|i| options.atol + y0[i].abs() * options.rtol);
    let d0 = rms_scaled(y0, &scale);
    let d1 = rms_scaled(f0, &scale);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(interval);

    let y1 = combine(y0, h0, &[(1.0, f0)]);
    let f1 = rhs(t0 + h0, &y1);
    let diff: State = std::array::from_fn(|i| f1[i] - f0[i]);
    let d2 = rms_scaled(&diff, &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / 5.0)
    };

    let h = (100.0 * h0).min(h1).min(interval);
    if h.is_finite() {
        h
    } else {
        h0
    }
}

/// Cubic Hermite interpolation between (t0, y0, f0) and (t1, y1, f1).
fn hermite(t0: f64, y0: &State, f0: &State, t1: f64, y1: &State, f1: &State, t: f64) -> State {
    let h = t1 - t0;
    let s = (t - t0) / h;
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    std::array::from_fn(|i| h00 * y0[i] + h10 * h * f0[i] + h01 * y1[i] + h11 * h * f1[i])
}

#[inline]
fn combine(y: &State, h: f64, terms: &[(f64, &State)]) -> State {
    let mut out = *y;
    for (coef, k) in terms {
        for i in 0..3 {
            out[i] += h * coef * k[i];
        }
    }
    out
}

#[inline]
fn rms_scaled(v: &State, scale: &State) -> f64 {
    let sum: f64 = v.iter().zip(scale).map(|(a, s)| (a / s).powi(2)).sum();
    (sum / 3.0).sqrt()
}

#[inline]
fn all_finite(v: &State) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[inline]
fn write_row(states: &mut Array2<f64>, row: usize, y: &State) {
    for (j, v) in y.iter().enumerate() {
        states[[row, j]] = *v;
    }
}
