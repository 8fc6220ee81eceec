// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Driven Lorenz system types.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};
use crate::validation::{validate_finite, validate_positive};

/// Parameters of the driven Lorenz oscillator.
///
/// ```text
/// dx/dt = σ (y − x)
/// dy/dt = x (ρ − z) − y + A sin(2π f t)
/// dz/dt = x y − β z
/// ```
///
/// `amplitude = 0` is the undriven baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveParameters {
    pub sigma: f64,
    pub beta: f64,
    pub rho: f64,
    /// Forcing amplitude A.
    pub amplitude: f64,
    /// Forcing frequency f in Hz.
    pub frequency: f64,
}

impl Default for DriveParameters {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            beta: 8.0 / 3.0,
            rho: 28.0,
            amplitude: 1000.0,
            frequency: 528.0,
        }
    }
}

impl DriveParameters {
    /// Same system with the forcing switched off.
    pub fn baseline(&self) -> Self {
        Self {
            amplitude: 0.0,
            ..*self
        }
    }

    /// Right-hand side of the ODE at time `t`.
    #[inline]
    pub fn derivative(&self, t: f64, state: &[f64; 3]) -> [f64; 3] {
        let [x, y, z] = *state;
        let drive = self.amplitude * (2.0 * std::f64::consts::PI * self.frequency * t).sin();
        [
            self.sigma * (y - x),
            x * (self.rho - z) - y + drive,
            x * y - self.beta * z,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        validate_finite("sigma", self.sigma)?;
        validate_finite("beta", self.beta)?;
        validate_finite("rho", self.rho)?;
        validate_finite("amplitude", self.amplitude)?;
        validate_finite("frequency", self.frequency)?;
        Ok(())
    }
}

/// Evenly spaced sample grid `linspace(start, end, num_samples)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
    pub num_samples: usize,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64, num_samples: usize) -> Self {
        Self {
            start,
            end,
            num_samples,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_finite("span.start", self.start)?;
        validate_finite("span.end", self.end)?;
        if self.end <= self.start {
            return Err(ValidationError::Field {
                field: "span".into(),
                message: format!("end ({}) must be after start ({})", self.end, self.start),
            }
            .into());
        }
        if self.num_samples < 2 {
            return Err(ValidationError::Field {
                field: "span.num_samples".into(),
                message: "must be at least 2".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Sample times. The last entry is exactly `end`.
    pub fn grid(&self) -> Array1<f64> {
        let n = self.num_samples;
        let width = self.end - self.start;
        Array1::from_shape_fn(n, |i| {
            if i + 1 == n {
                self.end
            } else {
                self.start + width * (i as f64 / (n - 1) as f64)
            }
        })
    }
}

/// Error-control settings for the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorOptions {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
    /// Upper bound on a single step (None = unbounded).
    pub max_step: Option<f64>,
    /// Budget of attempted steps (accepted + rejected).
    pub max_steps: usize,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_step: None,
            max_steps: 5_000_000,
        }
    }
}

impl IntegratorOptions {
    pub fn validate(&self) -> Result<()> {
        validate_positive("rtol", self.rtol)?;
        validate_positive("atol", self.atol)?;
        if let Some(h) = self.max_step {
            validate_positive("max_step", h)?;
        }
        if self.max_steps == 0 {
            return Err(ValidationError::Field {
                field: "max_steps".into(),
                message: "must be > 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// A dense trajectory sampled on a fixed grid.
#[derive(Debug, Clone)]
pub struct Trajectory {
    times: Array1<f64>,
    /// N × 3, columns x, y, z.
    states: Array2<f64>,
    accepted_steps: usize,
    rejected_steps: usize,
}

impl Trajectory {
    /// Build from raw samples: one row of (x, y, z) per time.
    ///
    /// # Errors
    /// `DimensionMismatch` if `states` is not `times.len()` × 3.
    pub fn from_samples(times: Array1<f64>, states: Array2<f64>) -> Result<Self> {
        if states.nrows() != times.len() {
            return Err(Error::DimensionMismatch {
                context: "trajectory rows".into(),
                expected: times.len(),
                actual: states.nrows(),
            });
        }
        if states.ncols() != 3 {
            return Err(Error::DimensionMismatch {
                context: "trajectory columns".into(),
                expected: 3,
                actual: states.ncols(),
            });
        }
        Ok(Self {
            times,
            states,
            accepted_steps: 0,
            rejected_steps: 0,
        })
    }

    pub(crate) fn with_diagnostics(mut self, accepted: usize, rejected: usize) -> Self {
        self.accepted_steps = accepted;
        self.rejected_steps = rejected;
        self
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    pub fn states(&self) -> &Array2<f64> {
        &self.states
    }

    /// Column `i` (0 = x, 1 = y, 2 = z).
    pub fn component(&self, i: usize) -> ArrayView1<'_, f64> {
        self.states.column(i)
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.component(0)
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.component(1)
    }

    pub fn z(&self) -> ArrayView1<'_, f64> {
        self.component(2)
    }

    pub fn final_state(&self) -> Option<[f64; 3]> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let row = self.states.row(n - 1);
        Some([row[0], row[1], row[2]])
    }

    /// Accepted solver steps.
    pub fn accepted_steps(&self) -> usize {
        self.accepted_steps
    }

    /// Rejected solver steps.
    pub fn rejected_steps(&self) -> usize {
        self.rejected_steps
    }
}
