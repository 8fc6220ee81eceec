// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation types.
//!
//! Ref: Lindblad (1976), Commun. Math. Phys. 48, 119.
//! Ref: Gorini, Kossakowski, Sudarshan (1976), J. Math. Phys. 17, 821.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Error, Result, ValidationError};
use crate::linalg::{c, dagger, norm_1, purity, trace_real};

/// A Lindblad collapse (jump) operator with its rate.
///
/// Represents a single dissipation channel:
///   D[L](ρ) = γ (L ρ L† − ½{L†L, ρ})
///
/// The operator and the rate are kept apart so the generator can be built
/// and tested independently of whatever produced the rate.
#[derive(Debug, Clone)]
pub struct CollapseOperator {
    /// Operator matrix (d × d).
    pub matrix: Array2<Complex64>,
    /// Rate γ in 1/s.
    pub rate: f64,
    /// Human-readable label (e.g., "relaxation").
    pub label: String,
}

impl CollapseOperator {
    /// Generic (operator, rate) pair.
    pub fn new(matrix: Array2<Complex64>, rate: f64, label: &str) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::Field {
                field: format!("collapse_ops.{label}.rate"),
                message: format!("must be finite and >= 0, got {rate}"),
            }
            .into());
        }
        if matrix.nrows() != matrix.ncols() {
            return Err(Error::DimensionMismatch {
                context: format!("collapse operator '{label}'"),
                expected: matrix.nrows(),
                actual: matrix.ncols(),
            });
        }
        Ok(Self {
            matrix,
            rate,
            label: label.into(),
        })
    }

    /// Build from a pre-scaled operator √γ·L, given as `amplitude` times `L`.
    ///
    /// Equivalent to rate γ = amplitude².
    pub fn from_amplitude(matrix: Array2<Complex64>, amplitude: f64, label: &str) -> Result<Self> {
        Self::new(matrix, amplitude * amplitude, label)
    }

    /// Contribution of this channel to the generator norm bound.
    pub(crate) fn norm_bound(&self) -> f64 {
        2.0 * self.rate * norm_1(&dagger(&self.matrix).dot(&self.matrix))
    }
}

/// Lowering operator σ⁻ = |0⟩⟨1|.
pub fn sigma_minus() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = c(1.0);
    m
}

/// Time dependence of a Hamiltonian drive term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    /// Constant coefficient.
    Constant(f64),
    /// amplitude · sin(2π f t + phase)
    Sinusoid {
        amplitude: f64,
        frequency: f64,
        phase: f64,
    },
}

impl Envelope {
    /// Coefficient at time `t`.
    #[inline]
    pub fn value(&self, t: f64) -> f64 {
        match *self {
            Envelope::Constant(v) => v,
            Envelope::Sinusoid {
                amplitude,
                frequency,
                phase,
            } => amplitude * (2.0 * std::f64::consts::PI * frequency * t + phase).sin(),
        }
    }

    /// Upper bound on |value(t)|.
    pub fn peak(&self) -> f64 {
        match *self {
            Envelope::Constant(v) => v.abs(),
            Envelope::Sinusoid { amplitude, .. } => amplitude.abs(),
        }
    }
}

/// One operator multiplied by a time-dependent coefficient.
#[derive(Debug, Clone)]
pub struct DriveTerm {
    pub operator: Array2<Complex64>,
    pub envelope: Envelope,
}

/// H(t) = H₀ + Σ_j e_j(t) H_j, evaluated fresh at every solver time point.
#[derive(Debug, Clone)]
pub struct TimeDependentHamiltonian {
    pub static_term: Array2<Complex64>,
    pub drives: Vec<DriveTerm>,
}

impl TimeDependentHamiltonian {
    /// Time-independent Hamiltonian.
    pub fn constant(static_term: Array2<Complex64>) -> Self {
        Self {
            static_term,
            drives: Vec::new(),
        }
    }

    /// Add a drive term.
    pub fn with_drive(mut self, operator: Array2<Complex64>, envelope: Envelope) -> Self {
        self.drives.push(DriveTerm { operator, envelope });
        self
    }

    pub fn dim(&self) -> usize {
        self.static_term.nrows()
    }

    /// H(t).
    pub fn at(&self, t: f64) -> Array2<Complex64> {
        let mut h = self.static_term.clone();
        for term in &self.drives {
            let coeff = term.envelope.value(t);
            if coeff != 0.0 {
                h.scaled_add(c(coeff), &term.operator);
            }
        }
        h
    }

    /// Upper bound on ‖H(t)‖₁ over all t.
    pub fn norm_bound(&self) -> f64 {
        norm_1(&self.static_term)
            + self
                .drives
                .iter()
                .map(|d| d.envelope.peak() * norm_1(&d.operator))
                .sum::<f64>()
    }

    /// Check every term is d × d.
    pub fn validate(&self, d: usize) -> Result<()> {
        let check = |m: &Array2<Complex64>, context: &str| {
            if m.nrows() != d || m.ncols() != d {
                return Err(Error::DimensionMismatch {
                    context: context.to_string(),
                    expected: d,
                    actual: if m.nrows() != d { m.nrows() } else { m.ncols() },
                });
            }
            Ok(())
        };
        check(&self.static_term, "static Hamiltonian")?;
        for (i, term) in self.drives.iter().enumerate() {
            check(&term.operator, &format!("drive term {i}"))?;
            if !term.envelope.peak().is_finite() {
                return Err(ValidationError::Field {
                    field: format!("drives[{i}].envelope"),
                    message: "amplitude is not finite".into(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Settings for the master-equation solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Upper bound on h·Λ per RK4 substep, Λ being the generator norm bound.
    pub stability_target: f64,
    /// Budget of RK4 substeps across the whole grid.
    pub max_substeps: usize,
    /// Allowed |Tr ρ − 1| at every sample.
    pub trace_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            stability_target: 0.1,
            max_substeps: 1_000_000,
            trace_tolerance: 1e-6,
        }
    }
}

impl SolverOptions {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.stability_target > 0.0 && self.stability_target.is_finite()) {
            return Err(ValidationError::Field {
                field: "stability_target".into(),
                message: "must be finite and > 0".into(),
            }
            .into());
        }
        if self.max_substeps == 0 {
            return Err(ValidationError::Field {
                field: "max_substeps".into(),
                message: "must be > 0".into(),
            }
            .into());
        }
        if !(self.trace_tolerance > 0.0) {
            return Err(ValidationError::Field {
                field: "trace_tolerance".into(),
                message: "must be > 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Result of a Lindblad master equation evolution.
///
/// `states[k]` is ρ(`times[k]`); the first entry is the initial state.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Sample times.
    pub times: Vec<f64>,
    /// Density matrix at each sample time.
    pub states: Vec<Array2<Complex64>>,
    /// RK4 substeps taken.
    pub substeps: usize,
}

impl EvolutionResult {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn final_state(&self) -> Option<&Array2<Complex64>> {
        self.states.last()
    }

    /// Tr ρ at every sample.
    pub fn traces(&self) -> Vec<f64> {
        self.states.iter().map(trace_real).collect()
    }

    /// Tr ρ² at every sample.
    pub fn purities(&self) -> Vec<f64> {
        self.states.iter().map(purity).collect()
    }

    /// ⟨O⟩ = Re Tr(O ρ) at every sample.
    pub fn expectation(&self, op: &Array2<Complex64>) -> Vec<f64> {
        self.states.iter().map(|rho| trace_real(&op.dot(rho))).collect()
    }

    /// Diagonal of ρ at every sample.
    pub fn populations(&self) -> Vec<Vec<f64>> {
        self.states
            .iter()
            .map(|rho| rho.diag().iter().map(|z| z.re).collect())
            .collect()
    }
}
