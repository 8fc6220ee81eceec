// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the Lindblad master equation.
//!
//! Integrates dρ/dt = -i[H(t), ρ] + Σ D[L](ρ) using classical 4th-order
//! Runge–Kutta. H(t) is evaluated at the stage times of every substep, and
//! each output interval is split so that h·Λ stays below the stability
//! target, Λ being a bound on the generator norm.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, warn};

use super::dissipator::lindblad_rhs;
use super::types::{CollapseOperator, EvolutionResult, SolverOptions, TimeDependentHamiltonian};
use crate::error::{Error, EvolutionError, Result, ValidationError};
use crate::linalg::{c, is_finite, trace_real};
use crate::validation::{validate_square, validate_time_grid};

/// Solve the Lindblad master equation on a sample grid.
///
/// # Arguments
/// * `initial_rho` - Density matrix at `times[0]` (d × d, trace 1).
/// * `hamiltonian` - Time-dependent Hamiltonian, every term d × d.
/// * `collapse_ops` - Dissipation channels, every operator d × d.
/// * `times` - Strictly increasing sample times.
/// * `options` - Stability target, substep budget, trace tolerance.
///
/// # Returns
/// `EvolutionResult` with one density matrix per sample time.
pub fn solve_lindblad(
    initial_rho: &Array2<Complex64>,
    hamiltonian: &TimeDependentHamiltonian,
    collapse_ops: &[CollapseOperator],
    times: &[f64],
    options: &SolverOptions,
) -> Result<EvolutionResult> {
    options.validate()?;
    let d = validate_square("initial density matrix", initial_rho)?;
    hamiltonian.validate(d)?;
    for op in collapse_ops {
        if op.matrix.nrows() != d || op.matrix.ncols() != d {
            return Err(Error::DimensionMismatch {
                context: format!("collapse operator '{}'", op.label),
                expected: d,
                actual: op.matrix.nrows(),
            });
        }
    }
    validate_time_grid("times", times)?;

    let lambda = generator_bound(hamiltonian, collapse_ops);
    if !lambda.is_finite() {
        return Err(ValidationError::PhysicsConstraint(
            "generator norm bound is not finite".into(),
        )
        .into());
    }

    let plan: Vec<usize> = times
        .windows(2)
        .map(|w| substeps_for(w[1] - w[0], lambda, options.stability_target))
        .collect();
    let required = plan
        .iter()
        .fold(0usize, |acc, &m| acc.saturating_add(m));
    if required > options.max_substeps {
        return Err(EvolutionError::StepBudgetExceeded {
            max_substeps: options.max_substeps,
            required,
        }
        .into());
    }
    if required > options.max_substeps / 2 {
        warn!(
            required,
            max_substeps = options.max_substeps,
            "Lindblad substep count is close to the budget"
        );
    }
    debug!(
        dim = d,
        samples = times.len(),
        lambda,
        substeps = required,
        "Solving Lindblad master equation"
    );

    let mut rho = initial_rho.clone();
    check_state(&rho, times[0], options.trace_tolerance)?;

    let mut states = Vec::with_capacity(times.len());
    states.push(rho.clone());

    for (w, &m) in times.windows(2).zip(plan.iter()) {
        let h = (w[1] - w[0]) / m as f64;
        for k in 0..m {
            // Anchor each substep on the interval start to avoid drift in t.
            let t = w[0] + k as f64 * h;
            rho = rk4_step(&rho, hamiltonian, collapse_ops, t, h);
        }
        check_state(&rho, w[1], options.trace_tolerance)?;
        states.push(rho.clone());
    }

    Ok(EvolutionResult {
        times: times.to_vec(),
        states,
        substeps: required,
    })
}

/// Bound on the generator norm: 2‖H‖ for the commutator plus the dissipators.
fn generator_bound(hamiltonian: &TimeDependentHamiltonian, collapse_ops: &[CollapseOperator]) -> f64 {
    2.0 * hamiltonian.norm_bound() + collapse_ops.iter().map(|op| op.norm_bound()).sum::<f64>()
}

/// Number of equal substeps so that h·Λ ≤ target. At least one.
fn substeps_for(dt: f64, lambda: f64, target: f64) -> usize {
    let m = (dt * lambda / target).ceil();
    // `as` saturates for values beyond usize::MAX
    if m < 1.0 {
        1
    } else {
        m as usize
    }
}

fn check_state(rho: &Array2<Complex64>, t: f64, tol: f64) -> Result<()> {
    if !is_finite(rho) {
        return Err(EvolutionError::NonFinite { t }.into());
    }
    let trace = trace_real(rho);
    if (trace - 1.0).abs() > tol {
        return Err(EvolutionError::TraceDrift { t, trace }.into());
    }
    Ok(())
}

/// Single RK4 step with H evaluated at t, t + h/2 and t + h.
fn rk4_step(
    rho: &Array2<Complex64>,
    hamiltonian: &TimeDependentHamiltonian,
    collapse_ops: &[CollapseOperator],
    t: f64,
    dt: f64,
) -> Array2<Complex64> {
    let dt_c = c(dt);
    let half = c(0.5);
    let sixth = c(1.0 / 6.0);
    let two = c(2.0);

    let h_start = hamiltonian.at(t);
    let h_mid = hamiltonian.at(t + 0.5 * dt);
    let h_end = hamiltonian.at(t + dt);

    let k1 = lindblad_rhs(&h_start, collapse_ops, rho);
    let rho2 = rho + &(&k1 * (half * dt_c));
    let k2 = lindblad_rhs(&h_mid, collapse_ops, &rho2);
    let rho3 = rho + &(&k2 * (half * dt_c));
    let k3 = lindblad_rhs(&h_mid, collapse_ops, &rho3);
    let rho4 = rho + &(&k3 * dt_c);
    let k4 = lindblad_rhs(&h_end, collapse_ops, &rho4);

    rho + &((k1 + &(k2 * two) + &(k3 * two) + &k4) * (sixth * dt_c))
}

/// State fidelity between a pure target (given as ρ_target = |ψ⟩⟨ψ|)
/// and a (possibly mixed) state ρ.
///
/// F = Tr(ρ_target · ρ) for pure target states.
pub fn state_fidelity(rho: &Array2<Complex64>, target_rho: &Array2<Complex64>) -> f64 {
    trace_real(&target_rho.dot(rho))
}

/// Trace distance: D(ρ, σ) = ½ ‖ρ - σ‖₁
///
/// For 2×2 matrices, computed analytically from eigenvalues of ρ - σ.
/// For larger matrices, uses the Frobenius norm as an upper bound.
pub fn trace_distance(rho: &Array2<Complex64>, sigma: &Array2<Complex64>) -> f64 {
    let diff = rho - sigma;

    if diff.nrows() == 2 {
        // λ± = (a+d)/2 ± sqrt(((a-d)/2)² + |b|²)
        let a = diff[[0, 0]].re;
        let d = diff[[1, 1]].re;
        let b = diff[[0, 1]];
        let half_sum = (a + d) / 2.0;
        let half_diff = (a - d) / 2.0;
        let root = (half_diff * half_diff + b.norm_sqr()).sqrt();
        0.5 * ((half_sum + root).abs() + (half_sum - root).abs())
    } else {
        let frob: f64 = diff.iter().map(|z| z.norm_sqr()).sum();
        0.5 * frob.sqrt()
    }
}
