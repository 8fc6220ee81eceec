// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end run: chaos → coupling ratio → open-system evolution → gates →
//! fusion score.
//!
//! Every stage is a function of explicit inputs. The first failure aborts the
//! run; the error is returned tagged with the [`PipelineStage`] it came from
//! and otherwise unchanged (see [`Error::root`]).

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::Serialize;
use tracing::{info, instrument};

use crate::chaos::{
    coupling_ratio, integrate_lorenz, CouplingRatio, DriveParameters, IntegratorOptions, TimeSpan,
    Trajectory,
};
use crate::error::{Error, PipelineStage, Result, ValidationError};
use crate::fusion::{bell_phi_plus, fusion_strength};
use crate::gates::{compose, reference_sequence, NetUnitary};
use crate::linalg::c;
use crate::lindblad::{
    default_time_grid, x_expectation, CouplingConstants, EvolutionResult, QuantumEvolutionEngine,
    SolverOptions,
};
use crate::state::QuantumState;

/// Every explicit input of a run. `Default` is the reference run.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Drive of the chaotic system; the baseline uses the same parameters
    /// with the amplitude zeroed.
    pub drive: DriveParameters,
    /// Initial (x, y, z) for both chaotic runs.
    pub initial_condition: [f64; 3],
    pub span: TimeSpan,
    pub integrator: IntegratorOptions,
    pub coupling: CouplingConstants,
    /// Sample times of the quantum evolution.
    pub quantum_times: Vec<f64>,
    pub initial_state: QuantumState,
    pub solver: SolverOptions,
    /// Gates in application order.
    pub gates: Vec<Array2<Complex64>>,
    /// The two states scored by the fusion stage.
    pub fusion_states: (Array1<Complex64>, Array1<Complex64>),
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            drive: DriveParameters::default(),
            initial_condition: [1.0, 1.0, 1.0],
            span: TimeSpan::new(0.0, 50.0, 20_000),
            integrator: IntegratorOptions::default(),
            coupling: CouplingConstants::default(),
            quantum_times: default_time_grid(),
            initial_state: QuantumState::Pure(Array1::from(vec![c(1.0), c(0.0)])),
            solver: SolverOptions::default(),
            gates: reference_sequence(),
            fusion_states: (bell_phi_plus(), bell_phi_plus()),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub baseline: Trajectory,
    pub driven: Trajectory,
    pub coupling: CouplingRatio,
    pub evolution: EvolutionResult,
    pub net_unitary: NetUnitary,
    /// Final evolved state with the net unitary applied.
    pub final_state: QuantumState,
    pub fusion_strength: f64,
}

/// Run every stage in order.
#[instrument(skip(params), fields(amplitude = params.drive.amplitude, samples = params.span.num_samples))]
pub fn run_pipeline(params: &PipelineParams) -> Result<PipelineReport> {
    let (baseline, driven) =
        integrate_pair(params).map_err(|e| e.in_stage(PipelineStage::ChaosIntegration))?;
    info!(
        baseline_steps = baseline.accepted_steps(),
        driven_steps = driven.accepted_steps(),
        "Chaotic trajectories integrated"
    );

    let coupling =
        coupling_ratio(&driven, &baseline).map_err(|e| e.in_stage(PipelineStage::ChaosMetric))?;

    let evolution = evolve(coupling.value(), params)
        .map_err(|e| e.in_stage(PipelineStage::QuantumEvolution))?;
    let last = evolution
        .final_state()
        .cloned()
        .ok_or_else(|| {
            Error::from(ValidationError::Field {
                field: "quantum_times".into(),
                message: "evolution produced no states".into(),
            })
            .in_stage(PipelineStage::QuantumEvolution)
        })?;

    let (net_unitary, final_state) = compose(&params.gates)
        .and_then(|u| {
            let gated = u.apply(&QuantumState::Mixed(last))?;
            Ok((u, gated))
        })
        .map_err(|e| e.in_stage(PipelineStage::GateComposition))?;

    let (a, b) = &params.fusion_states;
    let fusion = fusion_strength(a, b).map_err(|e| e.in_stage(PipelineStage::Fusion))?;

    info!(
        ratio = coupling.value(),
        gates = net_unitary.gate_count(),
        fusion_strength = fusion,
        "Pipeline complete"
    );

    Ok(PipelineReport {
        baseline,
        driven,
        coupling,
        evolution,
        net_unitary,
        final_state,
        fusion_strength: fusion,
    })
}

fn integrate_pair(params: &PipelineParams) -> Result<(Trajectory, Trajectory)> {
    let baseline = integrate_lorenz(
        &params.drive.baseline(),
        params.initial_condition,
        &params.span,
        &params.integrator,
    )?;
    let driven = integrate_lorenz(
        &params.drive,
        params.initial_condition,
        &params.span,
        &params.integrator,
    )?;
    Ok((baseline, driven))
}

fn evolve(ratio: f64, params: &PipelineParams) -> Result<EvolutionResult> {
    let engine = QuantumEvolutionEngine::new(ratio, &params.coupling)?;
    engine.evolve(&params.initial_state, &params.quantum_times, &params.solver)
}

/// Plain-array view of a [`PipelineReport`] for JSON output.
///
/// Complex entries are `[re, im]` pairs.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineExport {
    pub coupling: CouplingRatio,
    pub chaos: ChaosExport,
    pub quantum: QuantumExport,
    pub net_unitary: Vec<Vec<[f64; 2]>>,
    pub gate_count: usize,
    pub final_probabilities: Vec<f64>,
    pub fusion_strength: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChaosExport {
    pub times: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub baseline_y: Vec<f64>,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantumExport {
    pub times: Vec<f64>,
    pub x_expectation: Vec<f64>,
    pub populations: Vec<Vec<f64>>,
    pub purities: Vec<f64>,
    pub substeps: usize,
}

impl PipelineReport {
    pub fn export(&self) -> PipelineExport {
        let matrix = self.net_unitary.matrix();
        PipelineExport {
            coupling: self.coupling,
            chaos: ChaosExport {
                times: self.driven.times().to_vec(),
                x: self.driven.x().to_vec(),
                y: self.driven.y().to_vec(),
                z: self.driven.z().to_vec(),
                baseline_y: self.baseline.y().to_vec(),
                accepted_steps: self.driven.accepted_steps(),
                rejected_steps: self.driven.rejected_steps(),
            },
            quantum: QuantumExport {
                times: self.evolution.times.clone(),
                x_expectation: x_expectation(&self.evolution),
                populations: self.evolution.populations(),
                purities: self.evolution.purities(),
                substeps: self.evolution.substeps,
            },
            net_unitary: matrix
                .rows()
                .into_iter()
                .map(|row| row.iter().map(|z| [z.re, z.im]).collect())
                .collect(),
            gate_count: self.net_unitary.gate_count(),
            final_probabilities: self.final_state.probabilities(),
            fusion_strength: self.fusion_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::variance;
    use crate::gates::{hadamard, identity, is_unitary};
    use crate::state::basis_vector;
    use approx::assert_relative_eq;

    /// A short, cheap configuration for stage-ordering tests.
    fn short_params() -> PipelineParams {
        PipelineParams {
            drive: DriveParameters {
                amplitude: 20.0,
                frequency: 1.5,
                ..DriveParameters::default()
            },
            span: TimeSpan::new(0.0, 5.0, 1000),
            ..PipelineParams::default()
        }
    }

    #[test]
    fn test_reference_run() {
        let report = run_pipeline(&PipelineParams::default()).unwrap();

        // Baseline attractor has spread in y
        assert_eq!(report.baseline.len(), 20_000);
        assert!(variance(report.baseline.y()) > 0.0);

        // Driven vs baseline gives a ratio the engine accepts
        let r = report.coupling.value();
        assert!(r.is_finite() && r > 0.0, "ratio {r}");
        assert_eq!(report.evolution.len(), 100);
        for tr in report.evolution.traces() {
            assert_relative_eq!(tr, 1.0, epsilon = 1e-6);
        }

        // Ten reference gates compose to a unitary
        assert_eq!(report.net_unitary.gate_count(), 10);
        assert!(is_unitary(report.net_unitary.matrix(), 1e-9));

        assert_relative_eq!(report.fusion_strength, 0.5, epsilon = 1e-12);
        let probs = report.final_state.probabilities();
        assert_relative_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_short_run_export_shapes() {
        let report = run_pipeline(&short_params()).unwrap();
        let export = report.export();

        assert_eq!(export.chaos.times.len(), 1000);
        assert_eq!(export.chaos.y.len(), 1000);
        assert_eq!(export.chaos.baseline_y.len(), 1000);
        assert_eq!(export.quantum.times.len(), 100);
        assert_eq!(export.quantum.x_expectation.len(), 100);
        assert_eq!(export.quantum.populations.len(), 100);
        assert_eq!(export.net_unitary.len(), 2);
        assert_eq!(export.net_unitary[0].len(), 2);
        assert_eq!(export.gate_count, 10);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["coupling"]["ratio"].is_number());
        assert!(json["net_unitary"][0][0].is_array());
    }

    #[test]
    fn test_degenerate_baseline_aborts_run() {
        let params = PipelineParams {
            initial_condition: [0.0, 0.0, 0.0],
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::DegenerateBaseline { .. }));
        assert_eq!(err.stage(), "chaos-metric");
    }

    #[test]
    fn test_reversed_span_reports_integration_stage() {
        let params = PipelineParams {
            span: TimeSpan::new(5.0, 0.0, 1000),
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::Validation(_)));
        assert_eq!(err.stage(), "chaos-integration");
    }

    #[test]
    fn test_integration_budget_aborts_run() {
        let mut params = short_params();
        params.integrator.max_steps = 5;
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::Integration(_)));
        assert_eq!(err.stage(), "chaos-integration");
    }

    #[test]
    fn test_wrong_qubit_dimension_reports_evolution_stage() {
        let params = PipelineParams {
            initial_state: QuantumState::basis(4, 0).unwrap(),
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::DimensionMismatch { .. }));
        assert_eq!(err.stage(), "quantum-evolution");
    }

    #[test]
    fn test_empty_gate_list_reports_composition_stage() {
        let params = PipelineParams {
            gates: vec![],
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::Validation(_)));
        assert_eq!(err.stage(), "gate-composition");
    }

    #[test]
    fn test_wide_gate_reports_composition_stage() {
        // A 4 × 4 net unitary cannot act on the evolved qubit.
        let params = PipelineParams {
            gates: vec![identity(4)],
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::DimensionMismatch { .. }));
        assert_eq!(err.stage(), "gate-composition");
    }

    #[test]
    fn test_mismatched_fusion_pair_reports_fusion_stage() {
        let params = PipelineParams {
            fusion_states: (bell_phi_plus(), basis_vector(2, 0).unwrap()),
            ..short_params()
        };
        let err = run_pipeline(&params).unwrap_err();
        assert!(matches!(err.root(), Error::DimensionMismatch { .. }));
        assert_eq!(err.stage(), "fusion");
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in fusion inputs: expected 4, got 2"
        );
    }

    #[test]
    fn test_custom_gates_and_fusion_pair() {
        let params = PipelineParams {
            gates: vec![hadamard()],
            fusion_states: (basis_vector(2, 0).unwrap(), basis_vector(2, 1).unwrap()),
            ..short_params()
        };
        let report = run_pipeline(&params).unwrap();
        assert_eq!(report.net_unitary.matrix(), &hadamard());
        assert_eq!(report.fusion_strength, 0.0);
    }
}
