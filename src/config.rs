// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the coupling pipeline.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults (the reference run)
//! 2. config.yaml file
//! 3. Environment variables (QUBITOS_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::chaos::{DriveParameters, IntegratorOptions, TimeSpan};
use crate::error::{Error, Result};
use crate::lindblad::engine::{time_grid, DEFAULT_EVOLUTION_END, DEFAULT_EVOLUTION_SAMPLES};
use crate::lindblad::{CouplingConstants, SolverOptions};
use crate::pipeline::PipelineParams;
use crate::validation::{validate_finite, validate_positive, validate_run_limits};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chaotic oscillator and integrator settings
    #[serde(default)]
    pub chaos: ChaosConfig,

    /// Qubit model and master-equation solver settings
    #[serde(default)]
    pub quantum: QuantumConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["config.yaml", "config.yml", "/etc/qubitos/chaos.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides. Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_CHAOS_AMPLITUDE") {
            if let Ok(v) = val.parse() {
                self.chaos.amplitude = v;
            }
        }
        if let Ok(val) = env::var("QUBITOS_CHAOS_FREQUENCY") {
            if let Ok(v) = val.parse() {
                self.chaos.frequency = v;
            }
        }
        if let Ok(val) = env::var("QUBITOS_CHAOS_SAMPLES") {
            if let Ok(v) = val.parse() {
                self.chaos.num_samples = v;
            }
        }
        if let Ok(val) = env::var("QUBITOS_CHAOS_RTOL") {
            if let Ok(v) = val.parse() {
                self.chaos.rtol = v;
            }
        }
        if let Ok(val) = env::var("QUBITOS_CHAOS_ATOL") {
            if let Ok(v) = val.parse() {
                self.chaos.atol = v;
            }
        }
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.drive().validate()?;
        self.span().validate()?;
        self.integrator().validate()?;
        for (i, v) in self.chaos.initial_condition.iter().enumerate() {
            validate_finite(&format!("chaos.initial_condition[{i}]"), *v)?;
        }
        self.coupling().validate()?;
        validate_positive("quantum.t_end", self.quantum.t_end)?;
        self.solver().validate()?;

        validate_run_limits(
            self.chaos.num_samples,
            self.quantum.num_samples,
            &self.limits,
        )?;
        if self.chaos.max_steps > self.limits.max_integrator_steps {
            return Err(Error::Config(format!(
                "chaos.max_steps ({}) exceeds limits.max_integrator_steps ({})",
                self.chaos.max_steps, self.limits.max_integrator_steps
            )));
        }
        if self.quantum.max_substeps > self.limits.max_substeps {
            return Err(Error::Config(format!(
                "quantum.max_substeps ({}) exceeds limits.max_substeps ({})",
                self.quantum.max_substeps, self.limits.max_substeps
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }

        // A resolved drive period costs a few dozen solver steps.
        let drive_cycles = (self.chaos.t_end - self.chaos.t_start) * self.chaos.frequency.abs();
        if drive_cycles * 40.0 > self.chaos.max_steps as f64 / 2.0 {
            tracing::warn!(
                drive_cycles,
                max_steps = self.chaos.max_steps,
                "Driven integration may come close to the step budget"
            );
        }
        Ok(())
    }

    pub fn drive(&self) -> DriveParameters {
        DriveParameters {
            sigma: self.chaos.sigma,
            beta: self.chaos.beta,
            rho: self.chaos.rho,
            amplitude: self.chaos.amplitude,
            frequency: self.chaos.frequency,
        }
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.chaos.t_start, self.chaos.t_end, self.chaos.num_samples)
    }

    pub fn integrator(&self) -> IntegratorOptions {
        IntegratorOptions {
            rtol: self.chaos.rtol,
            atol: self.chaos.atol,
            max_step: self.chaos.max_step,
            max_steps: self.chaos.max_steps,
        }
    }

    pub fn coupling(&self) -> CouplingConstants {
        CouplingConstants {
            omega: self.quantum.omega,
            drive_coupling: self.quantum.drive_coupling,
            drive_frequency: self.quantum.drive_frequency,
            relaxation_coupling: self.quantum.relaxation_coupling,
        }
    }

    pub fn solver(&self) -> SolverOptions {
        SolverOptions {
            stability_target: self.quantum.stability_target,
            max_substeps: self.quantum.max_substeps,
            trace_tolerance: self.quantum.trace_tolerance,
        }
    }

    /// Map onto run parameters. Gates, initial qubit state and the fusion
    /// pair keep their reference values.
    pub fn to_params(&self) -> PipelineParams {
        PipelineParams {
            drive: self.drive(),
            initial_condition: self.chaos.initial_condition,
            span: self.span(),
            integrator: self.integrator(),
            coupling: self.coupling(),
            quantum_times: time_grid(0.0, self.quantum.t_end, self.quantum.num_samples),
            solver: self.solver(),
            ..PipelineParams::default()
        }
    }
}

/// Driven oscillator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosConfig {
    #[serde(default = "default_sigma")]
    pub sigma: f64,

    #[serde(default = "default_beta")]
    pub beta: f64,

    #[serde(default = "default_rho")]
    pub rho: f64,

    /// Drive amplitude A
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Drive frequency in Hz
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    #[serde(default = "default_initial_condition")]
    pub initial_condition: [f64; 3],

    #[serde(default)]
    pub t_start: f64,

    #[serde(default = "default_t_end")]
    pub t_end: f64,

    /// Number of trajectory samples
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,

    #[serde(default = "default_rtol")]
    pub rtol: f64,

    #[serde(default = "default_atol")]
    pub atol: f64,

    /// Largest allowed integrator step
    #[serde(default)]
    pub max_step: Option<f64>,

    /// Budget of attempted integrator steps per run
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            sigma: default_sigma(),
            beta: default_beta(),
            rho: default_rho(),
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            initial_condition: default_initial_condition(),
            t_start: 0.0,
            t_end: default_t_end(),
            num_samples: default_num_samples(),
            rtol: default_rtol(),
            atol: default_atol(),
            max_step: None,
            max_steps: default_max_steps(),
        }
    }
}

fn default_sigma() -> f64 {
    DriveParameters::default().sigma
}

fn default_beta() -> f64 {
    DriveParameters::default().beta
}

fn default_rho() -> f64 {
    DriveParameters::default().rho
}

fn default_amplitude() -> f64 {
    DriveParameters::default().amplitude
}

fn default_frequency() -> f64 {
    DriveParameters::default().frequency
}

fn default_initial_condition() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_t_end() -> f64 {
    50.0
}

fn default_num_samples() -> usize {
    20_000
}

fn default_rtol() -> f64 {
    IntegratorOptions::default().rtol
}

fn default_atol() -> f64 {
    IntegratorOptions::default().atol
}

fn default_max_steps() -> usize {
    IntegratorOptions::default().max_steps
}

/// Qubit model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumConfig {
    #[serde(default = "default_omega")]
    pub omega: f64,

    #[serde(default = "default_drive_coupling")]
    pub drive_coupling: f64,

    /// Qubit drive frequency in Hz
    #[serde(default = "default_drive_frequency")]
    pub drive_frequency: f64,

    #[serde(default = "default_relaxation_coupling")]
    pub relaxation_coupling: f64,

    /// End of the evolution grid in seconds (grid starts at 0)
    #[serde(default = "default_quantum_t_end")]
    pub t_end: f64,

    #[serde(default = "default_quantum_samples")]
    pub num_samples: usize,

    #[serde(default = "default_stability_target")]
    pub stability_target: f64,

    #[serde(default = "default_max_substeps")]
    pub max_substeps: usize,

    #[serde(default = "default_trace_tolerance")]
    pub trace_tolerance: f64,
}

impl Default for QuantumConfig {
    fn default() -> Self {
        Self {
            omega: default_omega(),
            drive_coupling: default_drive_coupling(),
            drive_frequency: default_drive_frequency(),
            relaxation_coupling: default_relaxation_coupling(),
            t_end: default_quantum_t_end(),
            num_samples: default_quantum_samples(),
            stability_target: default_stability_target(),
            max_substeps: default_max_substeps(),
            trace_tolerance: default_trace_tolerance(),
        }
    }
}

fn default_omega() -> f64 {
    CouplingConstants::default().omega
}

fn default_drive_coupling() -> f64 {
    CouplingConstants::default().drive_coupling
}

fn default_drive_frequency() -> f64 {
    CouplingConstants::default().drive_frequency
}

fn default_relaxation_coupling() -> f64 {
    CouplingConstants::default().relaxation_coupling
}

fn default_quantum_t_end() -> f64 {
    DEFAULT_EVOLUTION_END
}

fn default_quantum_samples() -> usize {
    DEFAULT_EVOLUTION_SAMPLES
}

fn default_stability_target() -> f64 {
    SolverOptions::default().stability_target
}

fn default_max_substeps() -> usize {
    SolverOptions::default().max_substeps
}

fn default_trace_tolerance() -> f64 {
    SolverOptions::default().trace_tolerance
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum trajectory samples
    #[serde(default = "default_max_trajectory_samples")]
    pub max_trajectory_samples: usize,

    /// Maximum evolution samples
    #[serde(default = "default_max_evolution_samples")]
    pub max_evolution_samples: usize,

    /// Ceiling for `chaos.max_steps`
    #[serde(default = "default_max_integrator_steps")]
    pub max_integrator_steps: usize,

    /// Ceiling for `quantum.max_substeps`
    #[serde(default = "default_max_substeps_limit")]
    pub max_substeps: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_trajectory_samples: default_max_trajectory_samples(),
            max_evolution_samples: default_max_evolution_samples(),
            max_integrator_steps: default_max_integrator_steps(),
            max_substeps: default_max_substeps_limit(),
        }
    }
}

fn default_max_trajectory_samples() -> usize {
    1_000_000
}

fn default_max_evolution_samples() -> usize {
    100_000
}

fn default_max_integrator_steps() -> usize {
    50_000_000
}

fn default_max_substeps_limit() -> usize {
    100_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config_is_reference_run() {
        let config = Config::default();
        assert_eq!(config.chaos.amplitude, 1000.0);
        assert_eq!(config.chaos.frequency, 528.0);
        assert_eq!(config.chaos.num_samples, 20_000);
        assert_eq!(config.chaos.initial_condition, [1.0, 1.0, 1.0]);
        assert_eq!(config.quantum.omega, 5.0);
        assert_eq!(config.quantum.num_samples, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad_config = Config::default();
        bad_config.chaos.t_end = -1.0;
        assert!(bad_config.validate().is_err());
    }

    #[test]
    fn test_to_params_matches_default_params() {
        let params = Config::default().to_params();
        let reference = PipelineParams::default();
        assert_eq!(params.drive, reference.drive);
        assert_eq!(params.span, reference.span);
        assert_eq!(params.integrator, reference.integrator);
        assert_eq!(params.coupling, reference.coupling);
        assert_eq!(params.solver, reference.solver);
        assert_eq!(params.quantum_times, reference.quantum_times);
        assert_eq!(params.gates.len(), 10);
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
chaos:
  sigma: 12.0
  t_end: 20.0
quantum:
  omega: 3.5
  num_samples: 50
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.chaos.sigma, 12.0);
        assert_eq!(config.chaos.t_end, 20.0);
        assert_eq!(config.quantum.omega, 3.5);
        assert_eq!(config.quantum.num_samples, 50);
        // Unset fields keep their defaults
        assert_eq!(config.chaos.rho, 28.0);
        assert_eq!(config.quantum.relaxation_coupling, 1e3);

        let params = config.to_params();
        assert_eq!(params.span.end, 20.0);
        assert_eq!(params.quantum_times.len(), 50);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_qubitos_chaos_test.yaml");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.chaos.sigma, 10.0);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();

        let result = Config::load(Some(f.path()));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.chaos.amplitude, 1000.0);
        assert_eq!(parsed.limits.max_trajectory_samples, 1_000_000);
    }

    #[test]
    fn test_env_override_amplitude() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_CHAOS_AMPLITUDE", "250.5");
        config.apply_env_overrides();
        assert_eq!(config.chaos.amplitude, 250.5);
        std::env::remove_var("QUBITOS_CHAOS_AMPLITUDE");
    }

    #[test]
    fn test_env_override_frequency() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_CHAOS_FREQUENCY", "60");
        config.apply_env_overrides();
        assert_eq!(config.chaos.frequency, 60.0);
        std::env::remove_var("QUBITOS_CHAOS_FREQUENCY");
    }

    #[test]
    fn test_env_override_samples() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_CHAOS_SAMPLES", "512");
        config.apply_env_overrides();
        assert_eq!(config.chaos.num_samples, 512);

        // Unparseable values are ignored
        std::env::set_var("QUBITOS_CHAOS_SAMPLES", "many");
        config.apply_env_overrides();
        assert_eq!(config.chaos.num_samples, 512);
        std::env::remove_var("QUBITOS_CHAOS_SAMPLES");
    }

    #[test]
    fn test_env_override_tolerances() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_CHAOS_RTOL", "1e-6");
        std::env::set_var("QUBITOS_CHAOS_ATOL", "1e-9");
        config.apply_env_overrides();
        assert_eq!(config.chaos.rtol, 1e-6);
        assert_eq!(config.chaos.atol, 1e-9);
        std::env::remove_var("QUBITOS_CHAOS_RTOL");
        std::env::remove_var("QUBITOS_CHAOS_ATOL");
    }

    #[test]
    fn test_env_override_logging() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_LOG_LEVEL", "debug");
        std::env::set_var("QUBITOS_LOG_FORMAT", "json");
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        std::env::remove_var("QUBITOS_LOG_LEVEL");
        std::env::remove_var("QUBITOS_LOG_FORMAT");
    }

    #[test]
    fn test_validate_sample_limit() {
        let mut config = Config::default();
        config.chaos.num_samples = config.limits.max_trajectory_samples + 1;
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("chaos.num_samples"));
    }

    #[test]
    fn test_validate_step_budget_limit() {
        let mut config = Config::default();
        config.chaos.max_steps = config.limits.max_integrator_steps + 1;
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("max_integrator_steps"));
    }

    #[test]
    fn test_validate_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        let msg = format!("{}", config.validate().unwrap_err());
        assert!(msg.contains("logging.format"));
    }

    #[test]
    fn test_validate_non_finite_coupling() {
        let mut config = Config::default();
        config.quantum.drive_coupling = f64::NAN;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_resource_limits_defaults() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.max_trajectory_samples, 1_000_000);
        assert_eq!(limits.max_evolution_samples, 100_000);
        assert_eq!(limits.max_integrator_steps, 50_000_000);
        assert_eq!(limits.max_substeps, 100_000_000);
    }
}
