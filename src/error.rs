// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the coupling pipeline.

use std::fmt;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// ODE integration failed
    Integration(IntegrationError),
    /// Baseline trajectory has no spread, the coupling ratio is undefined
    DegenerateBaseline { variance: f64 },
    /// Coupling ratio is non-positive or non-finite
    InvalidCouplingRatio(f64),
    /// Operator/state dimensions disagree
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },
    /// Master-equation evolution failed
    Evolution(EvolutionError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
    /// Error raised inside a named pipeline stage
    Stage {
        stage: PipelineStage,
        source: Box<Error>,
    },
}

/// Stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ChaosIntegration,
    ChaosMetric,
    QuantumEvolution,
    GateComposition,
    Fusion,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ChaosIntegration => "chaos-integration",
            PipelineStage::ChaosMetric => "chaos-metric",
            PipelineStage::QuantumEvolution => "quantum-evolution",
            PipelineStage::GateComposition => "gate-composition",
            PipelineStage::Fusion => "fusion",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Attribute this error to `stage`. An error that already carries a
    /// stage keeps it.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The error with any stage attribution stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the pipeline stage the error was raised in.
    ///
    /// Errors that never passed through a pipeline stage fall back to a name
    /// derived from their kind.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Stage { stage, .. } => stage.as_str(),
            Error::Config(_) => "configuration",
            Error::Integration(_) => "chaos-integration",
            Error::DegenerateBaseline { .. } => "chaos-metric",
            Error::InvalidCouplingRatio(_) | Error::Evolution(_) => "quantum-evolution",
            Error::DimensionMismatch { .. } => "dimension-check",
            Error::Validation(_) => "validation",
            Error::Io(_) | Error::Serialization(_) => "output",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Integration(e) => write!(f, "Integration failure: {}", e),
            Error::DegenerateBaseline { variance } => write!(
                f,
                "Degenerate baseline: y-component variance is {:e}, coupling ratio undefined",
                variance
            ),
            Error::InvalidCouplingRatio(r) => {
                write!(f, "Invalid coupling ratio: {} (must be finite and > 0)", r)
            }
            Error::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "Dimension mismatch in {}: expected {}, got {}",
                context, expected, actual
            ),
            Error::Evolution(e) => write!(f, "Evolution failure: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Stage { source, .. } => write!(f, "{}", source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Integration(e) => Some(e),
            Error::Evolution(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<IntegrationError> for Error {
    fn from(e: IntegrationError) -> Self {
        Error::Integration(e)
    }
}

impl From<EvolutionError> for Error {
    fn from(e: EvolutionError) -> Self {
        Error::Evolution(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Adaptive ODE solver failures.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// Step size collapsed below the floating-point resolution at `t`
    StepSizeUnderflow { t: f64, step: f64 },
    /// More step attempts than the configured budget
    StepBudgetExceeded { max_steps: usize, t: f64 },
    /// State became NaN or infinite
    NonFinite { t: f64 },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationError::StepSizeUnderflow { t, step } => {
                write!(f, "step size {:e} underflowed at t={}", step, t)
            }
            IntegrationError::StepBudgetExceeded { max_steps, t } => {
                write!(f, "step budget of {} exhausted at t={}", max_steps, t)
            }
            IntegrationError::NonFinite { t } => write!(f, "non-finite state at t={}", t),
        }
    }
}

impl std::error::Error for IntegrationError {}

/// Master-equation solver failures.
#[derive(Debug, Clone, PartialEq)]
pub enum EvolutionError {
    /// The grid would need more RK4 substeps than the configured budget
    StepBudgetExceeded { max_substeps: usize, required: usize },
    /// Density matrix became NaN or infinite
    NonFinite { t: f64 },
    /// Trace left the tolerance band around 1
    TraceDrift { t: f64, trace: f64 },
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvolutionError::StepBudgetExceeded {
                max_substeps,
                required,
            } => write!(
                f,
                "substep budget exceeded: limit={}, required={}",
                max_substeps, required
            ),
            EvolutionError::NonFinite { t } => {
                write!(f, "non-finite density matrix at t={:e}", t)
            }
            EvolutionError::TraceDrift { t, trace } => {
                write!(f, "trace drifted to {} at t={:e}", trace, t)
            }
        }
    }
}

impl std::error::Error for EvolutionError {}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Physics constraint violated
    PhysicsConstraint(String),
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::PhysicsConstraint(msg) => {
                write!(f, "Physics constraint violated: {}", msg)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
