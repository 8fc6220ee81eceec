// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS chaos coupling CLI
//!
//! Runs the chaos → open-system qubit → gates → fusion pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Reference run with a text summary
//! qubit-os-chaos run
//!
//! # Custom drive, JSON export on stdout
//! qubit-os-chaos run --amplitude 500 --frequency 60 --format json
//!
//! # Show or check the effective configuration
//! qubit-os-chaos config --config /path/to/config.yaml
//! qubit-os-chaos validate
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_chaos::{config::Config, pipeline::run_pipeline, PipelineReport, Result, VERSION};

/// QubitOS chaos-to-qubit coupling pipeline
#[derive(Parser)]
#[command(name = "qubit-os-chaos")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Couple a driven chaotic oscillator to an open-system qubit model")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "QUBITOS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline
    Run {
        /// Drive amplitude A
        #[arg(long)]
        amplitude: Option<f64>,

        /// Drive frequency in Hz
        #[arg(long)]
        frequency: Option<f64>,

        /// Number of trajectory samples
        #[arg(long)]
        samples: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Run {
            amplitude,
            frequency,
            samples,
            format,
        } => {
            if let Some(a) = amplitude {
                config.chaos.amplitude = a;
            }
            if let Some(f) = frequency {
                config.chaos.frequency = f;
            }
            if let Some(n) = samples {
                config.chaos.num_samples = n;
            }
            config.validate()?;

            info!(
                version = VERSION,
                amplitude = config.chaos.amplitude,
                frequency = config.chaos.frequency,
                samples = config.chaos.num_samples,
                "Starting coupling pipeline"
            );

            let report = match run_pipeline(&config.to_params()) {
                Ok(report) => report,
                Err(e) => {
                    error!(stage = e.stage(), error = %e, "Pipeline failed");
                    eprintln!("Pipeline failed during {}: {}", e.stage(), e);
                    std::process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report.export())?);
                }
                OutputFormat::Text => print_summary(&report),
            }
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr so stdout stays
/// machine-readable.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn print_summary(report: &PipelineReport) {
    let coupling = &report.coupling;
    println!("Coupling ratio:      {:.6}", coupling.ratio);
    println!("  driven variance:   {:.6}", coupling.driven_variance);
    println!("  baseline variance: {:.6}", coupling.baseline_variance);
    println!(
        "Trajectory:          {} samples, {} accepted / {} rejected steps",
        report.driven.len(),
        report.driven.accepted_steps(),
        report.driven.rejected_steps()
    );
    println!(
        "Evolution:           {} samples, {} RK4 substeps",
        report.evolution.len(),
        report.evolution.substeps
    );
    if let Some(p) = report.evolution.purities().last() {
        println!("  final purity:      {:.6}", p);
    }
    println!("Gates composed:      {}", report.net_unitary.gate_count());
    let probs = report.final_state.probabilities();
    println!(
        "Final probabilities: [{}]",
        probs
            .iter()
            .map(|p| format!("{:.6}", p))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Fusion strength:     {:.6}", report.fusion_strength);
}
