//! rxtrace CLI
//!
//! # Usage
//!
//! ```bash
//! # Instrument a source tree into a mirrored output directory
//! rxtrace instrument src --out-dir build/instrumented
//!
//! # Show what would be embedded for one file
//! rxtrace inspect src/app/app.component.ts
//!
//! # Print the effective configuration
//! rxtrace config --config rxtrace.yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rxtrace_ir::config::InstrumentationConfig;
use rxtrace_ir::usecases::{FileReport, InstrumentationService};
use rxtrace_ir::ValidatedConfig;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rxtrace")]
#[command(about = "Instrument RxJS streams with telemetry wrappers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instrument files and directories
    Instrument {
        /// Files or directories to instrument
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output directory (files are rewritten in place when omitted)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Print construct metadata and diagnostics of one file as JSON
    Inspect {
        file: PathBuf,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    Config {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct Inspection<'a> {
    file: &'a Path,
    transformed: bool,
    constructs: &'a [rxtrace_ir::InstrumentedConstruct],
    diagnostics: &'a [rxtrace_ir::Diagnostic],
    dependencies: &'a [rxtrace_ir::Dependency],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ValidatedConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => InstrumentationConfig::from_yaml(path)?,
        None => InstrumentationConfig::default(),
    };
    Ok(config.validate()?)
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Instrument {
            paths,
            out_dir,
            config,
            dry_run,
        } => {
            let service =
                InstrumentationService::new(load_config(config.as_deref())?).with_dry_run(dry_run);
            let report = service.instrument_paths(&paths, out_dir.as_deref());

            for file in &report.files {
                match file {
                    FileReport::Instrumented {
                        path, diagnostics, ..
                    } => {
                        for diagnostic in diagnostics {
                            println!(
                                "{}:{}:{}: {}",
                                path.display(),
                                diagnostic.line,
                                diagnostic.column,
                                diagnostic.message
                            );
                        }
                    }
                    FileReport::Skipped { path, reason } => {
                        println!("{}: skipped ({})", path.display(), reason);
                    }
                    FileReport::Failed { path, error } => {
                        println!("{}: failed: {}", path.display(), error);
                    }
                }
            }
            println!(
                "{} instrumented, {} skipped, {} failed in {:?}",
                report.instrumented_count(),
                report.skipped_count(),
                report.failed_count(),
                report.duration
            );

            Ok(if report.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Inspect { file, config } => {
            let service = InstrumentationService::new(load_config(config.as_deref())?);
            let source = std::fs::read_to_string(&file)?;
            let result = service.instrument_source(&source, &file)?;

            let inspection = Inspection {
                file: &file,
                transformed: result.transformed,
                constructs: &result.constructs,
                diagnostics: &result.diagnostics,
                dependencies: &result.dependencies,
            };
            println!("{}", serde_json::to_string_pretty(&inspection)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { config } => {
            print!("{}", load_config(config.as_deref())?.to_yaml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
