//! Lockcheck CLI
//!
//! # Usage
//!
//! ```bash
//! # Check a lowered program against contracts extracted from its sources
//! lockcheck check --program bank.program.json --source bank.go
//!
//! # Fail the build on any warning, JSON output
//! lockcheck check --program bank.program.json --source bank.go --format json --deny-warnings
//!
//! # Show the contracts found in annotated sources
//! lockcheck contracts --source bank.go
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lockcheck_ir::config::AnalysisConfig;
use lockcheck_ir::{LockcheckEngine, ReportFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lockcheck")]
#[command(about = "Lockcheck - verify @requires/@guarded_by lock contracts", long_about = None)]
struct Cli {
    /// Verbose logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a program against its lock contracts
    Check {
        /// Program model (JSON)
        #[arg(short, long)]
        program: PathBuf,

        /// Annotated Go source files
        #[arg(short, long = "source")]
        sources: Vec<PathBuf>,

        /// Serialized contract registry (JSON)
        #[arg(long)]
        contracts: Option<PathBuf>,

        /// Analysis configuration (YAML, `version: 1`)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Exit with status 1 when any diagnostic is reported
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print the contract registry extracted from Go sources
    Contracts {
        /// Annotated Go source files
        #[arg(short, long = "source", required = true)]
        sources: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("lockcheck_ir=debug"),
        _ => EnvFilter::new("lockcheck_ir=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Check {
            program,
            sources,
            contracts,
            config,
            format,
            deny_warnings,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::from_yaml(path)?,
                None => AnalysisConfig::default(),
            };
            let mut engine = LockcheckEngine::new(config)?.with_go_sources(sources);
            if let Some(path) = contracts {
                engine = engine.with_contracts_file(path);
            }

            let report = engine.run_program_file(program)?;
            print!("{}", report.render(format)?);

            if deny_warnings && report.has_diagnostics() {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Contracts { sources, format } => {
            let registry = LockcheckEngine::new(AnalysisConfig::default())?
                .with_go_sources(sources)
                .build_registry()?;
            match format {
                ReportFormat::Text => println!("{}", registry),
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&registry)?),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
