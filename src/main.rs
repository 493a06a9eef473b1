//! Profile Parser CLI
//!
//! Reconstructs request traces from server profiling logs.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use is_terminal::IsTerminal;
use profile_parser::commands::{execute_reconstruct, validate_args, ReconstructArgs};
use profile_parser::output::OutputFormat;
use profile_parser::utils::config::{DEFAULT_TOP_OPERATIONS, FORMAT_ENV_VAR};
use profile_parser::utils::error::{InputError, OutputError, ParseError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Profile Parser - rebuild request traces from profiling logs
#[derive(Parser, Debug)]
#[command(name = "profile-parser")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log files to parse (.gz files are decompressed)
    #[arg(value_name = "LOG_FILE")]
    inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human, env = FORMAT_ENV_VAR)]
    format: OutputFormat,

    /// Force colored output
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, overrides_with = "color")]
    no_color: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of rows per summary table
    #[arg(long, default_value_t = DEFAULT_TOP_OPERATIONS)]
    top: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Decide once whether to emit colors
    fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            self.output.is_none() && std::io::stdout().is_terminal()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR {}: {:#}", error_kind(&err), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let color = cli.use_color();
    if color {
        // colored consults the environment on its own; the CLI decision wins
        colored::control::set_override(true);
    }

    let args = ReconstructArgs {
        inputs: cli.inputs,
        format: cli.format,
        color,
        output: cli.output,
        top: cli.top,
    };

    validate_args(&args)?;
    execute_reconstruct(args)
}

/// Name of the most specific known error in the chain
fn error_kind(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ParseError>() {
            return e.kind();
        }
        if cause.is::<InputError>() {
            return "InputError";
        }
        if cause.is::<OutputError>() {
            return "OutputError";
        }
        if cause.is::<std::io::Error>() {
            return "IOError";
        }
    }
    "Error"
}
