//! Cirius CLI - compile or interpret Cirius programs.
//!
//! Two subcommands: `compile` translates a source file to C through the
//! three-address IR, `run` interprets it directly. Errors print on stdout
//! with their category prefix and the process exits non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cirius_drv::{compile_file, run_file, Result};

/// Compiler and interpreter for the Cirius language.
#[derive(Parser, Debug)]
#[command(name = "cirius")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler and interpreter for the Cirius language", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose stage diagnostics on stderr
    #[arg(short, long, global = true, env = "CIRIUS_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to C
    ///
    /// Without -o, the output path is the input path with its extension
    /// replaced by `.c`.
    Compile(CompileCommand),

    /// Interpret a source file
    ///
    /// The program's stdin and stdout are the process's.
    Run(RunCommand),
}

/// Arguments for the compile subcommand.
#[derive(Parser, Debug)]
struct CompileCommand {
    /// Input source file
    input: PathBuf,

    /// Output C file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug)]
struct RunCommand {
    /// Input source file
    input: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Route stage diagnostics to stderr, at debug level under --verbose.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Compile(args) => {
            let out_path = compile_file(&args.input, args.output.as_deref())?;
            tracing::info!("compiled {} -> {}", args.input.display(), out_path.display());
            Ok(())
        }
        Commands::Run(args) => run_file(&args.input),
    }
}
