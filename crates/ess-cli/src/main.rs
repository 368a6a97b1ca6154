/// ESS command-line tool: inspect and validate TES3 `.ess` save files.
///
/// # Command overview
///
/// ```text
/// ess <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print every decoded record of a save file
///   validate   Check a save file for structural size consistency
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder activity to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Success                                        |
/// | 1    | Error (I/O failure, malformed save file, etc.) |
///
/// All error details and logs are written to stderr so stdout can be piped
/// cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod cmd_inspect;
mod cmd_validate;
mod options;

use options::DecodeOptions;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Reader for TES3 (Morrowind) `.ess` save files.
#[derive(Parser)]
#[command(name = "ess", version, about = "TES3 save file inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder activity (records, stop reason) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every decoded record of a save file.
    Inspect(InspectArgs),
    /// Check a save file for structural size consistency.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `ess inspect`.
///
/// ```text
/// ┌─────────────┬─────────────────────────────────────────────────────────┐
/// │ Flag        │ Effect                                                  │
/// ├─────────────┼─────────────────────────────────────────────────────────┤
/// │ --json      │ Print records and stop reason as JSON                   │
/// │ --record N  │ Show only the record at index N                         │
/// │ --show-hex  │ Hex dump opaque and mismatched subrecord bodies         │
/// └─────────────┴─────────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the `.ess` file to inspect.
    pub file: PathBuf,

    #[command(flatten)]
    pub decode: DecodeOptions,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Inspect only the record at this zero-based index.
    #[arg(long)]
    pub record: Option<usize>,

    /// Show a hex dump of opaque and mismatched subrecord bodies.
    #[arg(long)]
    pub show_hex: bool,
}

/// Arguments for `ess validate`.
///
/// Decodes the whole file with subrecord layout checks made fatal and
/// reports either a set of `✓` lines or a `✗` diagnostic.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the `.ess` file to validate.
    pub file: PathBuf,

    #[command(flatten)]
    pub decode: DecodeOptions,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
