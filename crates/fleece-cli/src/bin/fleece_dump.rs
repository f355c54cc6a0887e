//! `fleece-dump` — print a Fleece record as JSON.
//!
//! Usage:
//!   fleece-dump [--shared-keys HEADER] [--offset N] [--wide] [--compact] RECORD
//!
//! `RECORD` may be `-` to read from stdin.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use fleece::{DecodeOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};
use fleece_cli::{dump, read_input, CliError, DumpOptions};

#[derive(Parser)]
#[command(name = "fleece-dump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decode a Fleece-encoded record and print it as JSON", long_about = None)]
struct Cli {
    /// Record buffer to decode, or `-` for stdin
    record: String,
    /// Buffer holding the store's shared-key table
    #[arg(short = 'k', long, env = "FLEECE_SHARED_KEYS")]
    shared_keys: Option<String>,
    /// Decode the value at this byte offset instead of the root
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<isize>,
    /// Read a pointer at --offset as 4 bytes
    #[arg(long)]
    wide: bool,
    /// Maximum nesting of collections and pointers
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Maximum number of values to decode before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: usize,
    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("FLEECE_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let record = read_input(&cli.record)?;
    let header = cli.shared_keys.as_deref().map(read_input).transpose()?;
    let options = DumpOptions {
        offset: cli.offset,
        wide: cli.wide,
        decode: DecodeOptions {
            max_depth: cli.max_depth,
            max_nodes: cli.max_nodes,
        },
        compact: cli.compact,
    };
    dump(&record, header.as_deref(), &options)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(json) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{json}") {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
