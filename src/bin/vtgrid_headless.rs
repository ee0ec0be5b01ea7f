//! vtgrid Headless Runner
//!
//! Feeds a captured session (file or stdin) through the terminal engine and
//! prints the resulting screen state as text or JSON.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vtgrid::{ConfigError, Terminal, TerminalConfig, VoidListener};

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("error reading {source_name}: {err}")]
    Input { source_name: String, err: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error serializing snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

struct Args {
    cols: Option<usize>,
    rows: Option<usize>,
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    format: OutputFormat,
    help: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("vtgrid-headless: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), RunError> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print_help();
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => TerminalConfig::load(path)?,
        None => TerminalConfig::default(),
    };
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    config.validate()?;

    let input = read_input(args.input.as_ref())?;
    tracing::debug!(bytes = input.len(), "input loaded");

    let mut term = Terminal::from_config(&config, VoidListener);
    term.process_data(&String::from_utf8_lossy(&input));

    let snapshot = term.snapshot();
    match args.format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.col);
            if !snapshot.title.is_empty() {
                println!("Title: {}", snapshot.title);
            }
            println!("---");
            print!("{}", snapshot.to_text());
            println!("---");
        }
        OutputFormat::Json => println!("{}", snapshot.to_json()?),
    }

    Ok(())
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, RunError> {
    let mut args = Args {
        cols: None,
        rows: None,
        config: None,
        input: None,
        format: OutputFormat::Text,
        help: false,
    };

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "-c" | "--cols" => args.cols = Some(parse_dimension(&arg, argv.next())?),
            "-r" | "--rows" => args.rows = Some(parse_dimension(&arg, argv.next())?),
            "--config" => {
                let path = argv
                    .next()
                    .ok_or_else(|| RunError::Usage("--config needs a path".to_string()))?;
                args.config = Some(PathBuf::from(path));
            }
            "-j" | "--json" => args.format = OutputFormat::Json,
            "-t" | "--text" => args.format = OutputFormat::Text,
            "-h" | "--help" => args.help = true,
            other if other.starts_with('-') => {
                return Err(RunError::Usage(format!("unknown option {}", other)));
            }
            other => {
                if args.input.is_some() {
                    return Err(RunError::Usage("only one input file allowed".to_string()));
                }
                args.input = Some(PathBuf::from(other));
            }
        }
    }

    Ok(args)
}

fn parse_dimension(flag: &str, value: Option<String>) -> Result<usize, RunError> {
    value
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| RunError::Usage(format!("{} needs a positive number", flag)))
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>, RunError> {
    match path {
        Some(path) => std::fs::read(path).map_err(|err| RunError::Input {
            source_name: path.display().to_string(),
            err,
        }),
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .map_err(|err| RunError::Input {
                    source_name: "stdin".to_string(),
                    err,
                })?;
            Ok(data)
        }
    }
}

fn print_help() {
    println!("vtgrid Headless Runner");
    println!();
    println!("Usage: vtgrid-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("      --config <FILE>  Load a JSON terminal configuration");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Set RUST_LOG=vtgrid=trace to see ignored sequences.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\033[31mWorld\\033[0m' | vtgrid-headless");
    println!("  vtgrid-headless -c 120 -r 40 session.log");
    println!("  vtgrid-headless --json < capture.bin > snapshot.json");
}
