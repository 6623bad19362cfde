//! winevent-normalize: turns rendered Windows Event Log XML documents into
//! normalized JSON lines.
//!
//! Entry point: initialises structured logging, then normalizes each input
//! document. A document that fails to decode is logged and skipped so the
//! rest of the batch still goes through.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::Layer as _;

use winevent_normalize::util::constants;
use winevent_normalize::util::error::EventNormError;
use winevent_normalize::{normalize, InterpreterRegistry};

/// Normalize rendered Windows Event Log XML into JSON lines.
#[derive(Debug, Parser)]
#[command(name = constants::APP_NAME, version)]
struct Cli {
    /// Event XML files, one document each. Reads stdin when empty or `-`.
    files: Vec<PathBuf>,

    /// Pass every message through without channel-specific interpretation.
    #[arg(long)]
    no_interpreters: bool,

    /// Pretty-print each entry instead of writing one line per entry.
    #[arg(long)]
    pretty: bool,

    /// Append debug-level diagnostics to this file. Defaults to
    /// `winevent-normalize.log` under `$WINEVENT_NORMALIZE_LOG_DIR` when set.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More stderr output: `-v` for debug, `-vv` for trace. `RUST_LOG`
    /// takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let log_file = cli.log_file.clone().or_else(default_log_file);
    init_logging(cli.verbose, log_file.as_deref());

    tracing::debug!("{} v{} starting", constants::APP_NAME, constants::APP_VERSION);

    match run(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), EventNormError> {
    let interpreters = if cli.no_interpreters {
        InterpreterRegistry::empty()
    } else {
        InterpreterRegistry::default()
    };

    let stdin_only = [PathBuf::from(constants::STDIN_PATH)];
    let inputs: &[PathBuf] = if cli.files.is_empty() {
        &stdin_only
    } else {
        &cli.files
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let (mut written, mut skipped) = (0usize, 0usize);

    for path in inputs {
        let xml = read_input(path)?;
        match normalize(&xml, &interpreters) {
            Ok(entry) => {
                if cli.pretty {
                    serde_json::to_writer_pretty(&mut out, &entry)?;
                } else {
                    serde_json::to_writer(&mut out, &entry)?;
                }
                out.write_all(b"\n")?;
                written += 1;
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    "Skipping {}: {} [{}]",
                    path.display(),
                    e.root_cause(),
                    e.document_preview().unwrap_or_default()
                );
            }
        }
    }

    // Explicit flush so I/O errors are not silently swallowed by BufWriter::drop.
    out.flush()?;

    tracing::info!("Normalized {written} events, skipped {skipped}");
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, EventNormError> {
    if path.as_os_str() == constants::STDIN_PATH {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}

/// `$WINEVENT_NORMALIZE_LOG_DIR/winevent-normalize.log`, if the variable is
/// set and the directory can be created.
fn default_log_file() -> Option<PathBuf> {
    let dir = PathBuf::from(std::env::var_os(constants::LOG_DIR_ENV)?);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(constants::LOG_FILE_NAME))
}

/// Open `path` for appending, first moving it aside to `<path>.old` once it
/// has grown past the size limit.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    let oversized = std::fs::metadata(path)
        .is_ok_and(|meta| meta.len() > constants::MAX_LOG_FILE_SIZE);
    if oversized {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".old");
        std::fs::rename(path, backup)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber: stderr at the `-v` level unless
/// `RUST_LOG` says otherwise, plus a debug-level file sink when one opens.
fn init_logging(verbosity: u8, log_file: Option<&Path>) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (file, open_error) = match log_file.map(open_log_file).transpose() {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .with(file.map(|file| {
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::DEBUG)
        }))
        .init();

    if let (Some(path), Some(e)) = (log_file, open_error) {
        tracing::warn!("Cannot open log file {}: {e}", path.display());
    }
}
