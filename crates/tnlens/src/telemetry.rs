//! Tracing setup for the CLI.
//!
//! Diagnostics go to stderr at the given default level; `RUST_LOG`
//! overrides the filter and `TNLENS_LOG` redirects output to an
//! append-only file, keeping stderr clean when captures are scanned
//! under a test harness that inspects it.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Keeps the log-file worker alive for the life of the process; dropping
/// it flushes buffered diagnostics.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let to_file = file_writer();
    let ansi = to_file.is_none() && std::io::stderr().is_terminal();
    let (writer, guard) = match to_file {
        Some((writer, guard)) => (writer, Some(guard)),
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init();

    TelemetryGuard { _guard: guard }
}

/// The `TNLENS_LOG` file writer, when the variable is set and the file
/// opens. A file that cannot be opened falls back to stderr.
fn file_writer() -> Option<(BoxMakeWriter, WorkerGuard)> {
    let path = PathBuf::from(std::env::var_os("TNLENS_LOG")?);
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Some((BoxMakeWriter::new(non_blocking), guard))
        }
        Err(err) => {
            eprintln!(
                "Warning: failed to open log file {}: {}",
                path.display(),
                err
            );
            None
        }
    }
}
