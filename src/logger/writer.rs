//! Access log writer
//!
//! Thread-safe sink for access log lines: stdout, or an append-only file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global access log sink
static ACCESS_WRITER: OnceLock<AccessWriter> = OnceLock::new();

/// Log output target
enum AccessWriter {
    /// Write to stdout
    Stdout,
    /// Write to file
    File(Mutex<File>),
}

impl AccessWriter {
    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{message}");
            }
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global access log sink
///
/// Returns error if the log file cannot be opened or the sink was already set.
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let writer = match access_log_file {
        Some(path) => AccessWriter::File(Mutex::new(open_log_file(path)?)),
        None => AccessWriter::Stdout,
    };
    ACCESS_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Access log writer already initialized",
        )
    })
}

/// Write one access log line; falls back to stdout before `init`
pub fn write_access(message: &str) {
    match ACCESS_WRITER.get() {
        Some(writer) => writer.write_line(message),
        None => AccessWriter::Stdout.write_line(message),
    }
}
