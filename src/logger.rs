//! File-backed `log` sink.
//!
//! The terminal belongs to the editor UI, so records go to a file instead of
//! stderr.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

struct FileLogger {
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{}] {}: {}: {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Install the global logger writing to `path`.
///
/// The file is truncated on startup. Calling this again after a successful
/// init only adjusts the level.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    log::set_max_level(level);
    if LOGGER.get().is_some() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    writeln!(file, "=== gridedit log start ===")?;

    let logger = LOGGER.get_or_init(|| FileLogger {
        file: Mutex::new(file),
    });
    log::set_logger(logger).map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(())
}
