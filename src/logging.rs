//! Log setup
//!
//! The terminal UI owns the screen in raw mode, so log records go to a file.
//! Headless runs without `--log-file` log to stderr instead.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_PATH: &str = "/tmp/specan.log";

/// Owner read/write only
const LOG_MODE: u32 = 0o600;

/// Open the log file, creating it private or truncating an existing one
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(LOG_MODE)
        .open(path)
        .or_else(|_| OpenOptions::new().write(true).truncate(true).open(path))
}

/// Install the global logger. `RUST_LOG` overrides the `info` default.
pub fn init(log_file: Option<&Path>, headless: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    let path = match (log_file, headless) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, true) => None,
        (None, false) => Some(PathBuf::from(DEFAULT_LOG_PATH)),
    };

    if let Some(path) = path {
        match open_log_file(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                // Nowhere visible to log to; stay quiet rather than corrupt the screen
                if !headless {
                    builder.filter_level(log::LevelFilter::Off);
                }
                eprintln!("specan: cannot open log file {}: {}", path.display(), e);
            }
        }
    }

    // A second init (tests) is harmless
    let _ = builder.try_init();
}
