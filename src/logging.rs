//! Log sink selection and subscriber setup.
//!
//! The interactive shell owns the terminal, so its logs go to a file. One-shot
//! commands log to stderr. `RUST_LOG` overrides the default `info` level.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "db-sift";
const LOG_FILE_NAME: &str = "sift.log";
const DEFAULT_LEVEL: &str = "info";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// A log file, truncated when logging starts.
    File(PathBuf),
    Stderr,
}

impl LogTarget {
    /// The default log file when `to_file` is set, stderr otherwise.
    pub fn choose(to_file: bool) -> Self {
        if to_file {
            Self::File(default_log_path())
        } else {
            Self::Stderr
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Installs the global subscriber for this target.
    ///
    /// Fails if the log file cannot be created. Nothing is installed then, so
    /// shell output is never mixed with log lines.
    pub fn init(&self) -> io::Result<()> {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
        match self {
            Self::File(path) => builder
                .with_writer(open_log_file(path)?)
                .with_ansi(false)
                .init(),
            Self::Stderr => builder.with_writer(io::stderr).init(),
        }
        Ok(())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Creates `path` and its missing parent directories, truncating an old log.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// `db-sift/sift.log` under the platform state directory, then the config
/// directory, then the temp directory.
pub fn default_log_path() -> PathBuf {
    [dirs::state_dir(), dirs::config_dir()]
        .into_iter()
        .flatten()
        .next()
        .map(|base| base.join(APP_DIR).join(LOG_FILE_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME))
}
