//! Logging bootstrap: stdout plus a plain-text file in the log directory

use crate::error::ServerError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "sqlmap-gate.log";

const DEFAULT_FILTER: &str = "sg_api=info,sg_core=info,sg_tools=info,audit=info,tower_http=info";

pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE)
}

pub fn init_logging(log_dir: &Path) -> Result<(), ServerError> {
    std::fs::create_dir_all(log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(log_dir))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))
}
