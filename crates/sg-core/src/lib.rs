//! Scan Gate Core
//!
//! This crate turns an untrusted scan request (a target identifier plus a
//! free-text flag string) into a bounded sqlmap invocation, or into a
//! structured rejection before any process is spawned.

pub mod audit;
pub mod command;
pub mod config;
pub mod gate;
pub mod policy;
pub mod registry;

use thiserror::Error;

pub use command::ScanCommand;
pub use config::{GateConfig, TargetEntry};
pub use gate::{ErrorKind, GateError, ScanGate, ScanOutcome, ScanRequest};
pub use policy::{tokenize_flags, FlagPolicy};
pub use registry::TargetRegistry;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
