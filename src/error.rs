use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitsError {
    #[error("Could not open {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not launch plugin {path}: {source}")]
    PluginLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin {path} timed out after {timeout:?}")]
    PluginTimeout { path: PathBuf, timeout: Duration },

    #[error("Plugin transport error: {0}")]
    PipelineIo(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A plugin that ran but did not succeed. Collected, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Plugin {path} exited with {status}")]
pub struct PluginError {
    pub path: PathBuf,
    pub status: String,
}

impl PluginError {
    pub fn from_status(path: impl Into<PathBuf>, status: ExitStatus) -> Self {
        let status = match status.code() {
            Some(code) => format!("status {}", code),
            None => "termination by signal".to_string(),
        };
        Self {
            path: path.into(),
            status,
        }
    }
}

pub type Result<T> = std::result::Result<T, EmitsError>;
