//! External plugin chain.
//!
//! Each plugin is an executable invoked with the path of a JSON transport
//! document (see [`crate::tree::transport`]) as its only argument. A plugin
//! that exits successfully must leave a document of the same shape at that
//! path; it becomes the tree the next plugin sees. A plugin that exits with
//! a failure status is recorded and skipped. Launch failures, timeouts and
//! transport read/write failures abort the build.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::Configuration;
use crate::error::{EmitsError, PluginError, Result};
use crate::tree::{TransportDocument, Tree};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of running the plugin chain
#[derive(Debug, Clone)]
pub struct PluginOutcome {
    pub tree: Tree,
    pub errors: Vec<PluginError>,
}

#[derive(Debug, Clone)]
pub struct PluginRunner {
    plugins: Vec<PathBuf>,
    timeout: Duration,
}

impl PluginRunner {
    pub fn new(plugins: Vec<PathBuf>, timeout: Duration) -> Self {
        Self { plugins, timeout }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(
            config.plugins.iter().map(|p| p.path.clone()).collect(),
            config.plugin_timeout(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Runs every plugin in order, each one seeing the previous one's output
    pub fn run(&self, tree: Tree, source: &str, cancel: &CancellationToken) -> Result<PluginOutcome> {
        let mut outcome = PluginOutcome {
            tree,
            errors: Vec::new(),
        };
        if self.plugins.is_empty() {
            return Ok(outcome);
        }

        let transport = tempfile::Builder::new()
            .prefix("emits-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| {
                EmitsError::PipelineIo(format!("Could not create transport document: {}", e))
            })?
            .into_temp_path();
        let transport_path: &Path = &transport;

        for plugin in &self.plugins {
            if cancel.is_cancelled() {
                return Err(EmitsError::Cancelled);
            }

            TransportDocument::from_tree(&outcome.tree, source)
                .write(transport_path)
                .map_err(|e| {
                    EmitsError::PipelineIo(format!(
                        "Could not write {}: {}",
                        transport_path.display(),
                        e
                    ))
                })?;

            match self.invoke(plugin, transport_path)? {
                Some(error) => {
                    tracing::warn!("{}", error);
                    outcome.errors.push(error);
                }
                None => {
                    let document = TransportDocument::read(transport_path).map_err(|e| {
                        EmitsError::PipelineIo(format!(
                            "Could not read output of plugin {}: {}",
                            plugin.display(),
                            e
                        ))
                    })?;
                    outcome.tree = document.into_tree();
                    tracing::debug!("plugin {} finished", plugin.display());
                }
            }
        }

        Ok(outcome)
    }

    /// Runs one plugin to completion. `Ok(Some(_))` means it ran and failed.
    fn invoke(&self, plugin: &Path, transport_path: &Path) -> Result<Option<PluginError>> {
        tracing::debug!("running plugin {}", plugin.display());

        let mut child = Command::new(plugin)
            .arg(transport_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EmitsError::PluginLaunch {
                path: plugin.to_path_buf(),
                source: e,
            })?;

        let started = Instant::now();
        loop {
            match child.try_wait()? {
                Some(status) if status.success() => return Ok(None),
                Some(status) => return Ok(Some(PluginError::from_status(plugin, status))),
                None if started.elapsed() >= self.timeout => {
                    // Already-exited races are fine; the status is discarded
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(EmitsError::PluginTimeout {
                        path: plugin.to_path_buf(),
                        timeout: self.timeout,
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}
