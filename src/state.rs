//! Shared application state.

use crate::config::ServerConfig;
use crate::optimizer::{Optimizer, SubprocessOptimizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Read-only state shared by every request. Nothing here is mutated after
/// startup, so requests never contend on it.
#[derive(Clone)]
pub struct AppState {
    pub optimizer: Arc<dyn Optimizer>,
    optimizer_path: Arc<PathBuf>,
    timeout: Duration,
}

impl AppState {
    pub fn new(optimizer: Arc<dyn Optimizer>, optimizer_path: PathBuf, timeout: Duration) -> Self {
        Self {
            optimizer,
            optimizer_path: Arc::new(optimizer_path),
            timeout,
        }
    }

    /// State that runs the configured executable as a subprocess.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Arc::new(SubprocessOptimizer),
            config.optimizer_path.clone(),
            config.timeout,
        )
    }

    pub fn optimizer_path(&self) -> &Path {
        &self.optimizer_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
