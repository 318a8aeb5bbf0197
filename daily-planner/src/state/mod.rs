//! Upload server state
//!
//! Shared read-only across requests: configuration and the image host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PlannerConfig;
use crate::storage::{host_from_config, ImageHost, StorageResult};

/// Application state of the upload server
///
/// # Example
///
/// ```rust,no_run
/// use daily_planner::{config::PlannerConfig, state::AppState};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = AppState::from_config(PlannerConfig::load()?)?;
/// let app = daily_planner::server::router(state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AppState {
    config: Arc<PlannerConfig>,
    host: Arc<dyn ImageHost>,
    served_dir: Option<PathBuf>,
}

impl AppState {
    /// Create state around an explicit host
    ///
    /// `served_dir` is the directory served under `/uploads`, if any.
    #[must_use]
    pub fn new(config: PlannerConfig, host: Arc<dyn ImageHost>, served_dir: Option<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            host,
            served_dir,
        }
    }

    /// Create state with the host selected in configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the selected storage backend is misconfigured
    pub fn from_config(config: PlannerConfig) -> StorageResult<Self> {
        let configured = host_from_config(&config)?;
        Ok(Self::new(config, configured.host, configured.served_dir))
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Get the image host
    #[must_use]
    pub fn host(&self) -> &dyn ImageHost {
        self.host.as_ref()
    }

    /// Directory served under `/uploads`
    #[must_use]
    pub fn served_dir(&self) -> Option<&Path> {
        self.served_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let state = AppState::from_config(PlannerConfig::default()).unwrap();
        assert_eq!(state.host().name(), "disk");
        assert_eq!(state.served_dir(), Some(Path::new("./uploads")));
        assert_eq!(state.config().server.port, 3000);
    }
}
