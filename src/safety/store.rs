//! Durable backing for `SafetyState`
//!
//! Stores assume a single writer. Nothing here locks across processes; run one
//! trader per state file.

use super::SafetyState;
use crate::error::{Result, ScannerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<SafetyState>>;

    async fn save(&self, state: &SafetyState) -> Result<()>;
}

/// One pretty-printed JSON file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> Result<Option<SafetyState>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!("No state file at {}", self.path.display());
            return Ok(None);
        }

        let text = tokio::fs::read_to_string(&self.path).await?;
        let state = serde_json::from_str(&text).map_err(|e| {
            ScannerError::StateStore(format!("corrupt state file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(state))
    }

    async fn save(&self, state: &SafetyState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

/// In-process store, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<SafetyState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SafetyState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub fn snapshot(&self) -> Option<SafetyState> {
        self.state.lock().clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<SafetyState>> {
        Ok(self.state.lock().clone())
    }

    async fn save(&self, state: &SafetyState) -> Result<()> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }
}
