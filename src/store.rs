//! Workspace storage.
//!
//! A single JSON file maps workspace names to their records:
//!
//! ```json
//! {
//!   "workspaces": {
//!     "dev": { "name": "dev", "description": "", "apps": [] }
//!   }
//! }
//! ```
//!
//! A missing file reads as an empty store. Saving without `overwrite` is
//! conflict-checked rather than silently merging.

use crate::model::{InvalidWorkspace, Workspace};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from the workspace store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("workspace {0:?} not found")]
    NotFound(String),
    #[error("workspace {0:?} already exists (use overwrite to replace it)")]
    Conflict(String),
    #[error("workspace is invalid: {0}")]
    Invalid(#[from] InvalidWorkspace),
    #[error("store error: {0}")]
    Storage(String),
}

/// On-disk shape of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    workspaces: BTreeMap<String, Workspace>,
}

/// File-backed workspace collection, keyed by workspace name.
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreFile, StoreError> {
        if !self.path.exists() {
            debug!("store file {} absent, starting empty", self.path.display());
            return Ok(StoreFile::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            StoreError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            StoreError::Storage(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn write(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let contents = serde_json::to_string_pretty(file)
            .map_err(|e| StoreError::Storage(format!("failed to serialize store: {}", e)))?;
        std::fs::write(&self.path, contents).map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    /// Look up a workspace by name.
    pub fn get(&self, name: &str) -> Result<Workspace, StoreError> {
        let mut file = self.read()?;
        let workspace = file
            .workspaces
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        workspace.validate()?;
        Ok(workspace)
    }

    /// Persist `workspace` under its name.
    ///
    /// Fails with [`StoreError::Conflict`] when the name is taken and
    /// `overwrite` is unset.
    pub fn save(&self, workspace: &Workspace, overwrite: bool) -> Result<(), StoreError> {
        workspace.validate()?;
        let mut file = self.read()?;
        if !overwrite && file.workspaces.contains_key(&workspace.name) {
            return Err(StoreError::Conflict(workspace.name.clone()));
        }
        file.workspaces
            .insert(workspace.name.clone(), workspace.clone());
        self.write(&file)
    }

    /// All stored workspace names, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.workspaces.into_keys().collect())
    }

    /// Delete a workspace by name.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut file = self.read()?;
        if file.workspaces.remove(name).is_none() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.write(&file)
    }
}

//  Tests
