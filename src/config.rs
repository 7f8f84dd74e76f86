//! Persistent settings
//!
//! Stored as JSON in `~/.package-xml-tui/config.json`. Command-line flags
//! override whatever the file holds.

use crate::cli::Cli;
use crate::services::package_xml::DEFAULT_API_VERSION;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// sfdx project root; empty means the current directory
    pub workspace_path: String,
    /// sfdx binary; empty means `sfdx` on PATH
    pub sfdx_binary_path: String,
    pub api_version: String,
    /// package.xml location, relative to the workspace unless absolute
    pub manifest_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_path: String::new(),
            sfdx_binary_path: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            manifest_path: "manifest/package.xml".to_string(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".package-xml-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config file, if there is a readable one
    pub fn load() -> Option<Config> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }

        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Apply command-line overrides on top of the file values
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(workspace) = &cli.workspace {
            self.workspace_path = workspace.to_string_lossy().into_owned();
        }
        if let Some(sfdx) = &cli.sfdx {
            self.sfdx_binary_path = sfdx.clone();
        }
        if let Some(version) = &cli.api_version {
            self.api_version = version.clone();
        }
        self
    }

    /// Workspace root, falling back to the current directory
    pub fn workspace(&self) -> PathBuf {
        if self.workspace_path.is_empty() {
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        } else {
            PathBuf::from(&self.workspace_path)
        }
    }

    /// Resolved package.xml path
    pub fn manifest_file(&self) -> PathBuf {
        let path = PathBuf::from(&self.manifest_path);
        if path.is_absolute() {
            path
        } else {
            self.workspace().join(path)
        }
    }
}
