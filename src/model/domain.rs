//! Domain state - business/data state separate from UI concerns

use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Result of the last successful build
#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub path: PathBuf,
    pub types: usize,
    pub timestamp: DateTime<Local>,
}

impl BuildRecord {
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} ({} types) at {}",
            self.path.display(),
            self.types,
            self.timestamp.format("%H:%M:%S")
        )
    }
}

/// Domain state containing the resolved workspace settings
#[derive(Debug, Clone)]
pub struct DomainState {
    /// sfdx project root; every CLI call runs here
    pub workspace: PathBuf,

    /// Absolute path of the package.xml to read and write
    pub manifest_path: PathBuf,

    /// Version written into `<version>`
    pub api_version: String,

    pub last_build: Option<BuildRecord>,
}

impl DomainState {
    pub fn new(workspace: PathBuf, manifest_path: PathBuf, api_version: String) -> Self {
        Self {
            workspace,
            manifest_path,
            api_version,
            last_build: None,
        }
    }
}
