//! sfdx CLI interaction services
//!
//! Each call runs one `sfdx` process in the workspace directory, waits for it
//! to exit and parses the single JSON document it prints.

use crate::error::{PackageError, PackageResult};
use crate::model::metadata::{
    DescribeMetadataResponse, ListMetadataResponse, MetadataComponent, MetadataObject,
};
use crate::services::MetadataSource;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

/// Regex to match ANSI escape codes
static ANSI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("valid ANSI regex"));

/// Strip ANSI escape codes from a string
fn strip_ansi_codes(s: &str) -> String {
    ANSI_REGEX.replace_all(s, "").to_string()
}

/// Build the arguments for a list-metadata call
///
/// Returns (args, command_line).
pub fn build_list_metadata_args(metadata_type: &str, folder: Option<&str>) -> (Vec<String>, String) {
    let mut args = vec![
        "force:mdapi:listmetadata".to_string(),
        "--json".to_string(),
        "-m".to_string(),
        metadata_type.to_string(),
    ];
    let mut command_line = format!("sfdx force:mdapi:listmetadata --json -m {}", metadata_type);

    if let Some(folder) = folder {
        args.push("--folder".to_string());
        args.push(folder.to_string());
        command_line.push_str(&format!(" --folder {}", folder));
    }

    (args, command_line)
}

/// Build the arguments for a describe-metadata call
pub fn build_describe_metadata_args() -> (Vec<String>, String) {
    (
        vec!["force:mdapi:describemetadata".to_string(), "--json".to_string()],
        "sfdx force:mdapi:describemetadata --json".to_string(),
    )
}

/// Metadata source backed by the sfdx CLI
#[derive(Debug, Clone)]
pub struct SfdxCli {
    binary: String,
    workspace: PathBuf,
}

impl SfdxCli {
    pub fn new(binary: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        Self {
            binary: if binary.is_empty() { "sfdx".to_string() } else { binary },
            workspace: workspace.into(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.binary);
            c
        };

        #[cfg(not(target_os = "windows"))]
        let mut command = Command::new(&self.binary);

        command.args(args).current_dir(&self.workspace).kill_on_drop(false);
        command
    }

    /// Run the CLI and return its parsed JSON document
    async fn run_json(&self, args: Vec<String>, command_line: String) -> PackageResult<Value> {
        debug!(command = %command_line, cwd = %self.workspace.display(), "running sfdx");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| PackageError::Spawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        debug!(command = %command_line, code = ?output.status.code(), stdout_bytes = output.stdout.len(), "sfdx exited");
        interpret_output(&command_line, output.status.success(), output.status.code(), &output.stdout, &output.stderr)
    }
}

/// Turn raw process output into a JSON document or a classified error
fn interpret_output(
    command_line: &str,
    success: bool,
    code: Option<i32>,
    stdout: &[u8],
    stderr: &[u8],
) -> PackageResult<Value> {
    let stderr = strip_ansi_codes(&String::from_utf8_lossy(stderr));
    if !stderr.trim().is_empty() {
        return Err(PackageError::Transport {
            command: command_line.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    let value: Value = match serde_json::from_slice(stdout) {
        Ok(value) => value,
        Err(_) if !success => {
            return Err(PackageError::Exit {
                command: command_line.to_string(),
                code,
            })
        }
        Err(e) => {
            return Err(PackageError::Json {
                command: command_line.to_string(),
                message: e.to_string(),
            })
        }
    };

    // `--json` reports command failures on stdout with a non-zero status
    let status = value.get("status").and_then(Value::as_i64).unwrap_or(0);
    if status != 0 || !success {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        return match message {
            Some(message) => Err(PackageError::Transport {
                command: command_line.to_string(),
                stderr: strip_ansi_codes(&message),
            }),
            None => Err(PackageError::Exit {
                command: command_line.to_string(),
                code,
            }),
        };
    }

    Ok(value)
}

fn decode<T: serde::de::DeserializeOwned>(command_line: &str, value: Value) -> PackageResult<T> {
    serde_json::from_value(value).map_err(|e| PackageError::Json {
        command: command_line.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl MetadataSource for SfdxCli {
    async fn list_metadata(
        &self,
        metadata_type: &str,
        folder: Option<&str>,
    ) -> PackageResult<Vec<MetadataComponent>> {
        let (args, command_line) = build_list_metadata_args(metadata_type, folder);
        let value = self.run_json(args, command_line.clone()).await?;
        let response: ListMetadataResponse = decode(&command_line, value)?;
        Ok(response.result)
    }

    async fn describe_metadata(&self) -> PackageResult<Vec<MetadataObject>> {
        let (args, command_line) = build_describe_metadata_args();
        let value = self.run_json(args, command_line.clone()).await?;
        let response: DescribeMetadataResponse = decode(&command_line, value)?;
        Ok(response.result.metadata_objects)
    }
}
