use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One input file a command read, with its size at read time.
#[derive(Debug, Serialize)]
pub struct InputRecord {
    pub path: String,
    pub bytes: Option<u64>,
}

impl InputRecord {
    pub fn of(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            bytes: fs::metadata(path).ok().map(|m| m.len()),
        }
    }
}

/// What produced an artifact: subcommand, its parameters, and the files it read.
#[derive(Debug, Serialize)]
pub struct Sidecar {
    pub command: &'static str,
    pub engine_version: &'static str,
    pub code_rev: String,
    pub params: Value,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<String>,
}

impl Sidecar {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            engine_version: constellation::VERSION,
            code_rev: current_git_rev(),
            params,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(InputRecord::of(path));
        self
    }

    /// Write `<stem>.provenance.json` next to `artifact`.
    pub fn write_next_to(mut self, artifact: &Path) -> Result<PathBuf> {
        let sidecar = provenance_path(artifact);
        self.outputs.push(artifact.to_string_lossy().into_owned());
        fs::write(&sidecar, serde_json::to_vec_pretty(&self)?)
            .with_context(|| format!("writing {}", sidecar.display()))?;
        tracing::debug!(path = %sidecar.display(), "provenance_written");
        Ok(sidecar)
    }
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "artifact".into());
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` at build or run time, then `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    if let Some(rev) = option_env!("GIT_COMMIT").filter(|s| !s.is_empty()) {
        return rev.to_string();
    }
    if let Ok(rev) = std::env::var("GIT_COMMIT") {
        if !rev.is_empty() {
            return rev;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
