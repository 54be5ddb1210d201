use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Contents of a `<stem>.provenance.json` sidecar.
#[derive(Debug, Serialize, Deserialize)]
pub struct Provenance {
    pub code_rev: String,
    pub shoreline_version: String,
    pub callsite: Callsite,
    pub params: Value,
    pub outputs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Callsite {
    pub file: String,
    pub line: u32,
}

/// Write `<artifact>.provenance.json` recording how `artifact` was produced.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, params: Value) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = provenance_path(artifact);
    let callsite = Location::caller();
    let doc = Provenance {
        code_rev: current_git_rev(),
        shoreline_version: shoreline::VERSION.to_string(),
        callsite: Callsite {
            file: callsite.file().to_string(),
            line: callsite.line(),
        },
        params,
        outputs: vec![artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("areas"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit of the build: `GIT_COMMIT` at compile or run time, else `git rev-parse`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_table() {
        let derived = provenance_path(Path::new("/tmp/run/areas.parquet"));
        assert_eq!(derived, Path::new("/tmp/run/areas.provenance.json"));
    }

    #[test]
    fn sidecar_records_params_and_output() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("areas.csv");
        fs::write(&artifact, "dataset\n").unwrap();
        let path = write_sidecar(&artifact, json!({"snap_eps": 1e-9})).unwrap();
        let parsed: Provenance = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed.outputs, vec![artifact.to_string_lossy().into_owned()]);
        assert_eq!(parsed.params["snap_eps"], 1e-9);
        assert_eq!(parsed.shoreline_version, shoreline::VERSION);
        assert!(parsed.callsite.file.ends_with("provenance.rs"));
    }
}
