//! Validator gentx collection through the external chain binary.
//!
//! The binary rewrites `genesis.json` in its own formatting and leaves node
//! scaffolding behind; both are cleaned up so that repeated runs produce the
//! same home directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::serialize::normalize_genesis;
use crate::GenesisError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Output substrings that mean the binary failed even if it exited 0.
pub const FAILURE_MARKERS: &[&str] = &["ERROR", "panic"];

/// Files and directories the binary creates under `home`.
pub const SCAFFOLDING: &[&str] = &[
    "config/app.toml",
    "config/config.toml",
    "config/node_key.json",
    "config/priv_validator_key.json",
    "data",
];

#[derive(Clone, Debug)]
pub struct GentxCollector {
    binary: PathBuf,
    timeout: Duration,
}

impl GentxCollector {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collect the gentxs in `gentx_dir` into `<home>/config/genesis.json`.
    ///
    /// Returns `false` without running anything when the directory is missing
    /// or empty.
    pub async fn collect(&self, home: &Path, gentx_dir: &Path) -> Result<bool, GenesisError> {
        if !has_entries(gentx_dir)? {
            tracing::info!(dir = %gentx_dir.display(), "no gentxs to collect");
            return Ok(false);
        }

        let output = self.run(home, gentx_dir).await?;
        remove_scaffolding(home)?;
        normalize_genesis(home)?;
        tracing::info!(
            binary = %self.binary.display(),
            bytes = output.len(),
            "collected gentxs"
        );
        Ok(true)
    }

    async fn run(&self, home: &Path, gentx_dir: &Path) -> Result<String, GenesisError> {
        let tool = self.binary.display().to_string();
        let failure = |reason: String, output: String| GenesisError::ExternalToolFailure {
            tool: tool.clone(),
            reason,
            output,
        };

        let mut command = Command::new(&self.binary);
        command
            .arg("collect-gentxs")
            .arg("--home")
            .arg(home)
            .arg("--gentx-dir")
            .arg(gentx_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(failure(format!("could not run: {err}"), String::new())),
            Err(_) => {
                return Err(failure(
                    format!("timed out after {}s", self.timeout.as_secs()),
                    String::new(),
                ))
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(output = %combined, "collect-gentxs output");

        if !output.status.success() {
            return Err(failure(format!("exited with {}", output.status), combined));
        }
        if let Some(marker) = failure_marker(&combined) {
            return Err(failure(format!("output contains {marker:?}"), combined));
        }
        Ok(combined)
    }
}

/// First failure marker found in `output`.
pub fn failure_marker(output: &str) -> Option<&'static str> {
    FAILURE_MARKERS
        .iter()
        .copied()
        .find(|marker| output.contains(marker))
}

fn has_entries(dir: &Path) -> Result<bool, GenesisError> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(GenesisError::io(dir, err)),
    }
}

/// Delete whatever of [`SCAFFOLDING`] exists under `home`.
pub fn remove_scaffolding(home: &Path) -> Result<(), GenesisError> {
    for relative in SCAFFOLDING {
        let path = home.join(relative);
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match removed {
            Ok(()) => tracing::debug!(path = %path.display(), "removed scaffolding"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(GenesisError::io(path, err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn markers_are_case_sensitive() {
        assert_eq!(failure_marker("ERROR: bad gentx"), Some("ERROR"));
        assert_eq!(failure_marker("goroutine panic: nil"), Some("panic"));
        assert_eq!(failure_marker("no errors, Panic-free"), None);
    }

    #[test]
    fn scaffolding_removal_tolerates_missing_files() {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join("config")).unwrap();
        fs::create_dir_all(home.path().join("data/blockstore.db")).unwrap();
        fs::write(home.path().join("config/node_key.json"), "{}").unwrap();
        fs::write(home.path().join("config/genesis.json"), "{}").unwrap();

        remove_scaffolding(home.path()).unwrap();

        assert!(!home.path().join("data").exists());
        assert!(!home.path().join("config/node_key.json").exists());
        assert!(home.path().join("config/genesis.json").exists());
    }

    #[tokio::test]
    async fn missing_or_empty_dir_skips() {
        let home = tempfile::tempdir().unwrap();
        let collector = GentxCollector::new("/nonexistent/starnamed");

        let missing = home.path().join("gentxs");
        assert!(!collector.collect(home.path(), &missing).await.unwrap());

        fs::create_dir(&missing).unwrap();
        assert!(!collector.collect(home.path(), &missing).await.unwrap());
    }
}
