//! Version Control Collaborator
//!
//! Two text-producing queries (changed files, scoped diff) and a commit,
//! behind a trait so the cascade and pipeline can run against a mock.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::ai::timeout::with_timeout_map;
use crate::analyzer::is_java_file;
use crate::config::VcsConfig;
use crate::types::{Result, WeaveError};

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Java files changed on this branch relative to `base_ref`
    async fn changed_files(&self, base_ref: &str) -> Result<Vec<PathBuf>>;

    /// Zero-context unified diff of one file between two revisions
    async fn file_diff(&self, path: &Path, base: &str, head: &str) -> Result<String>;

    /// Stage `paths` and commit them with `message`
    async fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()>;
}

/// `git` command-line implementation
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
    remote: String,
    timeout: Duration,
}

impl GitCli {
    pub fn new(repo_root: impl Into<PathBuf>, config: &VcsConfig) -> Self {
        Self {
            repo_root: repo_root.into(),
            remote: config.remote.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        debug!(?args, "Running git");
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.repo_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let operation = format!("git {}", args.first().copied().unwrap_or_default());
        let output = with_timeout_map(self.timeout, cmd.output(), &operation)
            .await?
            .map_err(|e| WeaveError::Vcs(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WeaveError::Vcs(format!(
                "{} failed: {}",
                operation,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControl for GitCli {
    #[instrument(skip(self))]
    async fn changed_files(&self, base_ref: &str) -> Result<Vec<PathBuf>> {
        let range = format!("{}/{}...HEAD", self.remote, base_ref);
        let stdout = self.git(&["diff", "--name-only", &range]).await?;

        let files: Vec<PathBuf> = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| self.repo_root.join(l))
            .filter(|p| is_java_file(p) && p.exists())
            .collect();

        debug!("{} changed Java files against {}", files.len(), range);
        Ok(files)
    }

    async fn file_diff(&self, path: &Path, base: &str, head: &str) -> Result<String> {
        let path = path.to_string_lossy();
        self.git(&["diff", "-U0", base, head, "--", &path]).await
    }

    #[instrument(skip(self, message), fields(files = paths.len()))]
    async fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut add: Vec<String> = vec!["add".to_string(), "--".to_string()];
        add.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        let add_args: Vec<&str> = add.iter().map(String::as_str).collect();
        self.git(&add_args).await?;

        self.git(&["commit", "-m", message]).await?;
        Ok(())
    }
}

/// Commit message listing modified files and oracle spend
pub fn build_commit_message(files: &[PathBuf], total_tokens: u64, total_cost_usd: f64) -> String {
    let mut lines = vec![
        format!("Add/update Javadoc comments for {} file(s)", files.len()),
        String::new(),
        "Files modified:".to_string(),
    ];
    lines.extend(files.iter().map(|f| format!("- {}", f.display())));
    lines.push(String::new());
    lines.push(format!(
        "API Usage: {} tokens, ${:.4} estimated cost",
        total_tokens, total_cost_usd
    ));
    lines.join("\n")
}
