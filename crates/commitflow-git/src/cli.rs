use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::debug;

use commitflow_core::error::{FlowError, Result};
use commitflow_core::traits::GitBackend;

/// [`GitBackend`] over the `git` command-line interface. A non-zero exit
/// surfaces as [`FlowError::ExternalCommand`] with the captured stderr.
pub struct GitCli {
    /// Working directory for every invocation. `None` follows the process
    /// working directory at call time, so a repository selected mid-run
    /// (via `set_current_dir`) takes effect without rebuilding the backend.
    repo: Option<PathBuf>,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: Some(repo.into()),
        }
    }

    /// Follow the process working directory.
    pub fn process_cwd() -> Self {
        Self { repo: None }
    }

    async fn run_git<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let rendered = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        debug!("git {rendered}");

        let mut command = Command::new("git");
        command.args(&args);
        if let Some(repo) = &self.repo {
            command.current_dir(repo);
        }
        let output = command.output().await?;

        if !output.status.success() {
            return Err(FlowError::ExternalCommand {
                command: format!("git {rendered}"),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `git rev-parse --show-toplevel`; unstaged paths are reported relative
    /// to this root.
    async fn repo_root(&self) -> Result<PathBuf> {
        let out = self.run_git(["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(out.trim()))
    }
}

impl GitBackend for GitCli {
    fn current_branch(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let out = self.run_git(["branch", "--show-current"]).await?;
            Ok(out.trim().to_string())
        })
    }

    fn unstaged_files(&self) -> BoxFuture<'_, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            let root = self.repo_root().await?;
            let out = self.run_git(["diff", "--name-only"]).await?;
            Ok(out
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| root.join(line))
                .collect())
        })
    }

    fn stage_files(&self, files: Vec<PathBuf>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if files.is_empty() {
                return Ok(());
            }
            let mut args: Vec<OsString> = vec!["add".into()];
            args.extend(files.into_iter().map(OsString::from));
            self.run_git(args).await?;
            Ok(())
        })
    }

    fn staged_diff(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let out = self.run_git(["diff", "--cached"]).await?;
            Ok(out.trim().to_string())
        })
    }

    fn commit(&self, message: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.run_git(["commit", "-m", message.as_str()]).await?;
            Ok(())
        })
    }

    fn push(&self, branch: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.run_git(["push", "origin", branch.as_str()]).await?;
            Ok(())
        })
    }
}
