//! Node adapters. Each consumes a state snapshot and returns the partial
//! update the executor merges; git, provider, and front-end access go
//! through the trait seams so every adapter is testable with stubs.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{info, warn};

use commitflow_core::error::{FlowError, Result};
use commitflow_core::state::{StateUpdate, WorkflowState};
use commitflow_core::traits::{
    AdapterKind, GitBackend, InputSource, MessageProvider, NodeAdapter,
};
use commitflow_git::find_repos;

/// `git branch --show-current`.
pub struct GetCurrentBranch {
    pub git: Arc<dyn GitBackend>,
}

impl NodeAdapter for GetCurrentBranch {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, _state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let branch = self.git.current_branch().await?;
            Ok(StateUpdate {
                branch_name: Some(branch),
                ..Default::default()
            })
        })
    }
}

/// `git diff --name-only`, absolute paths.
pub struct ListUnstagedFiles {
    pub git: Arc<dyn GitBackend>,
}

impl NodeAdapter for ListUnstagedFiles {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, _state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let files = self.git.unstaged_files().await?;
            info!(count = files.len(), "unstaged files found");
            Ok(StateUpdate {
                unstaged_files: Some(files),
                ..Default::default()
            })
        })
    }
}

/// Ask the front-end which unstaged files to stage, then `git add` the
/// selection. Files that vanished since the listing are dropped from the
/// offer; a cancelled or empty selection stages nothing and the run
/// continues.
pub struct StageFilesSafe {
    pub git: Arc<dyn GitBackend>,
    pub input: Arc<dyn InputSource>,
}

impl NodeAdapter for StageFilesSafe {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Interactive
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let files = state.require_unstaged_files()?;

            let valid: Vec<&PathBuf> = files.iter().filter(|f| f.exists()).collect();
            if valid.is_empty() {
                return Ok(StateUpdate {
                    staged_files: Some(Vec::new()),
                    ..Default::default()
                });
            }

            let options: Vec<String> = valid
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect();
            let selected = match self
                .input
                .request(
                    "stage_files".to_string(),
                    "Select files to stage".to_string(),
                    options,
                )
                .await
            {
                Ok(selection) => selection,
                Err(FlowError::InteractionCancelled) => {
                    warn!("staging selection cancelled");
                    Vec::new()
                }
                Err(err) => return Err(err),
            };

            if selected.is_empty() {
                return Ok(StateUpdate {
                    staged_files: Some(Vec::new()),
                    ..Default::default()
                });
            }

            let selected: Vec<PathBuf> = selected.into_iter().map(PathBuf::from).collect();
            self.git.stage_files(selected.clone()).await?;
            Ok(StateUpdate {
                staged_files: Some(selected),
                ..Default::default()
            })
        })
    }
}

/// `git diff --cached`.
pub struct GetStagedDiff {
    pub git: Arc<dyn GitBackend>,
}

impl NodeAdapter for GetStagedDiff {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, _state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let diff = self.git.staged_diff().await?;
            Ok(StateUpdate {
                staged_files_diff: Some(diff),
                ..Default::default()
            })
        })
    }
}

/// Sets `has_staged_files` from the staged diff; the guard after this node
/// is the workflow's only branch point.
pub struct CheckFilesToCommit;

impl NodeAdapter for CheckFilesToCommit {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let has_staged = !state.require_staged_diff()?.is_empty();
            if !has_staged {
                info!("no files to commit");
            }
            Ok(StateUpdate {
                has_staged_files: Some(has_staged),
                ..Default::default()
            })
        })
    }
}

/// Turn the staged diff into a commit subject. Never reached on an empty
/// diff; provider failures abort the run rather than committing a default.
pub struct GenerateCommitMessage {
    pub provider: Arc<dyn MessageProvider>,
}

impl NodeAdapter for GenerateCommitMessage {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let diff = state.require_staged_diff()?;
            let message = self.provider.generate(diff.to_string()).await?;
            info!(%message, "generated commit message");
            Ok(StateUpdate {
                commit_message: Some(message),
                ..Default::default()
            })
        })
    }
}

/// `git commit -m <message>`.
pub struct CommitFiles {
    pub git: Arc<dyn GitBackend>,
}

impl NodeAdapter for CommitFiles {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Mutating
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let message = state.require_commit_message()?;
            self.git.commit(message.to_string()).await?;
            Ok(StateUpdate::default())
        })
    }
}

/// `git push origin <branch>`.
pub struct PushBranch {
    pub git: Arc<dyn GitBackend>,
}

impl NodeAdapter for PushBranch {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Mutating
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let branch = state.require_branch_name()?;
            self.git.push(branch.to_string()).await?;
            Ok(StateUpdate::default())
        })
    }
}

/// Walk a root directory for git repositories (discovery prologue).
pub struct FindGitRepos {
    pub root: PathBuf,
    pub exclude: Vec<String>,
}

impl NodeAdapter for FindGitRepos {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ReadOnly
    }

    fn run(&self, _state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let repos = find_repos(&self.root, &self.exclude);
            info!(count = repos.len(), root = %self.root.display(), "repositories discovered");
            Ok(StateUpdate {
                repos_list: Some(repos),
                ..Default::default()
            })
        })
    }
}

/// Let the front-end pick one of the discovered repositories, then move the
/// process there so later git invocations run inside it. Cancellation or an
/// empty list leaves the working directory alone.
pub struct SelectRepository {
    pub input: Arc<dyn InputSource>,
}

impl NodeAdapter for SelectRepository {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Interactive
    }

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
        Box::pin(async move {
            let repos = state.require_repos_list()?;
            if repos.is_empty() {
                warn!("no git repositories found");
                return Ok(StateUpdate::default());
            }

            let options: Vec<String> = repos
                .iter()
                .map(|r| r.to_string_lossy().into_owned())
                .collect();
            let selected = match self
                .input
                .request(
                    "select_repo".to_string(),
                    "Choose a repository".to_string(),
                    options,
                )
                .await
            {
                Ok(selection) => selection,
                Err(FlowError::InteractionCancelled) => Vec::new(),
                Err(err) => return Err(err),
            };

            let Some(choice) = selected.into_iter().next() else {
                info!("repository selection cancelled");
                return Ok(StateUpdate::default());
            };

            let path = PathBuf::from(choice);
            std::env::set_current_dir(&path)?;
            info!(repo = %path.display(), "switched to repository");
            Ok(StateUpdate {
                repo_path: Some(path),
                ..Default::default()
            })
        })
    }
}
