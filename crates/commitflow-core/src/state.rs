use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// The record threaded through a workflow run. Created empty at run start,
/// owned exclusively by the executor, never persisted across runs.
///
/// Every field is optional: a node must not assume a field is populated
/// unless an upstream node on the taken path is guaranteed to have set it.
/// The `require_*` accessors turn that mistake into a
/// [`FlowError::MissingStateField`] instead of a panic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub repos_list: Option<Vec<PathBuf>>,
    pub repo_path: Option<PathBuf>,
    pub branch_name: Option<String>,
    pub unstaged_files: Option<Vec<PathBuf>>,
    pub staged_files: Option<Vec<PathBuf>>,
    pub staged_files_diff: Option<String>,
    pub has_staged_files: Option<bool>,
    pub commit_message: Option<String>,
}

/// A partial update returned by a node adapter. `Some` fields overwrite the
/// corresponding state field on merge, `None` fields leave it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub repos_list: Option<Vec<PathBuf>>,
    pub repo_path: Option<PathBuf>,
    pub branch_name: Option<String>,
    pub unstaged_files: Option<Vec<PathBuf>>,
    pub staged_files: Option<Vec<PathBuf>>,
    pub staged_files_diff: Option<String>,
    pub has_staged_files: Option<bool>,
    pub commit_message: Option<String>,
}

impl WorkflowState {
    /// Shallow, last-write-wins merge of a node's partial update.
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            repos_list,
            repo_path,
            branch_name,
            unstaged_files,
            staged_files,
            staged_files_diff,
            has_staged_files,
            commit_message,
        } = update;

        if let Some(v) = repos_list {
            self.repos_list = Some(v);
        }
        if let Some(v) = repo_path {
            self.repo_path = Some(v);
        }
        if let Some(v) = branch_name {
            self.branch_name = Some(v);
        }
        if let Some(v) = unstaged_files {
            self.unstaged_files = Some(v);
        }
        if let Some(v) = staged_files {
            self.staged_files = Some(v);
        }
        if let Some(v) = staged_files_diff {
            self.staged_files_diff = Some(v);
        }
        if let Some(v) = has_staged_files {
            self.has_staged_files = Some(v);
        }
        if let Some(v) = commit_message {
            self.commit_message = Some(v);
        }
    }

    pub fn require_repos_list(&self) -> Result<&[PathBuf]> {
        self.repos_list
            .as_deref()
            .ok_or(FlowError::MissingStateField("repos_list"))
    }

    pub fn require_branch_name(&self) -> Result<&str> {
        self.branch_name
            .as_deref()
            .ok_or(FlowError::MissingStateField("branch_name"))
    }

    pub fn require_unstaged_files(&self) -> Result<&[PathBuf]> {
        self.unstaged_files
            .as_deref()
            .ok_or(FlowError::MissingStateField("unstaged_files"))
    }

    pub fn require_staged_diff(&self) -> Result<&str> {
        self.staged_files_diff
            .as_deref()
            .ok_or(FlowError::MissingStateField("staged_files_diff"))
    }

    pub fn require_commit_message(&self) -> Result<&str> {
        self.commit_message
            .as_deref()
            .ok_or(FlowError::MissingStateField("commit_message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_last_write_wins_per_field() {
        let mut state = WorkflowState::default();
        state.apply(StateUpdate {
            branch_name: Some("main".into()),
            ..Default::default()
        });
        state.apply(StateUpdate {
            branch_name: Some("feature/x".into()),
            has_staged_files: Some(true),
            ..Default::default()
        });

        assert_eq!(state.branch_name.as_deref(), Some("feature/x"));
        assert_eq!(state.has_staged_files, Some(true));
    }

    #[test]
    fn merge_leaves_unrelated_fields_untouched() {
        let mut state = WorkflowState::default();
        state.apply(StateUpdate {
            staged_files: Some(vec!["a.txt".into()]),
            ..Default::default()
        });
        state.apply(StateUpdate {
            staged_files_diff: Some("--- a\n+++ b\n".into()),
            ..Default::default()
        });

        assert_eq!(state.staged_files, Some(vec![PathBuf::from("a.txt")]));
        assert_eq!(state.staged_files_diff.as_deref(), Some("--- a\n+++ b\n"));
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut state = WorkflowState {
            branch_name: Some("main".into()),
            ..Default::default()
        };
        let before = state.clone();
        state.apply(StateUpdate::default());
        assert_eq!(state, before);
    }

    #[test]
    fn require_accessor_reports_missing_field() {
        let state = WorkflowState::default();
        match state.require_commit_message() {
            Err(FlowError::MissingStateField(field)) => assert_eq!(field, "commit_message"),
            other => panic!("expected MissingStateField, got {other:?}"),
        }
    }
}
