//! Assembly of the commit workflow graph and its status banners.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use commitflow_core::error::Result;
use commitflow_core::state::WorkflowState;
use commitflow_core::traits::{GitBackend, InputSource, MessageProvider};
use commitflow_graph::{GraphBuilder, GraphDefinition, END};

use crate::nodes;

// Node ids; also the `node` field of status frames.
pub const FIND_GIT_REPOS: &str = "find_git_repos";
pub const SELECT_REPOSITORY: &str = "select_repository";
pub const GET_CURRENT_GIT_BRANCH: &str = "get_current_git_branch";
pub const LIST_UNSTAGED_FILES: &str = "list_unstaged_files";
pub const STAGE_FILES_SAFE: &str = "stage_files_safe";
pub const GET_STAGED_DIFF: &str = "get_staged_diff";
pub const CHECK_FILES_TO_COMMIT: &str = "check_files_to_commit";
pub const GENERATE_COMMIT_MESSAGE: &str = "generate_commit_message";
pub const COMMIT_FILES: &str = "commit_files";
pub const PUSH_BRANCH: &str = "push_branch";

pub const COMPLETION_BANNER: &str = "✅ Commit workflow completed";

/// External collaborators the workflow's adapters run against.
pub struct WorkflowDeps {
    pub git: Arc<dyn GitBackend>,
    pub provider: Arc<dyn MessageProvider>,
    pub input: Arc<dyn InputSource>,
}

/// Repository-discovery prologue, prepended to the graph when enabled.
pub struct DiscoveryPrologue {
    pub root: PathBuf,
    pub exclude: Vec<String>,
}

/// Build and compile the commit workflow:
///
/// ```text
/// [find_git_repos -> select_repository ->] get_current_git_branch
///   -> list_unstaged_files -> stage_files_safe -> get_staged_diff
///   -> check_files_to_commit -?-> generate_commit_message
///   -> commit_files -> push_branch -> END
/// ```
///
/// The guard after `check_files_to_commit` is the only branch point: a
/// false `has_staged_files` routes straight to END, so message generation,
/// commit, and push are skipped entirely.
pub fn commit_workflow(
    deps: &WorkflowDeps,
    discovery: Option<DiscoveryPrologue>,
) -> Result<GraphDefinition> {
    let mut builder = GraphBuilder::new()
        .register(
            GET_CURRENT_GIT_BRANCH,
            nodes::GetCurrentBranch {
                git: deps.git.clone(),
            },
        )
        .register(
            LIST_UNSTAGED_FILES,
            nodes::ListUnstagedFiles {
                git: deps.git.clone(),
            },
        )
        .register(
            STAGE_FILES_SAFE,
            nodes::StageFilesSafe {
                git: deps.git.clone(),
                input: deps.input.clone(),
            },
        )
        .register(
            GET_STAGED_DIFF,
            nodes::GetStagedDiff {
                git: deps.git.clone(),
            },
        )
        .register(CHECK_FILES_TO_COMMIT, nodes::CheckFilesToCommit)
        .register(
            GENERATE_COMMIT_MESSAGE,
            nodes::GenerateCommitMessage {
                provider: deps.provider.clone(),
            },
        )
        .register(
            COMMIT_FILES,
            nodes::CommitFiles {
                git: deps.git.clone(),
            },
        )
        .register(
            PUSH_BRANCH,
            nodes::PushBranch {
                git: deps.git.clone(),
            },
        )
        .connect(GET_CURRENT_GIT_BRANCH, LIST_UNSTAGED_FILES)
        .connect(LIST_UNSTAGED_FILES, STAGE_FILES_SAFE)
        .connect(STAGE_FILES_SAFE, GET_STAGED_DIFF)
        .connect(GET_STAGED_DIFF, CHECK_FILES_TO_COMMIT)
        .connect_conditional(
            CHECK_FILES_TO_COMMIT,
            |state: &WorkflowState| {
                if state.has_staged_files == Some(true) {
                    GENERATE_COMMIT_MESSAGE.to_string()
                } else {
                    END.to_string()
                }
            },
            [GENERATE_COMMIT_MESSAGE, END],
        )
        .connect(GENERATE_COMMIT_MESSAGE, COMMIT_FILES)
        .connect(COMMIT_FILES, PUSH_BRANCH)
        .connect(PUSH_BRANCH, END);

    let start = match discovery {
        Some(DiscoveryPrologue { root, exclude }) => {
            builder = builder
                .register(FIND_GIT_REPOS, nodes::FindGitRepos { root, exclude })
                .register(
                    SELECT_REPOSITORY,
                    nodes::SelectRepository {
                        input: deps.input.clone(),
                    },
                )
                .connect(FIND_GIT_REPOS, SELECT_REPOSITORY)
                .connect(SELECT_REPOSITORY, GET_CURRENT_GIT_BRANCH);
            FIND_GIT_REPOS
        }
        None => GET_CURRENT_GIT_BRANCH,
    };

    builder.compile(start)
}

/// Node → banner mapping for status frames.
pub fn status_banners() -> HashMap<String, String> {
    [
        (FIND_GIT_REPOS, "🔎 Discovering git repositories"),
        (SELECT_REPOSITORY, "📁 Selecting repository"),
        (GET_CURRENT_GIT_BRANCH, "📌 Getting current Git branch"),
        (LIST_UNSTAGED_FILES, "🗂 Listing unstaged files"),
        (STAGE_FILES_SAFE, "📥 Staging files"),
        (GET_STAGED_DIFF, "🧾 Generating staged diff"),
        (CHECK_FILES_TO_COMMIT, "🔍 Checking files to commit"),
        (GENERATE_COMMIT_MESSAGE, "✍️ Generating commit message"),
        (COMMIT_FILES, "✅ Creating commit"),
        (PUSH_BRANCH, "🚀 Pushing branch to remote"),
    ]
    .into_iter()
    .map(|(node, banner)| (node.to_string(), banner.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    struct NoGit;

    impl GitBackend for NoGit {
        fn current_branch(&self) -> BoxFuture<'_, Result<String>> {
            Box::pin(async { Ok(String::new()) })
        }
        fn unstaged_files(&self) -> BoxFuture<'_, Result<Vec<PathBuf>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
        fn stage_files(&self, _files: Vec<PathBuf>) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Ok(()) })
        }
        fn staged_diff(&self) -> BoxFuture<'_, Result<String>> {
            Box::pin(async { Ok(String::new()) })
        }
        fn commit(&self, _message: String) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Ok(()) })
        }
        fn push(&self, _branch: String) -> BoxFuture<'_, Result<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct NoProvider;

    impl MessageProvider for NoProvider {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn generate(&self, _diff: String) -> BoxFuture<'_, Result<String>> {
            Box::pin(async { Ok(String::new()) })
        }
    }

    struct NoInput;

    impl InputSource for NoInput {
        fn request(
            &self,
            _key: String,
            _prompt: String,
            _options: Vec<String>,
        ) -> BoxFuture<'_, Result<Vec<String>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn deps() -> WorkflowDeps {
        WorkflowDeps {
            git: Arc::new(NoGit),
            provider: Arc::new(NoProvider),
            input: Arc::new(NoInput),
        }
    }

    #[test]
    fn workflow_compiles_and_starts_at_branch_query() {
        let graph = commit_workflow(&deps(), None).unwrap();
        assert_eq!(graph.start(), GET_CURRENT_GIT_BRANCH);
        assert_eq!(graph.node_ids().count(), 8);
    }

    #[test]
    fn discovery_prologue_prepends_two_nodes() {
        let graph = commit_workflow(
            &deps(),
            Some(DiscoveryPrologue {
                root: PathBuf::from("/tmp"),
                exclude: Vec::new(),
            }),
        )
        .unwrap();
        assert_eq!(graph.start(), FIND_GIT_REPOS);
        assert_eq!(graph.node_ids().count(), 10);
    }

    #[test]
    fn every_node_has_a_status_banner() {
        let banners = status_banners();
        let graph = commit_workflow(
            &deps(),
            Some(DiscoveryPrologue {
                root: PathBuf::from("/tmp"),
                exclude: Vec::new(),
            }),
        )
        .unwrap();
        for id in graph.node_ids() {
            assert!(banners.contains_key(id), "missing banner for {id}");
        }
    }
}
