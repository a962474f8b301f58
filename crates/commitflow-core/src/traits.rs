use std::path::PathBuf;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::state::{StateUpdate, WorkflowState};

/// Behavioral category of a node adapter. The executor never retries any
/// adapter, but the category is part of the contract: re-invoking a mutating
/// adapter could duplicate its external effect (double commit, double push).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Side-effect-free query; safe to re-invoke between mutations.
    ReadOnly,
    /// Performs an irreversible external effect.
    Mutating,
    /// Suspends on the interaction channel before returning.
    Interactive,
}

/// A unit of work bound to a graph node. Consumes a snapshot of the current
/// workflow state and returns a partial update for the executor to merge.
pub trait NodeAdapter: Send + Sync + 'static {
    fn kind(&self) -> AdapterKind;

    fn run(&self, state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>>;
}

/// Receives executor lifecycle notifications. Called synchronously from the
/// run loop so that status output is ordered with respect to any
/// input-request traffic the upcoming node emits.
pub trait RunObserver: Send + Sync + 'static {
    fn node_entered(&self, node: &str) -> BoxFuture<'_, Result<()>>;

    fn run_completed(&self) -> BoxFuture<'_, Result<()>>;
}

/// Synchronous request/response seam used by interactive adapters: emit one
/// input-request frame, block for exactly one response line. A closed input
/// stream surfaces as [`FlowError::InteractionCancelled`]; the adapter
/// decides whether that is fatal.
///
/// [`FlowError::InteractionCancelled`]: crate::error::FlowError::InteractionCancelled
pub trait InputSource: Send + Sync + 'static {
    fn request(
        &self,
        key: String,
        prompt: String,
        options: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<String>>>;
}

/// Version-control collaborator. One method per git invocation the workflow
/// needs; a non-zero exit surfaces as [`FlowError::ExternalCommand`].
///
/// [`FlowError::ExternalCommand`]: crate::error::FlowError::ExternalCommand
pub trait GitBackend: Send + Sync + 'static {
    /// `git branch --show-current`.
    fn current_branch(&self) -> BoxFuture<'_, Result<String>>;

    /// `git diff --name-only`, normalized to absolute paths against the
    /// repository root.
    fn unstaged_files(&self) -> BoxFuture<'_, Result<Vec<PathBuf>>>;

    /// `git add <files>`.
    fn stage_files(&self, files: Vec<PathBuf>) -> BoxFuture<'_, Result<()>>;

    /// `git diff --cached`, trimmed.
    fn staged_diff(&self) -> BoxFuture<'_, Result<String>>;

    /// `git commit -m <message>`.
    fn commit(&self, message: String) -> BoxFuture<'_, Result<()>>;

    /// `git push origin <branch>`.
    fn push(&self, branch: String) -> BoxFuture<'_, Result<()>>;
}

/// Text-generation collaborator: turn a staged diff into an imperative-mood
/// commit subject of at most 72 characters. Implementations must fail rather
/// than substitute a default when the provider response is unusable.
pub trait MessageProvider: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn generate(&self, diff: String) -> BoxFuture<'_, Result<String>>;
}
