//! The commit workflow itself: one adapter per git/provider/interaction
//! step, assembled into the compiled graph the executor walks.

pub mod nodes;
pub mod workflow;

pub use workflow::{
    commit_workflow, status_banners, DiscoveryPrologue, WorkflowDeps, COMPLETION_BANNER,
};
