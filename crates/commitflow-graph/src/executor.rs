use std::sync::Arc;

use tracing::{debug, info};

use commitflow_core::error::{FlowError, Result};
use commitflow_core::state::WorkflowState;
use commitflow_core::traits::RunObserver;

use crate::graph::{GraphDefinition, END};

/// Walks a compiled graph from its start node to [`END`], invoking each
/// node's adapter with a snapshot of the current state and merging the
/// returned partial update. Single-threaded and cooperative: one node runs
/// to completion before the next edge is evaluated, and an adapter failure
/// aborts the walk immediately — no retry, no rollback.
#[derive(Default)]
pub struct Executor {
    observer: Option<Arc<dyn RunObserver>>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a lifecycle observer, notified synchronously from the run
    /// loop so status output stays ordered with input-request traffic.
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn run(&self, graph: &GraphDefinition) -> Result<WorkflowState> {
        let mut state = WorkflowState::default();
        let mut cursor = graph.start().to_string();

        while cursor != END {
            if let Some(observer) = &self.observer {
                observer.node_entered(&cursor).await?;
            }

            // compile() guarantees every reachable cursor names a declared
            // node; a miss here means an edge slipped past validation.
            let adapter = graph.adapter(&cursor).ok_or_else(|| FlowError::GuardEvaluation {
                node: cursor.clone(),
                returned: cursor.clone(),
            })?;

            debug!(node = %cursor, kind = ?adapter.kind(), "running node");
            let update = adapter.run(state.clone()).await?;
            state.apply(update);

            cursor = graph.next(&cursor, &state)?;
        }

        if let Some(observer) = &self.observer {
            observer.run_completed().await?;
        }
        info!("workflow run completed");
        Ok(state)
    }
}
