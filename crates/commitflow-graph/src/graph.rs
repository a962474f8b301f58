use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use commitflow_core::error::{FlowError, Result};
use commitflow_core::state::WorkflowState;
use commitflow_core::traits::NodeAdapter;

/// Terminal sentinel: a guard or plain edge routing here ends the run.
pub const END: &str = "__end__";

/// Decision function of a guarded edge. Evaluated against the post-merge
/// workflow state; must be pure (same state, same decision).
pub type Guard = Arc<dyn Fn(&WorkflowState) -> String + Send + Sync>;

pub(crate) enum Edge {
    Plain {
        to: String,
    },
    Guarded {
        guard: Guard,
        /// Every id the guard may legally return. Checked against declared
        /// nodes at compile time and against the guard's decision at run time.
        targets: Vec<String>,
    },
}

/// Collects nodes and edges; `compile()` turns them into an immutable,
/// validated [`GraphDefinition`].
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<(String, Arc<dyn NodeAdapter>)>,
    edges: Vec<(String, Edge)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node.
    pub fn register(mut self, id: impl Into<String>, adapter: impl NodeAdapter) -> Self {
        self.nodes.push((id.into(), Arc::new(adapter)));
        self
    }

    /// Unconditional edge.
    pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), Edge::Plain { to: to.into() }));
        self
    }

    /// Guarded edge. `targets` declares every id the guard may return.
    pub fn connect_conditional<F>(
        mut self,
        from: impl Into<String>,
        guard: F,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self
    where
        F: Fn(&WorkflowState) -> String + Send + Sync + 'static,
    {
        self.edges.push((
            from.into(),
            Edge::Guarded {
                guard: Arc::new(guard),
                targets: targets.into_iter().map(Into::into).collect(),
            },
        ));
        self
    }

    /// Validate the declared structure and freeze it. All structural
    /// integrity checking happens here; a graph that compiles cannot
    /// produce a definition error mid-run.
    pub fn compile(self, start: impl Into<String>) -> Result<GraphDefinition> {
        let start = start.into();

        let mut nodes: HashMap<String, Arc<dyn NodeAdapter>> = HashMap::new();
        for (id, adapter) in self.nodes {
            if id == END || nodes.insert(id.clone(), adapter).is_some() {
                return Err(FlowError::DuplicateNode(id));
            }
        }

        if !nodes.contains_key(&start) {
            return Err(FlowError::UnknownStartNode(start));
        }

        let declared = |id: &str| id == END || nodes.contains_key(id);

        let mut edges: HashMap<String, Edge> = HashMap::new();
        let mut sources: HashSet<String> = HashSet::new();
        for (from, edge) in self.edges {
            if !nodes.contains_key(&from) {
                return Err(FlowError::UnknownEdgeSource(from));
            }
            match &edge {
                Edge::Plain { to } => {
                    if !declared(to) {
                        return Err(FlowError::UnknownEdgeTarget {
                            from,
                            to: to.clone(),
                        });
                    }
                }
                Edge::Guarded { targets, .. } => {
                    for to in targets {
                        if !declared(to) {
                            return Err(FlowError::UnknownEdgeTarget {
                                from,
                                to: to.clone(),
                            });
                        }
                    }
                }
            }
            if !sources.insert(from.clone()) {
                return Err(FlowError::MultipleEdges(from));
            }
            edges.insert(from, edge);
        }

        // Every declared node except END must have exactly one outgoing edge.
        for id in nodes.keys() {
            if !edges.contains_key(id) {
                return Err(FlowError::MissingEdge(id.clone()));
            }
        }

        Ok(GraphDefinition {
            nodes,
            edges,
            start,
        })
    }
}

/// A compiled, immutable workflow graph. Carries no per-run data and can be
/// walked any number of times.
pub struct GraphDefinition {
    nodes: HashMap<String, Arc<dyn NodeAdapter>>,
    edges: HashMap<String, Edge>,
    start: String,
}

impl GraphDefinition {
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub(crate) fn adapter(&self, id: &str) -> Option<&Arc<dyn NodeAdapter>> {
        self.nodes.get(id)
    }

    /// Resolve the cursor after `from`, evaluating the guard against the
    /// post-merge state for guarded edges.
    pub(crate) fn next(&self, from: &str, state: &WorkflowState) -> Result<String> {
        match self.edges.get(from) {
            Some(Edge::Plain { to }) => Ok(to.clone()),
            Some(Edge::Guarded { guard, targets }) => {
                let chosen = guard(state);
                if targets.iter().any(|t| t == &chosen) {
                    Ok(chosen)
                } else {
                    Err(FlowError::GuardEvaluation {
                        node: from.to_string(),
                        returned: chosen,
                    })
                }
            }
            None => Err(FlowError::MissingEdge(from.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitflow_core::state::StateUpdate;
    use commitflow_core::traits::AdapterKind;
    use futures::future::BoxFuture;

    struct Noop;

    impl NodeAdapter for Noop {
        fn kind(&self) -> AdapterKind {
            AdapterKind::ReadOnly
        }

        fn run(&self, _state: WorkflowState) -> BoxFuture<'_, Result<StateUpdate>> {
            Box::pin(async { Ok(StateUpdate::default()) })
        }
    }

    #[test]
    fn compile_accepts_a_linear_graph() {
        let graph = GraphBuilder::new()
            .register("a", Noop)
            .register("b", Noop)
            .connect("a", "b")
            .connect("b", END)
            .compile("a")
            .unwrap();
        assert_eq!(graph.start(), "a");
        assert_eq!(graph.node_ids().count(), 2);
    }

    #[test]
    fn compile_rejects_duplicate_node_ids() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .register("a", Noop)
            .connect("a", END)
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::DuplicateNode(id) if id == "a"));
    }

    #[test]
    fn compile_rejects_dangling_edge_target() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .connect("a", "ghost")
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(
            matches!(err, FlowError::UnknownEdgeTarget { ref from, ref to } if from == "a" && to == "ghost")
        );
    }

    #[test]
    fn compile_rejects_edge_from_undeclared_node() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .connect("a", END)
            .connect("ghost", END)
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::UnknownEdgeSource(id) if id == "ghost"));
    }

    #[test]
    fn compile_rejects_undeclared_guard_target() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .connect_conditional("a", |_| END.to_string(), ["ghost", END])
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::UnknownEdgeTarget { ref to, .. } if to == "ghost"));
    }

    #[test]
    fn compile_rejects_node_without_outgoing_edge() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .register("b", Noop)
            .connect("a", "b")
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::MissingEdge(id) if id == "b"));
    }

    #[test]
    fn compile_rejects_second_outgoing_edge() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .connect("a", END)
            .connect("a", END)
            .compile("a")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::MultipleEdges(id) if id == "a"));
    }

    #[test]
    fn compile_rejects_unknown_start() {
        let err = GraphBuilder::new()
            .register("a", Noop)
            .connect("a", END)
            .compile("nope")
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::UnknownStartNode(id) if id == "nope"));
    }

    #[test]
    fn compile_rejects_end_as_node_id() {
        let err = GraphBuilder::new()
            .register(END, Noop)
            .compile(END)
            .err()
            .expect("expected a compile error");
        assert!(matches!(err, FlowError::DuplicateNode(id) if id == END));
    }

    #[test]
    fn guard_is_pure_over_identical_snapshots() {
        let graph = GraphBuilder::new()
            .register("check", Noop)
            .register("commit", Noop)
            .connect_conditional(
                "check",
                |state: &WorkflowState| {
                    if state.has_staged_files == Some(true) {
                        "commit".to_string()
                    } else {
                        END.to_string()
                    }
                },
                ["commit", END],
            )
            .connect("commit", END)
            .compile("check")
            .unwrap();

        let state = WorkflowState {
            has_staged_files: Some(true),
            ..Default::default()
        };
        let first = graph.next("check", &state).unwrap();
        let second = graph.next("check", &state).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "commit");
    }

    #[test]
    fn guard_returning_undeclared_target_is_an_error() {
        let graph = GraphBuilder::new()
            .register("check", Noop)
            .connect_conditional("check", |_| "rogue".to_string(), [END])
            .compile("check")
            .unwrap();

        let err = graph.next("check", &WorkflowState::default()).unwrap_err();
        assert!(
            matches!(err, FlowError::GuardEvaluation { ref node, ref returned } if node == "check" && returned == "rogue")
        );
    }
}
