//! Workflow graph: nodes + edges, compile, then run.
//!
//! A [`GraphBuilder`] collects named node adapters and plain or guarded
//! edges, and `compile()` validates the whole structure up front — dangling
//! edges, duplicate ids, or a missing start node are definition errors that
//! can never surface mid-run. The compiled [`GraphDefinition`] is immutable;
//! the [`Executor`] walks it from the start node to the [`END`] sentinel,
//! merging each adapter's partial update into the workflow state.

mod executor;
mod graph;

pub use executor::Executor;
pub use graph::{GraphBuilder, GraphDefinition, Guard, END};
