use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    // Graph definition errors — raised by compile(), never mid-run
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("edge references undeclared node: {from} -> {to}")]
    UnknownEdgeTarget { from: String, to: String },

    #[error("edge declared from undeclared node: {0}")]
    UnknownEdgeSource(String),

    #[error("node has no outgoing edge: {0}")]
    MissingEdge(String),

    #[error("node has more than one outgoing edge: {0}")]
    MultipleEdges(String),

    #[error("start node is not declared: {0}")]
    UnknownStartNode(String),

    // Guard errors
    #[error("guard at node {node} returned undeclared target: {returned}")]
    GuardEvaluation { node: String, returned: String },

    // External command errors
    #[error("command `{command}` failed ({status}): {stderr}")]
    ExternalCommand {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    // Interaction channel errors
    #[error("interaction channel closed before a response arrived")]
    InteractionCancelled,

    // Provider errors
    #[error("provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    // State errors
    #[error("workflow state field never populated on this path: {0}")]
    MissingStateField(&'static str),

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
