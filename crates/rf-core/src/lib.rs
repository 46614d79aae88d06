//! rf-core: Shared types for the ruleflow editor
//!
//! This crate performs no I/O. It defines the rule graph, the node variants
//! and their validation, and selection-driven deletion. The other rf-*
//! crates build on top of it.

pub mod graph;
pub mod rule;
pub mod selection;
pub mod variant;

use thiserror::Error;

use crate::graph::NodeKind;

/// Structural errors raised by the graph model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("malformed definition: {0}")]
    Malformed(String),
    #[error("node {node_id}: unknown node type '{kind}'")]
    UnknownNodeType { node_id: String, kind: String },
    #[error("node {node_id}: invalid data for '{kind}' node: {message}")]
    InvalidNodeData {
        node_id: String,
        kind: NodeKind,
        message: String,
    },
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(String),
    #[error("edge endpoint does not exist: {0}")]
    UnknownEndpoint(String),
    #[error("node {node_id}: a '{patch}' patch cannot be applied to a '{kind}' node")]
    VariantMismatch {
        node_id: String,
        kind: NodeKind,
        patch: NodeKind,
    },
}

/// Local, recoverable errors from committing a staged edit buffer.
///
/// These are rendered inline next to the editing surface and never reach
/// the network layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("JSON must be an object (e.g. {{\"key\":\"value\"}})")]
    NotAnObject,
    #[error("Headers or Body JSON invalid")]
    HeadersOrBodyInvalid,
    #[error("Headers must be a JSON object")]
    HeadersNotObject,
    #[error("invalid URL: must start with http:// or https://")]
    InvalidUrl,
    #[error("a '{buffer}' buffer cannot be applied to a '{kind}' node")]
    WrongVariant { kind: NodeKind, buffer: NodeKind },
}

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::graph::{
        CanvasBounds, Definition, Edge, GraphModel, Node, NodeKind, Position, RemovalSummary,
    };
    pub use crate::rule::{RenamePayload, Rule, RuleId, RuleSummary, RunRequest, SavePayload};
    pub use crate::selection::{InputFocus, Key, KeyOutcome, SelectionTracker};
    pub use crate::variant::{
        HttpMethod, NodeCommitted, NodeData, NodeEditor, NodePatch, NodeVariantRegistry,
        StagedBuffer,
    };
    pub use crate::{GraphError, ValidationError};
}
