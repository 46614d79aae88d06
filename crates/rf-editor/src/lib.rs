//! rf-editor: the editing session behind the ruleflow canvas.
//!
//! [`state::EditorSession`] ties the graph, selection, node editors and the
//! sync controller together. The functions under [`commands`] are the
//! surface a canvas host (or the `ruleflow` binary) calls.

pub mod commands;
pub mod config;
pub mod notice;
pub mod state;

use rf_core::{GraphError, ValidationError};
use rf_store::StoreError;
use rf_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("node not found: {0}")]
    UnknownNode(String),
    #[error("node {0} has no editable fields")]
    NotEditable(String),
    #[error("node {0} is not being edited")]
    NoOpenEditor(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
