//! rf-sync: moves the editor graph to and from the rule store.
//!
//! [`controller::SyncController`] owns the rule identity of a session and
//! runs load, save and run against any [`rf_store::RuleStore`].
//! [`run::RunResultView`] keeps what the last completed run returned.

pub mod controller;
pub mod run;

use rf_core::rule::RuleId;
use rf_core::GraphError;
use rf_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Rule {0} not found")]
    NotFound(RuleId),
    #[error("rule definition rejected: {0}")]
    Graph(#[from] GraphError),
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("a rule is still loading")]
    LoadInProgress,
    #[error("rule has not been saved yet")]
    NotSaved,
    #[error("save failed (patch: {patch}; put: {put})")]
    SaveFailed { patch: StoreError, put: StoreError },
}

impl SyncError {
    /// Payload shown to the user for this failure.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            SyncError::Store(err) => err.payload(),
            SyncError::SaveFailed { put, .. } => put.payload(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}
