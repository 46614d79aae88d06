//! rf-store: access to the remote rule store.
//!
//! [`RuleStore`] is the contract with the REST backend (CRUD on rules plus
//! the execution webhook). [`client::HttpRuleStore`] talks to a live server;
//! [`memory::MemoryRuleStore`] keeps rules in process.

pub mod client;
pub mod config;
pub mod list;
pub mod memory;

use async_trait::async_trait;
use rf_core::rule::{Rule, RuleId, RuleSummary, RunRequest, SavePayload};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("not found: {path}")]
    NotFound {
        path: String,
        /// Response body; null when the server sent none.
        body: serde_json::Value,
    },
    #[error("server returned {status}: {body}")]
    Status {
        status: u16,
        /// Response body, as JSON when it parses, else as a JSON string.
        body: serde_json::Value,
    },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl StoreError {
    /// The payload worth showing to a user: the server's body when there is
    /// one, else the error message.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            StoreError::Status { body, .. } | StoreError::NotFound { body, .. } if !body.is_null() => {
                body.clone()
            }
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

/// REST rule store contract.
///
/// Saves carry an idempotency key; the partial update and its full-replace
/// fallback share the key of the save they belong to.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn get_rule(&self, id: &RuleId) -> Result<Rule, StoreError>;

    async fn list_rules(&self, search: &str) -> Result<Vec<RuleSummary>, StoreError>;

    async fn create_rule(&self, payload: &SavePayload, key: Uuid) -> Result<Rule, StoreError>;

    async fn patch_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError>;

    async fn put_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError>;

    async fn rename_rule(&self, id: &RuleId, name: &str) -> Result<(), StoreError>;

    async fn delete_rule(&self, id: &RuleId) -> Result<(), StoreError>;

    /// Submit a snapshot for execution; the response is opaque JSON.
    async fn run_rule(&self, id: &RuleId, request: &RunRequest) -> Result<serde_json::Value, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_prefers_server_body() {
        let err = StoreError::Status {
            status: 400,
            body: json!({"status": "error", "logs": []}),
        };
        assert_eq!(err.payload(), json!({"status": "error", "logs": []}));
        assert_eq!(StoreError::Timeout.payload(), json!("request timed out"));
    }
}
