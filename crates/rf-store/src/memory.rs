//! In-process rule store.
//!
//! Rules get sequential integer ids. Every call is recorded, individual
//! operations can be made to fail, and operations can be held open on a
//! gate, which makes the store useful for exercising sync logic offline.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rf_core::rule::{Rule, RuleId, RuleSummary, RunRequest, SavePayload};
use serde_json::{json, Value};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{RuleStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Patch,
    Put,
    Rename,
    Delete,
    Run,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub rule_id: Option<RuleId>,
    pub key: Option<Uuid>,
}

#[derive(Default)]
struct Inner {
    rules: BTreeMap<u64, Rule>,
    next_id: u64,
    failures: HashMap<StoreOp, StoreError>,
    gates: HashMap<StoreOp, Arc<Notify>>,
    calls: Vec<StoreCall>,
    run_response: Option<Value>,
}

#[derive(Default)]
pub struct MemoryRuleStore {
    inner: Mutex<Inner>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a rule directly, returning its id.
    pub fn insert(&self, name: &str, definition: Value) -> RuleId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let rule = Rule {
            id: RuleId::from(id),
            name: name.into(),
            description: String::new(),
            definition,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        inner.rules.insert(id, rule);
        RuleId::from(id)
    }

    pub fn rule(&self, id: &RuleId) -> Option<Rule> {
        let key = numeric(id)?;
        self.lock().rules.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every call of `op` fail with `err` until cleared.
    pub fn fail(&self, op: StoreOp, err: StoreError) {
        self.lock().failures.insert(op, err);
    }

    pub fn clear_failure(&self, op: StoreOp) {
        self.lock().failures.remove(&op);
    }

    /// Hold every call of `op` until the returned gate is notified once per
    /// call. Remove with [`MemoryRuleStore::open`].
    pub fn hold(&self, op: StoreOp) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().gates.insert(op, Arc::clone(&gate));
        gate
    }

    pub fn open(&self, op: StoreOp) {
        self.lock().gates.remove(&op);
    }

    /// Fix the response of the execution endpoint.
    pub fn set_run_response(&self, response: Value) {
        self.lock().run_response = Some(response);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.lock().calls.iter().map(|c| c.op).collect()
    }

    /// Record the call, wait on its gate if any, then report an injected
    /// failure. The lock is never held across the wait.
    async fn enter(&self, op: StoreOp, rule_id: Option<&RuleId>, key: Option<Uuid>) -> Result<(), StoreError> {
        let gate = {
            let mut inner = self.lock();
            inner.calls.push(StoreCall {
                op,
                rule_id: rule_id.cloned(),
                key,
            });
            inner.gates.get(&op).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.lock().failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn update(&self, id: &RuleId, apply: impl FnOnce(&mut Rule)) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let rule = numeric(id)
            .and_then(|key| inner.rules.get_mut(&key))
            .ok_or_else(|| not_found(id))?;
        apply(rule);
        rule.updated_at = Some(Utc::now());
        Ok(())
    }
}

fn numeric(id: &RuleId) -> Option<u64> {
    id.as_str().parse().ok()
}

fn not_found(id: &RuleId) -> StoreError {
    StoreError::NotFound {
        path: format!("/rules/{id}/"),
        body: Value::Null,
    }
}

fn definition_value(payload: &SavePayload) -> Result<Value, StoreError> {
    serde_json::to_value(&payload.definition).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn get_rule(&self, id: &RuleId) -> Result<Rule, StoreError> {
        self.enter(StoreOp::Get, Some(id), None).await?;
        self.rule(id).ok_or_else(|| not_found(id))
    }

    async fn list_rules(&self, search: &str) -> Result<Vec<RuleSummary>, StoreError> {
        self.enter(StoreOp::List, None, None).await?;
        let needle = search.to_lowercase();
        // Newest first, matching on name or id.
        Ok(self
            .lock()
            .rules
            .values()
            .rev()
            .filter(|r| {
                needle.is_empty()
                    || r.name.to_lowercase().contains(&needle)
                    || r.id.as_str().contains(&needle)
            })
            .map(RuleSummary::from)
            .collect())
    }

    async fn create_rule(&self, payload: &SavePayload, key: Uuid) -> Result<Rule, StoreError> {
        self.enter(StoreOp::Create, None, Some(key)).await?;
        let id = self.insert(&payload.name, definition_value(payload)?);
        self.rule(&id).ok_or_else(|| not_found(&id))
    }

    async fn patch_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError> {
        self.enter(StoreOp::Patch, Some(id), Some(key)).await?;
        let definition = definition_value(payload)?;
        self.update(id, |rule| {
            rule.name = payload.name.clone();
            rule.definition = definition;
        })
    }

    async fn put_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError> {
        self.enter(StoreOp::Put, Some(id), Some(key)).await?;
        let definition = definition_value(payload)?;
        self.update(id, |rule| {
            rule.name = payload.name.clone();
            rule.description = String::new();
            rule.definition = definition;
        })
    }

    async fn rename_rule(&self, id: &RuleId, name: &str) -> Result<(), StoreError> {
        self.enter(StoreOp::Rename, Some(id), None).await?;
        self.update(id, |rule| rule.name = name.to_string())
    }

    async fn delete_rule(&self, id: &RuleId) -> Result<(), StoreError> {
        self.enter(StoreOp::Delete, Some(id), None).await?;
        let key = numeric(id).ok_or_else(|| not_found(id))?;
        self.lock()
            .rules
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn run_rule(&self, id: &RuleId, request: &RunRequest) -> Result<Value, StoreError> {
        self.enter(StoreOp::Run, Some(id), None).await?;
        if self.rule(id).is_none() {
            return Err(not_found(id));
        }
        let fixed = self.lock().run_response.clone();
        Ok(fixed.unwrap_or_else(|| {
            json!({
                "status": "success",
                "nodes": request.definition.nodes.len(),
                "edges": request.definition.edges.len(),
            })
        }))
    }
}
