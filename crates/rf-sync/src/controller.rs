//! Sync controller: load, save and run for one editing session.
//!
//! The graph lives behind a `std::sync::RwLock` owned by the caller. Every
//! operation snapshots what it needs under the lock and releases it before
//! awaiting the store, so canvas edits keep working while requests are in
//! flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use rf_core::graph::GraphModel;
use rf_core::rule::{RuleId, RunRequest, SavePayload};
use rf_store::{RuleStore, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::SyncError;

/// Externally visible state, derived from what is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading,
    Saving,
    Running,
}

/// Which request stored an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveVia {
    Patch,
    Put,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new rule was created and the session now points at it.
    Created(RuleId),
    Updated { id: RuleId, via: SaveVia },
}

impl SaveOutcome {
    pub fn rule_id(&self) -> &RuleId {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated { id, .. } => id,
        }
    }
}

#[derive(Debug)]
struct RuleState {
    rule_id: Option<RuleId>,
    name: String,
}

#[derive(Debug, Default)]
struct InFlight {
    loading: AtomicUsize,
    saving: AtomicUsize,
    running: AtomicUsize,
}

/// Decrements its counter when dropped.
struct Tracked<'a>(&'a AtomicUsize);

impl<'a> Tracked<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }

    /// Enter only if nothing else holds the counter.
    fn exclusive(counter: &'a AtomicUsize) -> Option<Self> {
        counter
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(counter))
    }
}

impl Drop for Tracked<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SyncController {
    store: Arc<dyn RuleStore>,
    rule: Mutex<RuleState>,
    /// Name used while the session edits an unsaved rule.
    fresh_name: String,
    in_flight: InFlight,
}

impl SyncController {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        let fresh_name = format!("Rule {}", rand::thread_rng().gen_range(0..10_000));
        Self {
            store,
            rule: Mutex::new(RuleState {
                rule_id: None,
                name: fresh_name.clone(),
            }),
            fresh_name,
            in_flight: InFlight::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }

    fn rule(&self) -> MutexGuard<'_, RuleState> {
        self.rule.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rule_id(&self) -> Option<RuleId> {
        self.rule().rule_id.clone()
    }

    pub fn name(&self) -> String {
        self.rule().name.clone()
    }

    /// Name sent with the next save.
    pub fn set_name(&self, name: impl Into<String>) {
        self.rule().name = name.into();
    }

    pub fn state(&self) -> SyncState {
        let busy = |counter: &AtomicUsize| counter.load(Ordering::SeqCst) > 0;
        if busy(&self.in_flight.loading) {
            SyncState::Loading
        } else if busy(&self.in_flight.saving) {
            SyncState::Saving
        } else if busy(&self.in_flight.running) {
            SyncState::Running
        } else {
            SyncState::Idle
        }
    }

    /// Point the session at `rule_id` and replace the graph with its
    /// definition. `None` starts a new, empty rule.
    ///
    /// The id is adopted only once the definition is in the graph. On
    /// failure the graph is left empty and the session is back in new-rule
    /// mode, so nothing can be saved over the requested rule.
    pub async fn load(&self, rule_id: Option<RuleId>, model: &RwLock<GraphModel>) -> Result<(), SyncError> {
        let Some(id) = rule_id else {
            write(model).clear();
            self.start_new_rule();
            tracing::debug!("started a new rule");
            return Ok(());
        };

        let _loading = Tracked::enter(&self.in_flight.loading);

        let fetched = match self.store.get_rule(&id).await {
            Ok(rule) => rule,
            Err(err) => {
                write(model).clear();
                self.start_new_rule();
                tracing::error!(rule_id = %id, "load failed: {err}");
                return Err(match err {
                    StoreError::NotFound { .. } => SyncError::NotFound(id),
                    other => other.into(),
                });
            }
        };

        {
            let mut graph = write(model);
            if let Err(err) = graph.load(&fetched.definition) {
                graph.clear();
                drop(graph);
                self.start_new_rule();
                tracing::error!(rule_id = %id, "stored definition rejected: {err}");
                return Err(err.into());
            }
        }

        let name = if fetched.name.trim().is_empty() {
            format!("Rule {id}")
        } else {
            fetched.name
        };
        tracing::info!(rule_id = %id, %name, "rule loaded");
        let mut rule = self.rule();
        rule.rule_id = Some(id);
        rule.name = name;
        Ok(())
    }

    fn start_new_rule(&self) {
        let mut rule = self.rule();
        rule.rule_id = None;
        rule.name = self.fresh_name.clone();
    }

    fn ensure_not_loading(&self, action: &str) -> Result<(), SyncError> {
        if self.in_flight.loading.load(Ordering::SeqCst) > 0 {
            tracing::warn!("{action} rejected: a rule is loading");
            return Err(SyncError::LoadInProgress);
        }
        Ok(())
    }

    /// Persist the current graph. Creates the rule when the session has no
    /// id yet, otherwise tries a partial update and falls back to a full
    /// replace. Both attempts share one idempotency key.
    pub async fn save(&self, model: &RwLock<GraphModel>) -> Result<SaveOutcome, SyncError> {
        let Some(_saving) = Tracked::exclusive(&self.in_flight.saving) else {
            tracing::warn!("save rejected: another save is in flight");
            return Err(SyncError::SaveInProgress);
        };
        self.ensure_not_loading("save")?;

        let payload = SavePayload {
            definition: read(model).serialize(),
            name: self.name(),
        };
        let key = Uuid::new_v4();

        let Some(id) = self.rule_id() else {
            let created = self.store.create_rule(&payload, key).await.inspect_err(|err| {
                tracing::error!("create failed: {err}");
            })?;
            tracing::info!(rule_id = %created.id, "rule created");
            self.rule().rule_id = Some(created.id.clone());
            return Ok(SaveOutcome::Created(created.id));
        };

        let patch_err = match self.store.patch_rule(&id, &payload, key).await {
            Ok(()) => {
                tracing::info!(rule_id = %id, "rule saved");
                return Ok(SaveOutcome::Updated { id, via: SaveVia::Patch });
            }
            Err(err) => err,
        };

        tracing::warn!(rule_id = %id, "patch failed, retrying with put: {patch_err}");
        match self.store.put_rule(&id, &payload, key).await {
            Ok(()) => {
                tracing::info!(rule_id = %id, "rule saved via put");
                Ok(SaveOutcome::Updated { id, via: SaveVia::Put })
            }
            Err(put) => {
                tracing::error!(rule_id = %id, "save failed: {put}");
                Err(SyncError::SaveFailed { patch: patch_err, put })
            }
        }
    }

    /// Submit the current graph for execution without persisting it.
    pub async fn run(&self, model: &RwLock<GraphModel>) -> Result<Value, SyncError> {
        self.ensure_not_loading("run")?;
        let id = self.rule_id().ok_or(SyncError::NotSaved)?;
        let _running = Tracked::enter(&self.in_flight.running);

        let request = RunRequest {
            definition: read(model).serialize(),
        };
        match self.store.run_rule(&id, &request).await {
            Ok(response) => {
                tracing::info!(rule_id = %id, "run completed");
                Ok(response)
            }
            Err(err) => {
                tracing::error!(rule_id = %id, "run failed: {err}");
                Err(err.into())
            }
        }
    }
}

fn read(model: &RwLock<GraphModel>) -> RwLockReadGuard<'_, GraphModel> {
    model.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(model: &RwLock<GraphModel>) -> RwLockWriteGuard<'_, GraphModel> {
    model.write().unwrap_or_else(PoisonError::into_inner)
}
