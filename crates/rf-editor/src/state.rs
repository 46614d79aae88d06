//! Session state shared by all editor commands.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rf_core::graph::GraphModel;
use rf_core::selection::SelectionTracker;
use rf_core::variant::{NodeCommitted, NodeEditor};
use rf_store::client::HttpRuleStore;
use rf_store::{RuleStore, StoreError};
use rf_sync::controller::SyncController;
use rf_sync::run::RunResultView;

use crate::config::EditorConfig;
use crate::notice::NoticeQueue;

/// Called after every successful node commit.
pub type PersistHook = Box<dyn Fn(&NodeCommitted) + Send + Sync>;

/// One open editor. Canvas commands lock briefly and never across an await.
pub struct EditorSession {
    /// Shared with in-flight sync operations, which snapshot it.
    pub(crate) graph: Arc<RwLock<GraphModel>>,
    pub(crate) selection: Mutex<SelectionTracker>,
    /// Open node editors by node id.
    pub(crate) editors: Mutex<HashMap<String, NodeEditor>>,
    pub(crate) sync: SyncController,
    pub(crate) run_result: RunResultView,
    pub(crate) notices: NoticeQueue,
    pub(crate) persist: Option<PersistHook>,
}

impl EditorSession {
    pub fn new(graph: GraphModel, store: Arc<dyn RuleStore>) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
            selection: Mutex::new(SelectionTracker::new()),
            editors: Mutex::new(HashMap::new()),
            sync: SyncController::new(store),
            run_result: RunResultView::new(),
            notices: NoticeQueue::default(),
            persist: None,
        }
    }

    /// Session against the HTTP rule store described by `config`.
    pub fn connect(config: &EditorConfig) -> Result<Self, StoreError> {
        let store = HttpRuleStore::new(&config.store)?;
        Ok(Self::new(GraphModel::new(config.canvas), Arc::new(store)))
    }

    pub fn with_persist_hook(mut self, hook: impl Fn(&NodeCommitted) + Send + Sync + 'static) -> Self {
        self.persist = Some(Box::new(hook));
        self
    }

    pub fn graph(&self) -> RwLockReadGuard<'_, GraphModel> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn graph_mut(&self) -> RwLockWriteGuard<'_, GraphModel> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selection(&self) -> MutexGuard<'_, SelectionTracker> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn editors(&self) -> MutexGuard<'_, HashMap<String, NodeEditor>> {
        self.editors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn run_result(&self) -> &RunResultView {
        &self.run_result
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Drop editors whose node is gone.
    pub(crate) fn prune_editors(&self) {
        let live: Vec<String> = self.graph().nodes().iter().map(|n| n.id.clone()).collect();
        self.editors().retain(|id, _| live.contains(id));
    }

    /// Forget everything tied to the previous graph.
    pub(crate) fn reset_view(&self) {
        self.selection().selection_changed(Vec::new(), Vec::new());
        self.editors().clear();
        self.run_result.clear();
    }
}
