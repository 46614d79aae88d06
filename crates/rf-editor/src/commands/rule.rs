//! Remote rule commands: load, save, run and import.
//!
//! Outcomes are reported twice: as the return value, and as a [`Notice`]
//! for the user. Store failures are logged in detail by the sync layer.
//!
//! [`Notice`]: crate::notice::Notice

use rf_core::graph::GraphModel;
use rf_core::rule::RuleId;
use rf_sync::controller::{SaveOutcome, SaveVia};
use rf_sync::run::RunResult;
use rf_sync::SyncError;
use serde_json::Value;

use crate::state::EditorSession;
use crate::EditorError;

/// Open `rule_id`, or start a new rule when `None`.
pub async fn load(rule_id: Option<RuleId>, session: &EditorSession) -> Result<(), EditorError> {
    tracing::info!(rule_id = ?rule_id, "open rule");
    session.reset_view();
    if let Err(err) = session.sync.load(rule_id, &session.graph).await {
        match &err {
            SyncError::NotFound(_) => session.notices.error(err.to_string()),
            other => session.notices.error(format!("Failed to load rule: {other}")),
        }
        return Err(err.into());
    }
    Ok(())
}

pub async fn save(session: &EditorSession) -> Result<SaveOutcome, EditorError> {
    match session.sync.save(&session.graph).await {
        Ok(outcome) => {
            let message = match &outcome {
                SaveOutcome::Created(_) => format!("Created new rule: {}", session.sync.name()),
                SaveOutcome::Updated { via: SaveVia::Patch, .. } => "Saved".to_string(),
                SaveOutcome::Updated { via: SaveVia::Put, .. } => "Saved via PUT".to_string(),
            };
            tracing::info!(rule_id = %outcome.rule_id(), "{message}");
            session.notices.info(message);
            Ok(outcome)
        }
        Err(err) => {
            tracing::warn!("save command failed: {err}");
            match &err {
                SyncError::SaveInProgress => session.notices.error("A save is already in progress"),
                SyncError::LoadInProgress => session.notices.error("Wait for the rule to finish loading"),
                _ => session.notices.error("Save failed"),
            }
            Err(err.into())
        }
    }
}

/// Execute the current graph; the result view shows the response or the
/// error payload.
pub async fn run(session: &EditorSession) -> Result<Value, EditorError> {
    match session.sync.run(&session.graph).await {
        Ok(response) => {
            tracing::info!("run command succeeded");
            session.run_result.record(RunResult::Success(response.clone()));
            Ok(response)
        }
        Err(SyncError::NotSaved) => {
            tracing::warn!("run command rejected: rule not saved");
            session.notices.error("Save the rule before running it");
            Err(SyncError::NotSaved.into())
        }
        Err(SyncError::LoadInProgress) => {
            tracing::warn!("run command rejected: rule still loading");
            session.notices.error("Wait for the rule to finish loading");
            Err(SyncError::LoadInProgress.into())
        }
        Err(err) => {
            tracing::warn!("run command failed: {err}");
            session.run_result.record(RunResult::Failure(err.payload()));
            Err(err.into())
        }
    }
}

/// Replace the graph with a definition from outside the editor and save
/// it. With `rule_id` the existing rule is loaded first and then updated,
/// otherwise a new rule is created.
pub async fn import(
    definition: &Value,
    rule_id: Option<RuleId>,
    name: Option<String>,
    session: &EditorSession,
) -> Result<SaveOutcome, EditorError> {
    let mut imported = GraphModel::new(session.graph().bounds());
    if let Err(err) = imported.load(definition) {
        tracing::warn!("import rejected: {err}");
        return Err(err.into());
    }
    tracing::info!(
        nodes = imported.nodes().len(),
        target = ?rule_id,
        "importing definition"
    );

    load(rule_id, session).await?;
    *session.graph_mut() = imported;
    if let Some(name) = name {
        session.sync.set_name(name);
    }
    save(session).await
}

/// Location of the session: `/editor/<id>`, or `/editor/` for a new rule.
pub fn route(session: &EditorSession) -> String {
    match session.sync.rule_id() {
        Some(id) => format!("/editor/{id}"),
        None => "/editor/".to_string(),
    }
}
