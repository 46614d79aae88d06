//! Rule list commands.

use rf_core::rule::RuleId;
use rf_store::list::RuleList;

use crate::state::EditorSession;
use crate::EditorError;

pub async fn search(query: &str, list: &mut RuleList, session: &EditorSession) -> Result<(), EditorError> {
    let store = session.sync().store().clone();
    if let Err(err) = list.refresh(store.as_ref(), query).await {
        tracing::warn!(query, "rule list refresh failed: {err}");
        session.notices().error(format!("Failed to load rules: {err}"));
        return Err(err.into());
    }
    tracing::debug!(query, rules = list.rules().len(), "rule list refreshed");
    Ok(())
}

pub async fn rename(
    id: &RuleId,
    name: &str,
    list: &mut RuleList,
    session: &EditorSession,
) -> Result<bool, EditorError> {
    let store = session.sync().store().clone();
    let renamed = list.rename(store.as_ref(), id, name).await.map_err(|err| {
        session.notices().error("Rename failed");
        EditorError::from(err)
    })?;
    tracing::info!(rule_id = %id, renamed, "rename command finished");
    Ok(renamed)
}

pub async fn delete(id: &RuleId, list: &mut RuleList, session: &EditorSession) -> Result<bool, EditorError> {
    let store = session.sync().store().clone();
    let deleted = list.delete(store.as_ref(), id).await.map_err(|err| {
        session.notices().error("Delete failed");
        EditorError::from(err)
    })?;
    tracing::info!(rule_id = %id, deleted, "delete command finished");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::graph::{CanvasBounds, GraphModel};
    use rf_store::memory::{MemoryRuleStore, StoreOp};
    use rf_store::StoreError;
    use serde_json::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn failed_rename_is_rolled_back_and_reported() {
        let store = Arc::new(MemoryRuleStore::new());
        let id = store.insert("Orders", Value::Null);
        let session = EditorSession::new(GraphModel::new(CanvasBounds::default()), store.clone());
        let mut list = RuleList::new();
        search("", &mut list, &session).await.unwrap();

        store.fail(StoreOp::Rename, StoreError::Timeout);
        assert!(rename(&id, "Invoices", &mut list, &session).await.is_err());
        assert_eq!(list.rules()[0].name, "Orders");
        assert_eq!(session.notices().drain().len(), 1);

        assert!(delete(&id, &mut list, &session).await.unwrap());
        assert!(list.rules().is_empty());
        assert!(store.is_empty());
    }
}
