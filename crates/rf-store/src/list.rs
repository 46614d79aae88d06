//! Rule list state with optimistic rename and delete.
//!
//! Changes are applied locally first; when the store rejects them the list
//! is restored to what it was before the call.

use rf_core::rule::{RuleId, RuleSummary};

use crate::{RuleStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<RuleSummary>,
    search: String,
}

impl RuleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[RuleSummary] {
        &self.rules
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Fetch the rules matching `search`. The current list is kept on error.
    pub async fn refresh(&mut self, store: &dyn RuleStore, search: &str) -> Result<(), StoreError> {
        let rules = store.list_rules(search).await?;
        self.search = search.to_string();
        self.rules = rules;
        Ok(())
    }

    /// Rename optimistically. Returns `Ok(false)` without a request when the
    /// name is empty or unchanged, or the rule is not listed.
    pub async fn rename(&mut self, store: &dyn RuleStore, id: &RuleId, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        let Some(index) = self.rules.iter().position(|r| &r.id == id) else {
            return Ok(false);
        };
        if name.is_empty() || self.rules[index].name == name {
            return Ok(false);
        }

        let previous = self.rules.clone();
        self.rules[index].name = name.to_string();
        if let Err(err) = store.rename_rule(id, name).await {
            tracing::error!(rule_id = %id, "rename failed: {err}");
            self.rules = previous;
            return Err(err);
        }
        Ok(true)
    }

    /// Delete optimistically. Returns `Ok(false)` when the rule is not listed.
    pub async fn delete(&mut self, store: &dyn RuleStore, id: &RuleId) -> Result<bool, StoreError> {
        if !self.rules.iter().any(|r| &r.id == id) {
            return Ok(false);
        }

        let previous = self.rules.clone();
        self.rules.retain(|r| &r.id != id);
        if let Err(err) = store.delete_rule(id).await {
            tracing::error!(rule_id = %id, "delete failed: {err}");
            self.rules = previous;
            return Err(err);
        }
        Ok(true)
    }
}
