//! Rule records and the request bodies exchanged with the rule store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::Definition;

// ---------------------------------------------------------------------------
// RuleId
// ---------------------------------------------------------------------------

/// Server-assigned rule identifier. The store hands out integers; both
/// numbers and strings are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RuleId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => RuleId(n.to_string()),
            Raw::Text(s) => RuleId(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Rule records
// ---------------------------------------------------------------------------

/// A persisted, named graph definition. The definition is kept raw: it is
/// normalized by [`crate::graph::GraphModel::load`] when opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Entry of the rule list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RuleSummary {
    /// Name shown in lists; unnamed rules fall back to "Rule <id>".
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Rule {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl From<&Rule> for RuleSummary {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            updated_at: rule.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of create / partial update / full replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub definition: Definition,
    pub name: String,
}

/// Body of a rename from the rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePayload {
    pub name: String,
}

/// Body of an execution request. Carries the snapshot; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub definition: Definition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_id_accepts_numbers_and_strings() {
        let a: RuleId = serde_json::from_value(json!(42)).unwrap();
        let b: RuleId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap(), json!("42"));
    }

    #[test]
    fn rule_decodes_store_response() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 3,
            "name": "Orders",
            "description": "",
            "definition": {"nodes": [], "edges": []},
            "created_at": "2024-05-01T10:00:00.123456Z",
            "updated_at": "2024-05-02T10:00:00+02:00"
        }))
        .unwrap();
        assert_eq!(rule.id.as_str(), "3");
        assert_eq!(rule.name, "Orders");
        assert!(rule.updated_at.is_some());
    }

    #[test]
    fn rule_tolerates_missing_optional_fields() {
        let rule: Rule = serde_json::from_value(json!({"id": 9})).unwrap();
        assert!(rule.definition.is_null());
        assert!(rule.name.is_empty());
    }

    #[test]
    fn summary_display_name_falls_back_to_id() {
        let summary: RuleSummary = serde_json::from_value(json!({"id": 5, "name": ""})).unwrap();
        assert_eq!(summary.display_name(), "Rule 5");
    }
}
