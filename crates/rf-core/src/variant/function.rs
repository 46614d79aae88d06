//! Function node: a free-text expression evaluated by the remote engine.
//!
//! The editor does not interpret the expression; any text commits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, NodeVariant};
use crate::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_expr", deserialize_with = "null_as_default")]
    pub expr: String,
    /// Fields the editor does not model, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FunctionData {
    fn default() -> Self {
        Self {
            label: None,
            expr: default_expr(),
            extra: Map::new(),
        }
    }
}

fn default_expr() -> String {
    "''".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBuffer {
    pub expr: String,
}

pub struct FunctionVariant;

impl NodeVariant for FunctionVariant {
    type Data = FunctionData;
    type Buffer = FunctionBuffer;

    fn apply(buffer: &FunctionBuffer, current: &FunctionData) -> Result<FunctionData, ValidationError> {
        Ok(FunctionData {
            label: current.label.clone(),
            expr: buffer.expr.clone(),
            extra: current.extra.clone(),
        })
    }

    fn reset(current: &FunctionData) -> FunctionBuffer {
        FunctionBuffer {
            expr: current.expr.clone(),
        }
    }
}
