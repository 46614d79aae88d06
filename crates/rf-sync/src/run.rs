//! Rendering of execution results.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;

/// Outcome of one run, as returned by the execution endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum RunResult {
    Success(Value),
    Failure(Value),
}

impl RunResult {
    /// Success is pretty-printed JSON. Failure is `Error: ` followed by the
    /// payload, with string payloads shown unquoted.
    pub fn render(&self) -> String {
        match self {
            RunResult::Success(value) => pretty(value),
            RunResult::Failure(Value::String(message)) => format!("Error: {message}"),
            RunResult::Failure(payload) => format!("Error: {payload}"),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Last completed run result. Concurrent runs overwrite each other in
/// completion order.
#[derive(Debug, Default)]
pub struct RunResultView {
    last: Mutex<Option<RunResult>>,
}

impl RunResultView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: RunResult) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    pub fn last(&self) -> Option<RunResult> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn text(&self) -> Option<String> {
        self.last().map(|r| r.render())
    }

    pub fn clear(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
