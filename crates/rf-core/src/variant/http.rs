//! HTTP node: method, URL, headers and an optional JSON body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, NodeVariant};
use crate::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: HttpMethod,
    /// Empty until the node is first committed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub body: Value,
    /// Fields the editor does not model, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBuffer {
    pub method: HttpMethod,
    pub url: String,
    pub headers: String,
    pub body: String,
}

pub struct HttpVariant;

impl NodeVariant for HttpVariant {
    type Data = HttpData;
    type Buffer = HttpBuffer;

    fn apply(buffer: &HttpBuffer, current: &HttpData) -> Result<HttpData, ValidationError> {
        let headers = parse_or(&buffer.headers, Value::Object(Map::new()));
        let body = parse_or(&buffer.body, Value::Null);
        let (headers, body) = match (headers, body) {
            (Ok(headers), Ok(body)) => (headers, body),
            _ => return Err(ValidationError::HeadersOrBodyInvalid),
        };
        let Value::Object(headers) = headers else {
            return Err(ValidationError::HeadersNotObject);
        };

        let url = buffer.url.trim();
        if !has_http_scheme(url) {
            return Err(ValidationError::InvalidUrl);
        }

        Ok(HttpData {
            label: current.label.clone(),
            method: buffer.method,
            url: url.to_string(),
            headers,
            body,
            extra: current.extra.clone(),
        })
    }

    fn reset(current: &HttpData) -> HttpBuffer {
        let body = if current.body.is_null() {
            String::new()
        } else {
            serde_json::to_string_pretty(&current.body).unwrap_or_default()
        };
        HttpBuffer {
            method: current.method,
            url: current.url.clone(),
            headers: serde_json::to_string_pretty(&current.headers)
                .unwrap_or_else(|_| "{}".into()),
            body,
        }
    }
}

fn parse_or(text: &str, fallback: Value) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(fallback)
    } else {
        serde_json::from_str(text)
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
