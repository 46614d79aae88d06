//! Node variants: typed payloads, staged edit buffers, and commit logic.
//!
//! Each editable node type (set, http, function) implements [`NodeVariant`]:
//! `apply` validates a staged buffer against the committed data and returns
//! the new committed data, `reset` renders the committed data back into a
//! buffer. [`NodeVariantRegistry`] dispatches over the closed [`NodeData`]
//! union with an exhaustive match.

pub mod function;
pub mod http;
pub mod set;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::graph::{Node, NodeKind};
use crate::ValidationError;

pub use function::{FunctionBuffer, FunctionData, FunctionVariant};
pub use http::{HttpBuffer, HttpData, HttpMethod, HttpVariant};
pub use set::{SetBuffer, SetData, SetVariant};

// ---------------------------------------------------------------------------
// Variant contract
// ---------------------------------------------------------------------------

/// Validator/committer for one node type.
pub trait NodeVariant {
    /// Committed payload stored on the node.
    type Data;
    /// Staged, possibly invalid, edit buffer.
    type Buffer;

    /// Validate `buffer` and produce the data to commit. `current` is left
    /// untouched on failure.
    fn apply(buffer: &Self::Buffer, current: &Self::Data) -> Result<Self::Data, ValidationError>;

    /// Render committed data into a fresh buffer.
    fn reset(current: &Self::Data) -> Self::Buffer;
}

// ---------------------------------------------------------------------------
// NodeData: closed tagged union of payloads
// ---------------------------------------------------------------------------

/// Committed payload of a node, tagged by node type.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Set(SetData),
    Http(HttpData),
    Function(FunctionData),
    Default(DefaultData),
}

/// Free-form payload of a `default` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultData(pub Map<String, Value>);

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Set(_) => NodeKind::Set,
            NodeData::Http(_) => NodeKind::Http,
            NodeData::Function(_) => NodeKind::Function,
            NodeData::Default(_) => NodeKind::Default,
        }
    }

    /// Data a freshly added node of `kind` starts with.
    pub fn default_for(kind: NodeKind) -> Self {
        let label = Some(kind.default_label());
        match kind {
            NodeKind::Set => NodeData::Set(SetData {
                label,
                ..Default::default()
            }),
            NodeKind::Http => NodeData::Http(HttpData {
                label,
                ..Default::default()
            }),
            NodeKind::Function => NodeData::Function(FunctionData {
                label,
                ..Default::default()
            }),
            NodeKind::Default => {
                let mut fields = Map::new();
                fields.insert("label".into(), Value::String(kind.default_label()));
                NodeData::Default(DefaultData(fields))
            }
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            NodeData::Set(d) => d.label.as_deref(),
            NodeData::Http(d) => d.label.as_deref(),
            NodeData::Function(d) => d.label.as_deref(),
            NodeData::Default(d) => d.0.get("label").and_then(Value::as_str),
        }
    }

    /// Decode a wire `data` object for a node of `kind`. Missing fields are
    /// filled from the variant defaults; fields of the wrong shape are
    /// rejected.
    pub fn from_value(kind: NodeKind, value: Value) -> Result<Self, String> {
        let data = match kind {
            NodeKind::Set => NodeData::Set(decode(value)?),
            NodeKind::Http => NodeData::Http(decode(value)?),
            NodeKind::Function => NodeData::Function(decode(value)?),
            NodeKind::Default => NodeData::Default(decode(value)?),
        };
        if let NodeData::Set(set) = &data {
            if !set.values.is_null() && !set.values.is_object() {
                return Err("`values` must be an object or null".into());
            }
        }
        Ok(data)
    }

    /// Encode to the wire `data` object.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            NodeData::Set(d) => serde_json::to_value(d),
            NodeData::Http(d) => serde_json::to_value(d),
            NodeData::Function(d) => serde_json::to_value(d),
            NodeData::Default(d) => serde_json::to_value(d),
        };
        // Payloads are plain maps and strings; encoding cannot fail.
        encoded.unwrap_or(Value::Null)
    }

    /// The variant fields as a patch (labels excluded). `None` for default
    /// nodes, which have nothing to commit.
    pub fn patch(&self) -> Option<NodePatch> {
        match self {
            NodeData::Set(d) => Some(NodePatch::Set {
                values: d.values.clone(),
            }),
            NodeData::Http(d) => Some(NodePatch::Http {
                method: d.method,
                url: d.url.clone(),
                headers: d.headers.clone(),
                body: d.body.clone(),
            }),
            NodeData::Function(d) => Some(NodePatch::Function {
                expr: d.expr.clone(),
            }),
            NodeData::Default(_) => None,
        }
    }

    /// Merge a patch of the same variant into this payload. Returns the
    /// patch kind on mismatch and leaves `self` unchanged.
    pub fn merge(&mut self, patch: NodePatch) -> Result<(), NodeKind> {
        match (self, patch) {
            (NodeData::Set(d), NodePatch::Set { values }) => {
                d.values = values;
                Ok(())
            }
            (
                NodeData::Http(d),
                NodePatch::Http {
                    method,
                    url,
                    headers,
                    body,
                },
            ) => {
                d.method = method;
                d.url = url;
                d.headers = headers;
                d.body = body;
                Ok(())
            }
            (NodeData::Function(d), NodePatch::Function { expr }) => {
                d.expr = expr;
                Ok(())
            }
            (_, patch) => Err(patch.kind()),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Patches and commit events
// ---------------------------------------------------------------------------

/// The variant fields written by a successful commit. Serializes to the
/// bare field object, e.g. `{"values": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodePatch {
    Set {
        values: Value,
    },
    Http {
        method: HttpMethod,
        url: String,
        headers: Map<String, Value>,
        body: Value,
    },
    Function {
        expr: String,
    },
}

impl NodePatch {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePatch::Set { .. } => NodeKind::Set,
            NodePatch::Http { .. } => NodeKind::Http,
            NodePatch::Function { .. } => NodeKind::Function,
        }
    }
}

/// Emitted by a successful commit. The owning session applies the patch to
/// the graph model and may forward it to a persistence hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCommitted {
    pub node_id: String,
    pub patch: NodePatch,
}

// ---------------------------------------------------------------------------
// Staged buffers
// ---------------------------------------------------------------------------

/// The editing-surface state of one node, tagged by variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedBuffer {
    Set(SetBuffer),
    Http(HttpBuffer),
    Function(FunctionBuffer),
}

impl StagedBuffer {
    pub fn kind(&self) -> NodeKind {
        match self {
            StagedBuffer::Set(_) => NodeKind::Set,
            StagedBuffer::Http(_) => NodeKind::Http,
            StagedBuffer::Function(_) => NodeKind::Function,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Dispatches apply/reset to the variant matching a node's data.
pub struct NodeVariantRegistry;

impl NodeVariantRegistry {
    /// Validate `buffer` against `current` and return the data to commit.
    pub fn apply(buffer: &StagedBuffer, current: &NodeData) -> Result<NodeData, ValidationError> {
        match (buffer, current) {
            (StagedBuffer::Set(b), NodeData::Set(d)) => SetVariant::apply(b, d).map(NodeData::Set),
            (StagedBuffer::Http(b), NodeData::Http(d)) => {
                HttpVariant::apply(b, d).map(NodeData::Http)
            }
            (StagedBuffer::Function(b), NodeData::Function(d)) => {
                FunctionVariant::apply(b, d).map(NodeData::Function)
            }
            (buffer, current) => Err(ValidationError::WrongVariant {
                kind: current.kind(),
                buffer: buffer.kind(),
            }),
        }
    }

    /// Buffer for the committed data; `None` for non-editable default nodes.
    pub fn reset(current: &NodeData) -> Option<StagedBuffer> {
        match current {
            NodeData::Set(d) => Some(StagedBuffer::Set(SetVariant::reset(d))),
            NodeData::Http(d) => Some(StagedBuffer::Http(HttpVariant::reset(d))),
            NodeData::Function(d) => Some(StagedBuffer::Function(FunctionVariant::reset(d))),
            NodeData::Default(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeEditor: staged buffer plus inline error for one node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NodeEditor {
    node_id: String,
    buffer: StagedBuffer,
    error: Option<ValidationError>,
}

impl NodeEditor {
    /// Open an editor seeded from the node's committed data.
    pub fn open(node: &Node) -> Option<Self> {
        NodeVariantRegistry::reset(&node.data).map(|buffer| Self {
            node_id: node.id.clone(),
            buffer,
            error: None,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn buffer(&self) -> &StagedBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut StagedBuffer {
        &mut self.buffer
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Validate the buffer. On success the error is cleared and the commit
    /// event is returned; on failure the error is kept for inline display.
    pub fn apply(&mut self, current: &NodeData) -> Result<NodeCommitted, ValidationError> {
        let committed = match NodeVariantRegistry::apply(&self.buffer, current) {
            Ok(committed) => committed,
            Err(err) => {
                tracing::warn!(node_id = %self.node_id, "apply rejected: {err}");
                self.error = Some(err.clone());
                return Err(err);
            }
        };
        self.error = None;
        let patch = committed.patch().ok_or(ValidationError::WrongVariant {
            kind: current.kind(),
            buffer: self.buffer.kind(),
        })?;
        tracing::debug!(node_id = %self.node_id, kind = %current.kind(), "node committed");
        Ok(NodeCommitted {
            node_id: self.node_id.clone(),
            patch,
        })
    }

    /// Restore the buffer to the committed value and clear the error.
    pub fn reset(&mut self, current: &NodeData) {
        if let Some(buffer) = NodeVariantRegistry::reset(current) {
            self.buffer = buffer;
        }
        self.error = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
