//! Rule graph: the authoritative in-memory `{nodes, edges}` model of one rule.
//!
//! All operations are synchronous and free of I/O. The wire shape of nodes
//! and edges matches what the canvas and the rule store exchange:
//! `{id, type, position: {x, y}, data}` and `{id, source, target, type?}`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::variant::{NodeData, NodePatch};
use crate::GraphError;

// ---------------------------------------------------------------------------
// Node kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Set,
    Http,
    Function,
    #[default]
    Default,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Set => "set",
            NodeKind::Http => "http",
            NodeKind::Function => "function",
            NodeKind::Default => "default",
        }
    }

    /// Display label given to freshly added nodes, e.g. "Set Node".
    pub fn default_label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Node", first.to_ascii_uppercase(), chars.as_str()),
            None => "Node".into(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(NodeKind::Set),
            "http" => Ok(NodeKind::Http),
            "function" => Ok(NodeKind::Function),
            "default" => Ok(NodeKind::Default),
            other => Err(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Position / canvas bounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Area in which nodes without a position are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

impl CanvasBounds {
    /// Non-finite or negative dimensions are replaced by the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let usable = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        Self {
            width: usable(self.width, defaults.width),
            height: usable(self.height, defaults.height),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[derive(Serialize, Deserialize)]
struct WireNode {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    position: Position,
    data: Value,
}

impl From<Node> for WireNode {
    fn from(node: Node) -> Self {
        WireNode {
            kind: node.kind(),
            data: node.data.to_value(),
            id: node.id,
            position: node.position,
        }
    }
}

impl TryFrom<WireNode> for Node {
    type Error = GraphError;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        let data = NodeData::from_value(wire.kind, wire.data).map_err(|message| {
            GraphError::InvalidNodeData {
                node_id: wire.id.clone(),
                kind: wire.kind,
                message,
            }
        })?;
        Ok(Node {
            id: wire.id,
            position: wire.position,
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Canvas edge style; opaque to the editor.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Definition: the unit of persistence and execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Counts of what a removal actually deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub nodes: usize,
    pub edges: usize,
}

// ---------------------------------------------------------------------------
// GraphModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    bounds: CanvasBounds,
    /// Every node id ever issued or loaded; ids are never reused.
    seen_ids: HashSet<String>,
    rng: StdRng,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new(CanvasBounds::default())
    }
}

impl GraphModel {
    pub fn new(bounds: CanvasBounds) -> Self {
        Self::with_rng(bounds, StdRng::from_entropy())
    }

    /// Model with a reproducible position generator.
    pub fn with_seed(bounds: CanvasBounds, seed: u64) -> Self {
        Self::with_rng(bounds, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bounds: CanvasBounds, rng: StdRng) -> Self {
        let usable = bounds.sanitized();
        if usable != bounds {
            tracing::warn!(?bounds, ?usable, "unusable canvas bounds replaced");
        }
        let bounds = usable;
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            bounds,
            seen_ids: HashSet::new(),
            rng,
        }
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Drop all nodes and edges. Issued ids stay reserved.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Add a node of `kind` with a fresh id, a random in-bounds position and
    /// the kind's default data.
    pub fn add_node(&mut self, kind: NodeKind) -> &Node {
        let id = self.fresh_id();
        let position = self.random_position();
        self.nodes.push(Node {
            id,
            position,
            data: NodeData::default_for(kind),
        });
        let node = &self.nodes[self.nodes.len() - 1];
        tracing::debug!(node_id = %node.id, %kind, "node added");
        node
    }

    /// Merge `patch` into the committed data of node `id`. Unknown ids are a
    /// no-op and return `Ok(false)`.
    pub fn apply_node_patch(&mut self, id: &str, patch: NodePatch) -> Result<bool, GraphError> {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            tracing::debug!(node_id = id, "patch for unknown node ignored");
            return Ok(false);
        };
        let kind = node.kind();
        node.data
            .merge(patch)
            .map_err(|patch| GraphError::VariantMismatch {
                node_id: id.to_string(),
                kind,
                patch,
            })?;
        Ok(true)
    }

    /// Move node `id`; returns false for unknown ids.
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove the given nodes and edges, then every remaining edge touching a
    /// removed node id.
    pub fn remove_nodes<'a, N, E>(&mut self, node_ids: N, edge_ids: E) -> RemovalSummary
    where
        N: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = &'a str>,
    {
        let node_ids: HashSet<&str> = node_ids.into_iter().collect();
        let edge_ids: HashSet<&str> = edge_ids.into_iter().collect();

        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();

        self.nodes.retain(|n| !node_ids.contains(n.id.as_str()));
        self.edges.retain(|e| {
            !edge_ids.contains(e.id.as_str())
                && !node_ids.contains(e.source.as_str())
                && !node_ids.contains(e.target.as_str())
        });

        let summary = RemovalSummary {
            nodes: nodes_before - self.nodes.len(),
            edges: edges_before - self.edges.len(),
        };
        tracing::debug!(nodes = summary.nodes, edges = summary.edges, "removed from graph");
        summary
    }

    /// Append an edge from `source` to `target`. Without an explicit id the
    /// edge is named `source-target`, suffixed `-1`, `-2`, … while that name
    /// is taken. Parallel edges are allowed; an explicit id already used by
    /// another edge is rejected.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        explicit_id: Option<String>,
    ) -> Result<&Edge, GraphError> {
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(GraphError::UnknownEndpoint(endpoint.to_string()));
            }
        }
        let id = match explicit_id {
            Some(id) if self.edge(&id).is_some() => return Err(GraphError::DuplicateEdge(id)),
            Some(id) => id,
            None => self.edge_id_for(source, target),
        };
        self.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            kind: None,
        });
        let edge = &self.edges[self.edges.len() - 1];
        tracing::debug!(edge_id = %edge.id, source, target, "edge connected");
        Ok(edge)
    }

    /// Replace the graph with a normalized copy of an externally supplied
    /// definition. Normalizing already-normalized input changes nothing.
    ///
    /// - node ids are coerced to strings; missing `type` becomes `default`
    /// - a missing position gets a random point within the canvas bounds
    /// - missing `data` becomes `{label: <type>}`, then variant defaults apply
    /// - edge ids default to `source-target`; endpoints are coerced to strings
    /// - edges whose endpoints are not in the definition are dropped
    ///
    /// On error the model is left unchanged.
    pub fn load(&mut self, raw: &Value) -> Result<(), GraphError> {
        let (raw_nodes, raw_edges) = match raw {
            Value::Null => (Vec::new(), Vec::new()),
            Value::Object(obj) => (array_field(obj, "nodes")?, array_field(obj, "edges")?),
            _ => return Err(GraphError::Malformed("definition must be an object".into())),
        };

        let mut nodes = Vec::with_capacity(raw_nodes.len());
        let mut ids = HashSet::new();
        for raw_node in raw_nodes {
            let node = self.normalize_node(raw_node)?;
            if !ids.insert(node.id.clone()) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        for raw_edge in raw_edges {
            let edge = normalize_edge(raw_edge)?;
            if !ids.contains(&edge.source) || !ids.contains(&edge.target) {
                tracing::warn!(edge_id = %edge.id, "dropping edge with a missing endpoint");
                continue;
            }
            edges.push(edge);
        }

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "definition loaded");
        self.seen_ids.extend(ids);
        self.nodes = nodes;
        self.edges = edges;
        Ok(())
    }

    /// Transport-ready deep copy of the graph.
    pub fn serialize(&self) -> Definition {
        Definition {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    fn normalize_node(&mut self, raw: &Value) -> Result<Node, GraphError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| GraphError::Malformed("node must be an object".into()))?;
        let id = obj
            .get("id")
            .and_then(coerce_id)
            .ok_or_else(|| GraphError::Malformed("node without an id".into()))?;

        let kind = match obj.get("type") {
            None | Some(Value::Null) => NodeKind::Default,
            Some(Value::String(s)) => s.parse().map_err(|kind| GraphError::UnknownNodeType {
                node_id: id.clone(),
                kind,
            })?,
            Some(other) => {
                return Err(GraphError::UnknownNodeType {
                    node_id: id,
                    kind: other.to_string(),
                })
            }
        };

        let position = match obj.get("position").and_then(parse_position) {
            Some(position) => position,
            None => self.random_position(),
        };

        let data = match obj.get("data") {
            None | Some(Value::Null) => {
                let mut fields = Map::new();
                fields.insert("label".into(), Value::String(kind.as_str().into()));
                Value::Object(fields)
            }
            Some(data) => data.clone(),
        };
        let data = NodeData::from_value(kind, data).map_err(|message| {
            GraphError::InvalidNodeData {
                node_id: id.clone(),
                kind,
                message,
            }
        })?;

        Ok(Node { id, position, data })
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.seen_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn edge_id_for(&self, source: &str, target: &str) -> String {
        let base = format!("{source}-{target}");
        if self.edge(&base).is_none() {
            return base;
        }
        (1..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| self.edge(candidate).is_none())
            .unwrap_or(base)
    }

    fn random_position(&mut self) -> Position {
        Position {
            x: self.rng.gen_range(0.0..=self.bounds.width.max(0.0)),
            y: self.rng.gen_range(0.0..=self.bounds.height.max(0.0)),
        }
    }
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Vec<&'a Value>, GraphError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().collect()),
        Some(_) => Err(GraphError::Malformed(format!("`{key}` must be an array"))),
    }
}

fn normalize_edge(raw: &Value) -> Result<Edge, GraphError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| GraphError::Malformed("edge must be an object".into()))?;
    let endpoint = |key: &str| {
        obj.get(key)
            .and_then(coerce_id)
            .ok_or_else(|| GraphError::Malformed(format!("edge without `{key}`")))
    };
    let source = endpoint("source")?;
    let target = endpoint("target")?;
    let id = match obj.get("id").and_then(coerce_id) {
        Some(id) if !id.is_empty() => id,
        _ => format!("{source}-{target}"),
    };
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(Edge {
        id,
        source,
        target,
        kind,
    })
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_position(value: &Value) -> Option<Position> {
    Some(Position {
        x: value.get("x")?.as_f64()?,
        y: value.get("y")?.as_f64()?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{HttpMethod, SetData};
    use serde_json::json;

    const NONE: [&str; 0] = [];

    fn model() -> GraphModel {
        GraphModel::with_seed(CanvasBounds::default(), 7)
    }

    /// a -> b -> c, a -> c
    fn triangle() -> GraphModel {
        let mut m = model();
        m.load(&json!({
            "nodes": [
                {"id": "a", "type": "set", "position": {"x": 0, "y": 0}, "data": {"values": {}}},
                {"id": "b", "type": "function", "position": {"x": 1, "y": 1}, "data": {"expr": "1"}},
                {"id": "c", "type": "default", "position": {"x": 2, "y": 2}, "data": {"label": "c"}}
            ],
            "edges": [
                {"id": "ab", "source": "a", "target": "b"},
                {"id": "bc", "source": "b", "target": "c"},
                {"id": "ac", "source": "a", "target": "c"}
            ]
        }))
        .unwrap();
        m
    }

    #[test]
    fn add_node_issues_unique_ids_and_default_data() {
        let mut m = model();
        let mut ids = HashSet::new();
        for kind in [NodeKind::Set, NodeKind::Http, NodeKind::Function, NodeKind::Set] {
            let node = m.add_node(kind).clone();
            assert!(ids.insert(node.id.clone()), "duplicate id {}", node.id);
            assert_eq!(node.data, NodeData::default_for(kind));
            assert!(m.bounds().contains(node.position));
        }
        assert_eq!(m.nodes().len(), 4);
    }

    #[test]
    fn removed_ids_are_never_reissued() {
        let mut m = model();
        let first = m.add_node(NodeKind::Set).id.clone();
        m.remove_nodes([first.as_str()], NONE);
        for _ in 0..32 {
            assert_ne!(m.add_node(NodeKind::Set).id, first);
        }
    }

    #[test]
    fn removing_a_node_cascades_to_its_edges_only() {
        let mut m = triangle();
        let summary = m.remove_nodes(["b"], NONE);
        assert_eq!(summary, RemovalSummary { nodes: 1, edges: 2 });
        let ids: Vec<_> = m.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        let edges: Vec<_> = m.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edges, ["ac"]);
    }

    #[test]
    fn removal_order_does_not_matter() {
        let mut one = triangle();
        one.remove_nodes(["a", "c"], ["bc"]);
        let mut two = triangle();
        two.remove_nodes(["c", "a"], ["bc"]);
        assert_eq!(one.serialize(), two.serialize());
        assert_eq!(one.nodes().len(), 1);
        assert!(one.edges().is_empty());
    }

    #[test]
    fn removing_unknown_ids_is_harmless() {
        let mut m = triangle();
        let summary = m.remove_nodes(["zz"], ["yy"]);
        assert_eq!(summary, RemovalSummary::default());
        assert_eq!(m.edges().len(), 3);
    }

    #[test]
    fn connect_synthesizes_ids_and_keeps_duplicates() {
        let mut m = triangle();
        m.remove_nodes(NONE, ["ab"]);
        assert_eq!(m.connect("a", "b", None).unwrap().id, "a-b");
        assert_eq!(m.connect("a", "b", None).unwrap().id, "a-b-1");
        assert_eq!(m.connect("a", "b", Some("custom".into())).unwrap().id, "custom");
        let parallel = m
            .edges()
            .iter()
            .filter(|e| e.source == "a" && e.target == "b")
            .count();
        assert_eq!(parallel, 3);
    }

    #[test]
    fn connect_rejects_taken_explicit_ids() {
        let mut m = triangle();
        m.connect("a", "b", Some("custom".into())).unwrap();
        assert_eq!(
            m.connect("b", "c", Some("custom".into())).unwrap_err(),
            GraphError::DuplicateEdge("custom".into())
        );
        let summary = m.remove_nodes(NONE, ["custom"]);
        assert_eq!(summary, RemovalSummary { nodes: 0, edges: 1 });
    }

    #[test]
    fn unusable_bounds_fall_back_to_defaults() {
        let bounds = CanvasBounds {
            width: f64::INFINITY,
            height: -5.0,
        };
        let mut m = GraphModel::with_seed(bounds, 1);
        assert_eq!(m.bounds(), CanvasBounds::default());
        let node = m.add_node(NodeKind::Set).clone();
        assert!(m.bounds().contains(node.position));
    }

    #[test]
    fn connect_requires_existing_endpoints() {
        let mut m = triangle();
        assert_eq!(
            m.connect("a", "nope", None).unwrap_err(),
            GraphError::UnknownEndpoint("nope".into())
        );
    }

    #[test]
    fn patch_merges_into_matching_variant() {
        let mut m = triangle();
        assert!(m
            .apply_node_patch("a", NodePatch::Set { values: json!({"x": 1}) })
            .unwrap());
        match &m.node("a").unwrap().data {
            NodeData::Set(SetData { values, .. }) => assert_eq!(values, &json!({"x": 1})),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!m
            .apply_node_patch("missing", NodePatch::Set { values: json!({}) })
            .unwrap());
        assert!(matches!(
            m.apply_node_patch("a", NodePatch::Function { expr: "1".into() }),
            Err(GraphError::VariantMismatch { .. })
        ));
    }

    #[test]
    fn load_normalizes_loose_input() {
        let mut m = model();
        m.load(&json!({
            "nodes": [
                {"id": 1, "type": "http", "data": {"method": "POST", "url": "https://x"}},
                {"id": "2"}
            ],
            "edges": [{"source": 1, "target": "2", "type": ""}]
        }))
        .unwrap();

        let first = m.node("1").unwrap();
        assert!(m.bounds().contains(first.position));
        match &first.data {
            NodeData::Http(d) => assert_eq!(d.method, HttpMethod::Post),
            other => panic!("unexpected {other:?}"),
        }
        let second = m.node("2").unwrap();
        assert_eq!(second.kind(), NodeKind::Default);
        assert_eq!(second.data.label(), Some("default"));

        let edge = &m.edges()[0];
        assert_eq!(edge.id, "1-2");
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "2"));
        assert_eq!(edge.kind, None);
    }

    #[test]
    fn load_is_idempotent() {
        let mut m = model();
        let raw = json!({
            "nodes": [
                {"id": 10, "type": "set", "data": {"values": {}, "note": "keep me"}},
                {"id": "f", "type": "function", "position": {"x": 5, "y": 6}, "data": {"expr": "x"}},
                {"id": "h", "type": "http", "data": {"url": "https://a", "headers": null, "timeout": 5}}
            ],
            "edges": [{"source": 10, "target": "f", "type": "smoothstep"}, {"id": 7, "source": "f", "target": "h"}]
        });
        m.load(&raw).unwrap();
        let first = m.serialize();

        let mut again = model();
        again.load(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(again.serialize(), first);

        let wire = serde_json::to_value(&first).unwrap();
        assert_eq!(wire["nodes"][0]["data"]["note"], "keep me");
        assert_eq!(wire["nodes"][2]["data"]["timeout"], 5);
    }

    #[test]
    fn commits_keep_unmodelled_data_fields() {
        let mut m = model();
        m.load(&json!({
            "nodes": [{"id": "s", "type": "set", "data": {"values": {}, "note": "keep me"}}]
        }))
        .unwrap();
        let patch = NodePatch::Set { values: json!({"a": 1}) };
        assert!(m.apply_node_patch("s", patch).unwrap());

        let data = m.node("s").unwrap().data.to_value();
        assert_eq!(data["values"], json!({"a": 1}));
        assert_eq!(data["note"], "keep me");
    }

    #[test]
    fn load_drops_dangling_edges() {
        let mut m = model();
        m.load(&json!({
            "nodes": [{"id": "a"}],
            "edges": [{"source": "a", "target": "ghost"}]
        }))
        .unwrap();
        assert!(m.edges().is_empty());
    }

    #[test]
    fn load_rejects_unusable_input_without_mutating() {
        let mut m = triangle();
        let before = m.serialize();
        for bad in [
            json!({"nodes": [{"id": "x", "type": "webhook"}]}),
            json!({"nodes": [{"type": "set"}]}),
            json!({"nodes": [{"id": "x"}, {"id": "x"}]}),
            json!({"nodes": [{"id": "x", "type": "http", "data": {"method": "FETCH"}}]}),
            json!({"nodes": {}}),
            json!([1, 2]),
        ] {
            assert!(m.load(&bad).is_err(), "accepted {bad}");
        }
        assert_eq!(m.serialize(), before);
    }

    #[test]
    fn null_or_empty_definition_loads_empty() {
        let mut m = triangle();
        m.load(&Value::Null).unwrap();
        assert!(m.is_empty());
        m.load(&json!({})).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn node_wire_shape() {
        let mut m = model();
        let id = m.add_node(NodeKind::Function).id.clone();
        let value = serde_json::to_value(m.node(&id).unwrap()).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["data"], json!({"label": "Function Node", "expr": "''"}));
        assert!(value["position"]["x"].is_f64());

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(&back, m.node(&id).unwrap());
    }

    #[test]
    fn default_labels() {
        assert_eq!(NodeKind::Http.default_label(), "Http Node");
        assert_eq!(NodeKind::Default.default_label(), "Default Node");
    }
}
