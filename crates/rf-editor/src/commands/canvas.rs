//! Canvas commands: synchronous graph edits driven by the host.

use rf_core::graph::{Edge, Node, NodeKind, Position, RemovalSummary};
use rf_core::selection::{InputFocus, Key, KeyOutcome};

use crate::state::EditorSession;
use crate::EditorError;

pub fn add_node(kind: NodeKind, session: &EditorSession) -> Node {
    session.graph_mut().add_node(kind).clone()
}

/// Connect two nodes. `explicit_id` is the id the canvas assigned, if any.
pub fn connect(
    source: &str,
    target: &str,
    explicit_id: Option<String>,
    session: &EditorSession,
) -> Result<Edge, EditorError> {
    let mut graph = session.graph_mut();
    let edge = graph.connect(source, target, explicit_id)?;
    Ok(edge.clone())
}

pub fn move_node(node_id: &str, position: Position, session: &EditorSession) -> bool {
    session.graph_mut().move_node(node_id, position)
}

pub fn selection_changed(nodes: Vec<String>, edges: Vec<String>, session: &EditorSession) {
    session.selection().selection_changed(nodes, edges);
}

/// Deletes the selection on Delete/Backspace unless a text field has focus.
pub fn key_down(key: Key, focus: InputFocus, session: &EditorSession) -> KeyOutcome {
    let outcome = {
        let mut selection = session.selection();
        let mut graph = session.graph_mut();
        selection.handle_key(key, focus, &mut graph)
    };
    if let KeyOutcome::Deleted(Some(_)) = outcome {
        session.prune_editors();
    }
    outcome
}

pub fn delete_selected(session: &EditorSession) -> Option<RemovalSummary> {
    let summary = {
        let mut selection = session.selection();
        let mut graph = session.graph_mut();
        selection.delete_selected(&mut graph)
    };
    if summary.is_some() {
        session.prune_editors();
    }
    summary
}
