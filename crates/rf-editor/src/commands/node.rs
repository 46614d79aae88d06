//! Node editing commands: stage, commit and reset per-node buffers.

use rf_core::variant::{NodeCommitted, NodeData, NodeEditor, StagedBuffer};
use rf_core::ValidationError;

use crate::state::EditorSession;
use crate::EditorError;

fn committed_data(node_id: &str, session: &EditorSession) -> Result<NodeData, EditorError> {
    session
        .graph()
        .node(node_id)
        .map(|n| n.data.clone())
        .ok_or_else(|| EditorError::UnknownNode(node_id.to_string()))
}

/// Open an editor for the node, or return the buffer of the one already open.
pub fn begin_edit(node_id: &str, session: &EditorSession) -> Result<StagedBuffer, EditorError> {
    if let Some(editor) = session.editors().get(node_id) {
        return Ok(editor.buffer().clone());
    }
    let editor = {
        let graph = session.graph();
        let node = graph
            .node(node_id)
            .ok_or_else(|| EditorError::UnknownNode(node_id.to_string()))?;
        NodeEditor::open(node).ok_or_else(|| EditorError::NotEditable(node_id.to_string()))?
    };
    let buffer = editor.buffer().clone();
    session.editors().insert(node_id.to_string(), editor);
    Ok(buffer)
}

/// Replace the staged buffer. Nothing is validated until [`apply_edit`].
pub fn edit_buffer(node_id: &str, buffer: StagedBuffer, session: &EditorSession) -> Result<(), EditorError> {
    let mut editors = session.editors();
    let editor = editors
        .get_mut(node_id)
        .ok_or_else(|| EditorError::NoOpenEditor(node_id.to_string()))?;
    *editor.buffer_mut() = buffer;
    Ok(())
}

/// Validate and commit the staged buffer. On a validation failure the node
/// is untouched, the error stays on the editor and the hook is not called.
pub fn apply_edit(node_id: &str, session: &EditorSession) -> Result<NodeCommitted, EditorError> {
    let current = committed_data(node_id, session)?;
    let committed = {
        let mut editors = session.editors();
        let editor = editors
            .get_mut(node_id)
            .ok_or_else(|| EditorError::NoOpenEditor(node_id.to_string()))?;
        editor.apply(&current)?
    };

    let applied = session
        .graph_mut()
        .apply_node_patch(&committed.node_id, committed.patch.clone())?;
    if !applied {
        // Removed while the commit was being validated.
        return Err(EditorError::UnknownNode(node_id.to_string()));
    }
    if let Some(hook) = &session.persist {
        hook(&committed);
    }
    Ok(committed)
}

/// Restore the buffer from committed data and clear the inline error.
pub fn reset_edit(node_id: &str, session: &EditorSession) -> Result<StagedBuffer, EditorError> {
    let current = committed_data(node_id, session)?;
    let mut editors = session.editors();
    let editor = editors
        .get_mut(node_id)
        .ok_or_else(|| EditorError::NoOpenEditor(node_id.to_string()))?;
    editor.reset(&current);
    Ok(editor.buffer().clone())
}

/// Inline error of the node's editor, if any.
pub fn edit_error(node_id: &str, session: &EditorSession) -> Option<ValidationError> {
    session.editors().get(node_id).and_then(|e| e.error().cloned())
}

pub fn end_edit(node_id: &str, session: &EditorSession) -> bool {
    session.editors().remove(node_id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::canvas;
    use rf_core::graph::{CanvasBounds, GraphModel, NodeKind};
    use rf_core::variant::{HttpBuffer, HttpMethod, NodePatch, SetBuffer};
    use rf_store::memory::MemoryRuleStore;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn session() -> EditorSession {
        let graph = GraphModel::with_seed(CanvasBounds::default(), 11);
        EditorSession::new(graph, Arc::new(MemoryRuleStore::new()))
    }

    fn set_text(text: &str) -> StagedBuffer {
        StagedBuffer::Set(SetBuffer { text: text.into() })
    }

    #[test]
    fn set_commit_updates_graph_and_calls_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let session = {
            let seen = Arc::clone(&seen);
            session().with_persist_hook(move |c| seen.lock().unwrap().push(c.clone()))
        };
        let node = canvas::add_node(NodeKind::Set, &session);

        begin_edit(&node.id, &session).unwrap();
        edit_buffer(&node.id, set_text(r#"{"a":1}"#), &session).unwrap();
        let committed = apply_edit(&node.id, &session).unwrap();

        assert_eq!(committed.patch, NodePatch::Set { values: json!({"a": 1}) });
        assert_eq!(edit_error(&node.id, &session), None);
        let data = session.graph().node(&node.id).unwrap().data.to_value();
        assert_eq!(data["values"], json!({"a": 1}));
        assert_eq!(data["label"], "Set Node");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn invalid_json_keeps_data_and_skips_hook() {
        let calls = Arc::new(Mutex::new(0));
        let session = {
            let calls = Arc::clone(&calls);
            session().with_persist_hook(move |_| *calls.lock().unwrap() += 1)
        };
        let node = canvas::add_node(NodeKind::Set, &session);
        let before = session.graph().node(&node.id).unwrap().data.clone();

        begin_edit(&node.id, &session).unwrap();
        edit_buffer(&node.id, set_text("not json"), &session).unwrap();
        assert!(matches!(
            apply_edit(&node.id, &session),
            Err(EditorError::Validation(ValidationError::InvalidJson))
        ));
        assert_eq!(edit_error(&node.id, &session), Some(ValidationError::InvalidJson));
        assert_eq!(session.graph().node(&node.id).unwrap().data, before);
        assert_eq!(*calls.lock().unwrap(), 0);

        let restored = reset_edit(&node.id, &session).unwrap();
        assert_eq!(restored, set_text("{}"));
        assert_eq!(edit_error(&node.id, &session), None);
    }

    #[test]
    fn http_url_is_trimmed_on_commit() {
        let session = session();
        let node = canvas::add_node(NodeKind::Http, &session);
        begin_edit(&node.id, &session).unwrap();

        let buffer = |url: &str| {
            StagedBuffer::Http(HttpBuffer {
                method: HttpMethod::Post,
                url: url.into(),
                headers: String::new(),
                body: String::new(),
            })
        };
        edit_buffer(&node.id, buffer("ftp://x.com"), &session).unwrap();
        assert!(apply_edit(&node.id, &session).is_err());
        assert_eq!(session.graph().node(&node.id).unwrap().data.to_value()["url"], "");

        edit_buffer(&node.id, buffer(" https://api.example.com/e "), &session).unwrap();
        apply_edit(&node.id, &session).unwrap();
        let data = session.graph().node(&node.id).unwrap().data.to_value();
        assert_eq!(data["url"], "https://api.example.com/e");
        assert_eq!(data["method"], "POST");
    }

    #[test]
    fn default_nodes_are_not_editable() {
        let session = session();
        let node = canvas::add_node(NodeKind::Default, &session);
        assert!(matches!(begin_edit(&node.id, &session), Err(EditorError::NotEditable(_))));
        assert!(matches!(begin_edit("ghost", &session), Err(EditorError::UnknownNode(_))));
    }

    #[test]
    fn reopening_keeps_staged_buffer() {
        let session = session();
        let node = canvas::add_node(NodeKind::Set, &session);
        begin_edit(&node.id, &session).unwrap();
        edit_buffer(&node.id, set_text("{\"draft\":true}"), &session).unwrap();
        assert_eq!(begin_edit(&node.id, &session).unwrap(), set_text("{\"draft\":true}"));
        assert!(end_edit(&node.id, &session));
        assert_eq!(begin_edit(&node.id, &session).unwrap(), set_text("{}"));
    }
}
