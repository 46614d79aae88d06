//! Selection tracking and keyboard-driven deletion.

use std::collections::BTreeSet;

use crate::graph::{GraphModel, RemovalSummary};

/// Where keyboard focus currently sits, as reported by the hosting frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFocus {
    #[default]
    Canvas,
    /// Single-line text input.
    TextInput,
    /// Multi-line text area.
    TextArea,
    /// Any other editable region.
    ContentEditable,
}

impl InputFocus {
    pub fn is_text_entry(self) -> bool {
        !matches!(self, InputFocus::Canvas)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            _ => Key::Other,
        }
    }

    fn deletes(self) -> bool {
        matches!(self, Key::Delete | Key::Backspace)
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; the host handles the key normally.
    Ignored,
    /// Consumed as a delete gesture; the host should suppress its default.
    /// `None` when the selection was empty.
    Deleted(Option<RemovalSummary>),
}

/// Currently selected node and edge ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    nodes: BTreeSet<String>,
    edges: BTreeSet<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sets with the canvas' current selection.
    pub fn selection_changed<N, E>(&mut self, nodes: N, edges: E)
    where
        N: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        self.nodes = nodes.into_iter().collect();
        self.edges = edges.into_iter().collect();
    }

    pub fn selected_nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    pub fn selected_edges(&self) -> &BTreeSet<String> {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Remove the selected nodes and edges (cascading) and clear the
    /// selection. No-op on an empty selection.
    pub fn delete_selected(&mut self, model: &mut GraphModel) -> Option<RemovalSummary> {
        if self.is_empty() {
            return None;
        }
        let summary = model.remove_nodes(
            self.nodes.iter().map(String::as_str),
            self.edges.iter().map(String::as_str),
        );
        self.nodes.clear();
        self.edges.clear();
        Some(summary)
    }

    /// Delete/Backspace deletes the selection unless focus is in a text
    /// entry surface.
    pub fn handle_key(&mut self, key: Key, focus: InputFocus, model: &mut GraphModel) -> KeyOutcome {
        if focus.is_text_entry() || !key.deletes() {
            return KeyOutcome::Ignored;
        }
        KeyOutcome::Deleted(self.delete_selected(model))
    }
}
