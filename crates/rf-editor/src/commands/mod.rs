//! Editor command handlers.

pub mod canvas;
pub mod list;
pub mod node;
pub mod rule;
