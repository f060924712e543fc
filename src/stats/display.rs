//! Rendering adapter between the pollers and whatever shows their output
//!
//! Pollers only ever call [`DisplaySink::set_text`]; formatting happens before
//! that call, so sinks stay free of chain knowledge.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Target for rendered text, addressed by element identifier
pub trait DisplaySink: Send + Sync + 'static {
    fn set_text(&self, target: &str, text: &str);
}

/// In-memory display: a map from element identifier to its current text
///
/// Cloning is cheap; clones share the same cells. The terminal dashboard reads
/// from it on every frame.
#[derive(Clone, Default)]
pub struct Board {
    cells: Arc<DashMap<String, String>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: &str) -> Option<String> {
        self.cells.get(target).map(|cell| cell.value().clone())
    }

    /// Text for `target`, or `fallback` if nothing was rendered there yet
    pub fn text_or(&self, target: &str, fallback: &str) -> String {
        self.get(target).unwrap_or_else(|| fallback.to_string())
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.cells
            .iter()
            .map(|cell| (cell.key().clone(), cell.value().clone()))
            .collect()
    }
}

impl DisplaySink for Board {
    fn set_text(&self, target: &str, text: &str) {
        tracing::trace!(target_id = target, text, "Updated display");
        self.cells.insert(target.to_string(), text.to_string());
    }
}
