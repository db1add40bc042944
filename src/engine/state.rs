//! Run-scoped idempotency markers.

use std::collections::HashSet;

/// Tracks which resources each stage has already processed in one run.
///
/// Keyed by qualified resource name. The state lives exactly as long as
/// the engine that owns it; nothing persists across invocations, so a
/// resource deleted in one run is fair game for the next.
#[derive(Debug, Default)]
pub struct RunState {
    prepared: HashSet<String>,
    applied: HashSet<String>,
    deleted: HashSet<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` prepared. Returns false when it already was.
    pub fn mark_prepared(&mut self, name: &str) -> bool {
        self.prepared.insert(name.to_string())
    }

    pub fn is_prepared(&self, name: &str) -> bool {
        self.prepared.contains(name)
    }

    /// Mark `name` applied. Returns false when it already was.
    pub fn mark_applied(&mut self, name: &str) -> bool {
        self.applied.insert(name.to_string())
    }

    pub fn is_applied(&self, name: &str) -> bool {
        self.applied.contains(name)
    }

    /// Mark `name` deleted. Returns false when it already was.
    pub fn mark_deleted(&mut self, name: &str) -> bool {
        self.deleted.insert(name.to_string())
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted.contains(name)
    }
}
