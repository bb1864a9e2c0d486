//! Session mode and the history record sink.
//!
//! One enum replaces the scattered suppression flags an editor tends to
//! grow: continuous gestures and bulk document loads both mute history
//! recording, and every mutation path checks the same mode.

use crate::model::NodeId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Idle,
    /// A continuous shape-construction gesture is in flight.
    Dragging,
    /// A stored document is being reconstructed wholesale.
    BulkLoading,
}

/// One recordable state change, as the history stack sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRecord {
    pub node: Option<NodeId>,
    pub label: String,
}

/// Editing-session state shared by all controllers.
#[derive(Clone, Debug, Default)]
pub struct Session {
    mode: SessionMode,
    history: Vec<HistoryRecord>,
}

impl Session {
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        if mode != self.mode {
            tracing::debug!(?mode, "session mode change");
        }
        self.mode = mode;
    }

    pub fn is_suppressed(&self) -> bool {
        self.mode != SessionMode::Idle
    }

    /// Record a history entry unless the current mode suppresses it.
    pub fn record(&mut self, node: Option<NodeId>, label: impl Into<String>) {
        if self.is_suppressed() {
            return;
        }
        self.history.push(HistoryRecord {
            node,
            label: label.into(),
        });
    }

    /// Record regardless of mode. Used for the single synthetic modified
    /// event a finished gesture fires.
    pub fn record_forced(&mut self, node: Option<NodeId>, label: impl Into<String>) {
        self.history.push(HistoryRecord {
            node,
            label: label.into(),
        });
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }
}
