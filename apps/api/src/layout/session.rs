//! Layout lifecycle.
//!
//! ```text
//! Uninitialized ──load──▶ Built | Reconciled ──drag_end──▶ Dirty ──saved──▶ Persisted
//!                                                  ▲         │  ▲               │
//!                                                  │         └──┘ (drag_end)    │
//!                                                  └─────────── load ◀──────────┘
//! ```
//!
//! A failed save leaves the session `Dirty`; the next drag-end supersedes it.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::types::Layout;
use crate::layout::LayoutOrigin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutState {
    Uninitialized,
    Built,
    Reconciled,
    Dirty,
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the layout is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: LayoutState,
    },
}

#[derive(Debug, Clone)]
pub struct LayoutSession {
    state: LayoutState,
    layout: Layout,
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutSession {
    pub fn new() -> Self {
        Self {
            state: LayoutState::Uninitialized,
            layout: Layout::new(),
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Installs a freshly computed canonical layout.
    pub fn load(&mut self, layout: Layout, origin: LayoutOrigin) -> Result<(), SessionError> {
        match self.state {
            LayoutState::Uninitialized | LayoutState::Persisted => {
                self.state = match origin {
                    LayoutOrigin::Built => LayoutState::Built,
                    LayoutOrigin::Reconciled => LayoutState::Reconciled,
                };
                self.layout = layout;
                debug!(state = ?self.state, cards = self.layout.len(), "layout loaded");
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                action: "load",
                state,
            }),
        }
    }

    /// Replaces the working layout with the one produced by a drag-end event.
    pub fn drag_end(&mut self, layout: Layout) -> Result<(), SessionError> {
        if self.state == LayoutState::Uninitialized {
            return Err(SessionError::InvalidTransition {
                action: "apply a drag-end",
                state: self.state,
            });
        }
        self.layout = layout;
        self.state = LayoutState::Dirty;
        Ok(())
    }

    pub fn mark_persisted(&mut self) -> Result<(), SessionError> {
        if self.state != LayoutState::Dirty {
            return Err(SessionError::InvalidTransition {
                action: "mark persisted",
                state: self.state,
            });
        }
        self.state = LayoutState::Persisted;
        Ok(())
    }

    /// A failed save keeps the in-memory layout as the working copy.
    pub fn mark_save_failed(&mut self) {
        warn!(state = ?self.state, "layout save failed, keeping unsaved layout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Dimensions, GridCell, PlacedCard};

    fn one_card(x: u32) -> Layout {
        vec![PlacedCard::new("a", GridCell::new(x, 0), Dimensions::UNIT)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fresh_load_without_snapshot_is_built() {
        let mut session = LayoutSession::new();
        session.load(one_card(0), LayoutOrigin::Built).unwrap();
        assert_eq!(session.state(), LayoutState::Built);
    }

    #[test]
    fn test_full_cycle_back_to_reconciled() {
        let mut session = LayoutSession::new();
        session.load(one_card(0), LayoutOrigin::Reconciled).unwrap();
        session.drag_end(one_card(1)).unwrap();
        assert_eq!(session.state(), LayoutState::Dirty);
        session.mark_persisted().unwrap();
        assert_eq!(session.state(), LayoutState::Persisted);
        session.load(one_card(1), LayoutOrigin::Reconciled).unwrap();
        assert_eq!(session.state(), LayoutState::Reconciled);
    }

    #[test]
    fn test_failed_save_stays_dirty_and_next_drag_supersedes() {
        let mut session = LayoutSession::new();
        session.load(one_card(0), LayoutOrigin::Built).unwrap();
        session.drag_end(one_card(1)).unwrap();
        session.mark_save_failed();
        assert_eq!(session.state(), LayoutState::Dirty);

        session.drag_end(one_card(2)).unwrap();
        assert_eq!(session.state(), LayoutState::Dirty);
        assert_eq!(session.layout().get("a").map(|c| c.cell.x), Some(2));
    }

    #[test]
    fn test_drag_before_load_is_rejected() {
        let mut session = LayoutSession::new();
        assert_eq!(
            session.drag_end(one_card(0)),
            Err(SessionError::InvalidTransition {
                action: "apply a drag-end",
                state: LayoutState::Uninitialized
            })
        );
    }

    #[test]
    fn test_persist_requires_dirty() {
        let mut session = LayoutSession::new();
        session.load(one_card(0), LayoutOrigin::Built).unwrap();
        assert!(session.mark_persisted().is_err());
    }

    #[test]
    fn test_reload_while_dirty_is_rejected() {
        let mut session = LayoutSession::new();
        session.load(one_card(0), LayoutOrigin::Built).unwrap();
        session.drag_end(one_card(1)).unwrap();
        assert!(session.load(one_card(0), LayoutOrigin::Built).is_err());
    }
}
