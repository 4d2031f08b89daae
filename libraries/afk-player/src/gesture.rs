//! One-time gesture overlay
//!
//! Browsers only start audio from a call caused by a user input event. The
//! overlay collects that first click (or Enter/Space) once per browser
//! profile; afterwards the flag in the store keeps it out of the way.

use crate::persistence::PersistenceStore;
use crate::platform::PageControls;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// User input on the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateInput {
    Click,

    /// `KeyboardEvent.key`
    Key(String),
}

impl GateInput {
    /// Click, Enter and Space count as activation; other keys don't
    pub fn activates(&self) -> bool {
        match self {
            GateInput::Click => true,
            GateInput::Key(key) => matches!(key.as_str(), "Enter" | " " | "Spacebar"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GestureGate {
    state: GateState,
}

impl GestureGate {
    /// Start `Unlocked` if this profile already passed the overlay
    pub fn from_store(store: &PersistenceStore) -> Self {
        let state = if store.gesture_unlocked() {
            GateState::Unlocked
        } else {
            GateState::Locked
        };
        Self { state }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Handle overlay input
    ///
    /// Returns `true` exactly once, on the activating input that unlocks the
    /// gate. By then the overlay is hidden and the flag persisted; the caller
    /// must start playback from the same input event.
    pub fn activate(
        &mut self,
        input: &GateInput,
        store: &PersistenceStore,
        controls: &mut dyn PageControls,
    ) -> bool {
        if self.is_unlocked() || !input.activates() {
            return false;
        }

        controls.hide_overlay();
        store.mark_unlocked();
        self.state = GateState::Unlocked;
        info!("Gesture overlay unlocked");
        true
    }
}
