//! Playback Events
//!
//! The controller queues events at key points so the page (or a test) can
//! follow along without polling:
//! - State changes
//! - Track changes (when a track actually starts)
//! - Failed attempts and an exhausted fallback chain
//! - Restored resume position

use crate::machine::PlayerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A track started playing
    TrackChanged {
        /// Playlist index of the new track
        index: usize,
        /// Source identifier of the new track
        track_id: String,
    },

    /// Track reached its natural end
    TrackFinished {
        /// Playlist index of the finished track
        index: usize,
    },

    /// One attempt in a request or fallback chain failed
    AttemptFailed {
        track_id: String,
        reason: String,
    },

    /// Playlist and default asset all failed
    FallbackExhausted {
        /// Total attempts made, default asset included
        attempts: u32,
    },

    /// A persisted position was applied after resume
    PositionRestored {
        position_secs: f64,
    },
}

impl PlaybackEvent {
    /// Short label for the page's `data-player-state` attribute
    pub fn state_label(state: PlayerState) -> &'static str {
        match state {
            PlayerState::Idle => "idle",
            PlayerState::Attempting { .. } => "loading",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Failed { .. } => "failed",
        }
    }
}
