//! Error types for playback management

use crate::machine::{PlayerState, Trigger};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The media resource refused or failed to start a track
    ///
    /// Covers decode failures, missing assets and autoplay-policy rejections.
    #[error("Media rejected {track}: {reason}")]
    MediaRejected { track: String, reason: String },

    /// A newer attempt replaced the source before this one settled
    #[error("Playback attempt superseded")]
    Superseded,

    /// Trigger is not allowed in the current controller state
    #[error("Illegal transition: {trigger:?} while {state:?}")]
    IllegalTransition { state: PlayerState, trigger: Trigger },

    /// Every playlist entry and the default asset failed
    #[error("Fallback chain exhausted after {attempts} attempts")]
    ChainExhausted { attempts: u32 },

    /// Seek target is outside the current track (or the track has no duration yet)
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),
}

impl PlaybackError {
    /// Whether the error has already been handled by whoever superseded it
    pub fn is_superseded(&self) -> bool {
        matches!(self, PlaybackError::Superseded)
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Key/value store failures
///
/// These never leave the persistence layer: they are logged and replaced by
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Storage is disabled or missing (private mode, sandboxed frame)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Storage refused a write (quota exceeded)
    #[error("Storage write rejected: {0}")]
    WriteRejected(String),

    /// A stored value could not be parsed
    #[error("Corrupt value for {key}: {value:?}")]
    Corrupt { key: String, value: String },
}

/// Visit-count collaborator failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed visit response: {0}")]
    Decode(String),
}
