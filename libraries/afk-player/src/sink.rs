//! Platform-agnostic media resource trait
//!
//! Abstracts the browser `<audio>` element so the controller can run without a
//! DOM (tests, other hosts).

use async_trait::async_trait;
use thiserror::Error;

/// Why a media request failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Autoplay policy: no user gesture behind the call
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    /// The source was replaced (or playback paused) before the request settled
    #[error("Playback aborted")]
    Aborted,

    /// Format or source not supported / asset missing
    #[error("Source not supported: {0}")]
    Unsupported(String),

    #[error("Media error: {0}")]
    Other(String),
}

/// The single media-playback resource
///
/// Implementors own exactly one playing source at a time. `play` reassigns
/// the source, which implicitly cancels any earlier request.
#[async_trait(?Send)]
pub trait MediaSink {
    /// Point the resource at `source` and start playing
    ///
    /// Resolves once audio is actually playing, or fails with the reason the
    /// platform gave.
    async fn play(&mut self, source: &str) -> Result<(), MediaError>;

    /// Continue the current source from where it was paused
    async fn resume(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Jump to `position_secs` in the current source
    fn seek(&mut self, position_secs: f64) -> Result<(), MediaError>;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Track duration in seconds, `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;

    /// Drop the current source and free decoder resources
    fn release(&mut self) {}
}
