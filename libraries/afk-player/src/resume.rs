//! Resume across page loads
//!
//! On load, once the gesture gate is unlocked, replay the persisted index and
//! position. The play call is programmatic (no gesture), so browsers may
//! reject it; retrying would fail for the same reason, so instead a manual
//! control is shown and the next attempt runs under the click that hits it.

use crate::{
    controller::{ChainOutcome, PlaybackController, SeekOutcome},
    error::Result,
    gesture::GestureGate,
    platform::PageControls,
    playlist::PlaylistResolver,
    types::PlaybackState,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Gate still locked, or resume already ran for this page
    Skipped,

    /// Persisted index is playing again
    Resumed {
        index: usize,
        /// `None` when there was no usable position to restore
        seek: Option<SeekOutcome>,
    },

    /// Automatic play was rejected; the manual control is showing
    AwaitingGesture,

    /// Another request took over the media resource
    Superseded,
}

#[derive(Debug, Default)]
pub struct ResumeSupervisor {
    ran: bool,
    pending: Option<PlaybackState>,
}

impl ResumeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the manual resume control is waiting for a click
    pub fn is_awaiting_gesture(&self) -> bool {
        self.pending.is_some()
    }

    /// Attempt the automatic resume; runs at most once per page view
    pub async fn run(
        &mut self,
        gate: &GestureGate,
        resolver: &PlaylistResolver,
        page_config: Option<&str>,
        controller: &mut PlaybackController,
        controls: &mut dyn PageControls,
    ) -> ResumeOutcome {
        if self.ran || !gate.is_unlocked() {
            return ResumeOutcome::Skipped;
        }
        self.ran = true;

        let record = controller.persistence().load();
        if let Err(e) = controller.set_playlist(resolver.resolve(page_config)) {
            debug!("Resume skipped: {}", e);
            return ResumeOutcome::Skipped;
        }

        info!(
            index = record.index,
            position = record.position_secs,
            "Resuming playback"
        );

        match controller.play_at(record.index as i64).await {
            Ok(()) => ResumeOutcome::Resumed {
                index: controller.index(),
                seek: restore_position(controller, record.position_secs),
            },
            Err(e) if e.is_superseded() => ResumeOutcome::Superseded,
            Err(e) => {
                info!("Automatic resume rejected, waiting for a click: {}", e);
                self.expose(record, controls);
                ResumeOutcome::AwaitingGesture
            }
        }
    }

    /// Show the manual control; a click resumes from `from`
    pub fn expose(&mut self, from: PlaybackState, controls: &mut dyn PageControls) {
        self.pending = Some(from);
        controls.show_resume();
    }

    /// Playback recovered some other way; hide the manual control
    pub fn dismiss(&mut self, controls: &mut dyn PageControls) {
        if self.pending.take().is_some() {
            controls.hide_resume();
        }
    }

    /// Manual control clicked: run the fallback chain under this gesture
    ///
    /// The chain starts at the remembered index. The remembered position is
    /// re-applied only if that same index is what ends up playing.
    pub async fn resume_clicked(
        &mut self,
        controller: &mut PlaybackController,
        controls: &mut dyn PageControls,
    ) -> Result<ChainOutcome> {
        controls.hide_resume();
        let from = self.pending.take().unwrap_or_else(|| controller.snapshot());
        let start = controller.playlist().wrap_index(from.index as i64);

        let outcome = controller.open_with_fallback(Some(start)).await?;
        if let ChainOutcome::Playlist { index, .. } = outcome {
            if index == start {
                restore_position(controller, from.position_secs);
            }
        }
        Ok(outcome)
    }
}

/// Seek to a persisted position if it still fits the track
///
/// Anything outside `0 < position < duration` silently starts from 0.
fn restore_position(controller: &mut PlaybackController, position_secs: f64) -> Option<SeekOutcome> {
    if position_secs.is_nan() || position_secs <= 0.0 {
        return None;
    }
    match controller.seek(position_secs) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            debug!("Stale resume position, starting from 0: {}", e);
            None
        }
    }
}
