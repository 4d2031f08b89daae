//! One page view's worth of player
//!
//! `PlayerSession` owns the controller, gesture gate and resume supervisor
//! and is the single entry point for page and media events. Build it once per
//! page, call [`PlayerSession::boot`], route events in, and call
//! [`PlayerSession::teardown`] when the page goes away.

use crate::{
    controller::{ChainOutcome, PlaybackController},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    gesture::{GateInput, GestureGate},
    machine::PlayerState,
    platform::{PageControls, Platform},
    playlist::PlaylistResolver,
    resume::{ResumeOutcome, ResumeSupervisor},
    types::{PlaybackState, PlayerConfig},
};
use tracing::{debug, info, warn};

/// What `boot` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// Gate locked: overlay shown, waiting for the first gesture
    AwaitingGesture,

    /// Gate unlocked: the resume supervisor ran
    Resume(ResumeOutcome),
}

pub struct PlayerSession {
    controller: PlaybackController,
    resolver: PlaylistResolver,
    gate: GestureGate,
    supervisor: ResumeSupervisor,
    controls: Box<dyn PageControls>,
    page_config: Option<String>,
    file_prompt_open: bool,
    resume_on_restore: bool,
}

impl PlayerSession {
    pub fn new(config: PlayerConfig, platform: Platform, controls: Box<dyn PageControls>) -> Self {
        let resolver = PlaylistResolver::new(config.playlist.clone());
        let controller = PlaybackController::new(&config, resolver.resolve(None), platform);
        let gate = GestureGate::from_store(controller.persistence());

        Self {
            controller,
            resolver,
            gate,
            supervisor: ResumeSupervisor::new(),
            controls,
            page_config: None,
            file_prompt_open: false,
            resume_on_restore: false,
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn gate(&self) -> &GestureGate {
        &self.gate
    }

    pub fn is_awaiting_gesture(&self) -> bool {
        self.supervisor.is_awaiting_gesture()
    }

    pub fn is_file_prompt_open(&self) -> bool {
        self.file_prompt_open
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.controller.drain_events()
    }

    /// Page loaded: show the overlay, or resume if the gate is already open
    pub async fn boot(&mut self, page_config: Option<&str>) -> BootOutcome {
        self.page_config = page_config.map(str::to_string);

        if !self.gate.is_unlocked() {
            self.controls.show_overlay();
            return BootOutcome::AwaitingGesture;
        }

        self.controls.hide_overlay();
        let outcome = self
            .supervisor
            .run(
                &self.gate,
                &self.resolver,
                self.page_config.as_deref(),
                &mut self.controller,
                self.controls.as_mut(),
            )
            .await;
        BootOutcome::Resume(outcome)
    }

    /// Click or keydown on the overlay
    ///
    /// Returns `None` if the input did not unlock the gate. Otherwise the
    /// overlay is already hidden and the flag stored, and the first play
    /// attempt is issued from within this call.
    pub async fn activate_overlay(&mut self, input: GateInput) -> Option<Result<ChainOutcome>> {
        if !self.unlock_gate(&input) {
            return None;
        }
        Some(self.start_after_unlock().await)
    }

    /// Synchronous half of [`activate_overlay`](Self::activate_overlay)
    ///
    /// Hides the overlay and stores the flag. Meant to run inside the input
    /// handler itself; when it returns `true`, follow up with
    /// [`start_after_unlock`](Self::start_after_unlock).
    pub fn unlock_gate(&mut self, input: &GateInput) -> bool {
        self.gate.activate(
            input,
            self.controller.persistence(),
            self.controls.as_mut(),
        )
    }

    /// First play attempt once the gate is open
    pub async fn start_after_unlock(&mut self) -> Result<ChainOutcome> {
        let playlist = self.resolver.resolve(self.page_config.as_deref());
        self.controller.set_playlist(playlist)?;

        let result = self.controller.open_with_fallback(None).await;
        self.after_chain(result)
    }

    /// Click on the manual resume control
    pub async fn resume_clicked(&mut self) -> Result<ChainOutcome> {
        self.file_prompt_open = false;
        let result = self
            .supervisor
            .resume_clicked(&mut self.controller, self.controls.as_mut())
            .await;
        self.after_chain(result)
    }

    /// The user picked a file in the fallback dialog
    pub async fn file_selected(&mut self, object_ref: String) -> Result<()> {
        self.file_prompt_open = false;
        match self.controller.play_local_file(object_ref).await {
            Ok(()) => {
                self.supervisor.dismiss(self.controls.as_mut());
                Ok(())
            }
            Err(e) if e.is_superseded() => Err(e),
            Err(e) => {
                warn!("Picked file would not play: {}", e);
                let from = self.controller.snapshot();
                self.supervisor.expose(from, self.controls.as_mut());
                Err(e)
            }
        }
    }

    /// Play/pause toggle
    pub async fn toggle(&mut self) -> Result<()> {
        if self.controller.state() == PlayerState::Playing {
            return self.controller.pause();
        }
        let result = self.controller.resume().await;
        self.after_resume(&result);
        result
    }

    /// Media resource reached the end of the current track
    pub async fn media_ended(&mut self) {
        match self.controller.on_ended().await {
            Ok(()) => {}
            Err(PlaybackError::Superseded) => {}
            Err(e @ PlaybackError::IllegalTransition { .. }) => {
                debug!("Ignoring end of track: {}", e);
            }
            Err(e) => {
                warn!("Advancing to the next track failed: {}", e);
                let from = PlaybackState {
                    index: self.controller.index(),
                    position_secs: 0.0,
                    is_playing: false,
                };
                self.supervisor.expose(from, self.controls.as_mut());
            }
        }
    }

    pub fn metadata_loaded(&mut self) {
        self.controller.on_metadata_loaded();
    }

    pub fn visibility_changed(&mut self, hidden: bool) {
        if hidden {
            self.controller.on_hidden();
        } else {
            self.controller.on_visible();
        }
    }

    /// Persistence timer callback
    pub fn tick(&mut self) {
        self.controller.tick();
    }

    /// Write the current snapshot, leaving playback alone
    pub fn checkpoint(&mut self) {
        self.controller.checkpoint();
    }

    /// Page is going into the back/forward cache
    pub fn suspend(&mut self) {
        self.resume_on_restore = self.controller.suspend();
        debug!(resume = self.resume_on_restore, "Player session suspended");
    }

    /// Page came back from the back/forward cache
    ///
    /// Picks playback up again if it was running when the page was hidden.
    /// If the browser refuses, the manual resume control is shown.
    pub async fn restored(&mut self) {
        self.controller.on_visible();
        if !std::mem::take(&mut self.resume_on_restore) {
            return;
        }
        let result = self.controller.resume().await;
        if let Err(e) = &result {
            info!("Playback not resumed after restore: {}", e);
        }
        self.after_resume(&result);
    }

    /// Unload for good: the page will not come back
    pub fn teardown(&mut self) {
        self.controller.teardown();
        info!("Player session torn down");
    }

    fn after_resume(&mut self, result: &Result<()>) {
        match result {
            Ok(()) => self.supervisor.dismiss(self.controls.as_mut()),
            Err(e) if !e.is_superseded() => {
                let from = self.controller.snapshot();
                self.supervisor.expose(from, self.controls.as_mut());
            }
            Err(_) => {}
        }
    }

    /// An exhausted chain ends at the file picker (once) and the resume control
    fn after_chain(&mut self, result: Result<ChainOutcome>) -> Result<ChainOutcome> {
        if let Err(PlaybackError::ChainExhausted { .. }) = result {
            let from = self.controller.snapshot();
            self.supervisor.expose(from, self.controls.as_mut());
            if !self.file_prompt_open {
                self.file_prompt_open = true;
                info!("Nothing playable, asking for a local file");
                self.controls.open_file_picker();
            }
        }
        result
    }
}
