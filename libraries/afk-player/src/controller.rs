//! Playback controller - owns the media resource
//!
//! Coordinates the playlist index, the media sink, the persistence store and
//! the persistence timer. Every state change is routed through the transition
//! table in [`crate::machine`].

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    machine::{transition, PlayerState, TickerChange, Transition, Trigger},
    persistence::PersistenceStore,
    platform::{Clock, Platform, RandomSource, Ticker},
    sink::{MediaError, MediaSink},
    types::{PlaybackState, PlayerConfig, Playlist, TrackRef},
};
use tracing::{debug, info, warn};

/// Where a fallback chain ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// A playlist entry started playing
    Playlist { index: usize, attempts: u32 },

    /// Only the default asset would play; it is now the playlist
    DefaultAsset { attempts: u32 },
}

impl ChainOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            ChainOutcome::Playlist { attempts, .. } | ChainOutcome::DefaultAsset { attempts } => {
                *attempts
            }
        }
    }
}

/// What happened to a seek request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    Applied,

    /// Duration unknown yet; applied on `on_metadata_loaded`
    Deferred,
}

/// Central playback control
///
/// Owns the single media resource. Exactly one request is in flight at a
/// time: async operations take `&mut self` and settle before returning.
pub struct PlaybackController {
    // State
    state: PlayerState,
    playlist: Playlist,
    index: usize,
    is_playing: bool,
    pending_seek: Option<f64>,
    /// Page not visible; the timer stays off even across track changes
    hidden: bool,

    // Capabilities
    sink: Box<dyn MediaSink>,
    store: PersistenceStore,
    ticker: Box<dyn Ticker>,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,

    // Settings
    default_asset: String,
    persist_interval_ms: u64,

    last_persist_ms: Option<u64>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller in `Idle` for `playlist`
    pub fn new(config: &PlayerConfig, playlist: Playlist, platform: Platform) -> Self {
        let Platform {
            sink,
            store,
            ticker,
            clock,
            random,
        } = platform;

        Self {
            state: PlayerState::Idle,
            playlist,
            index: 0,
            is_playing: false,
            pending_seek: None,
            hidden: false,
            sink,
            store: PersistenceStore::new(store, config.storage.clone()),
            ticker,
            clock,
            random,
            default_asset: config.default_asset.clone(),
            persist_interval_ms: config.persist_interval_ms.max(1),
            last_persist_ms: None,
            pending_events: Vec::new(),
        }
    }

    // ===== State =====

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> &TrackRef {
        self.playlist.track(self.index as i64)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn persistence(&self) -> &PersistenceStore {
        &self.store
    }

    /// Current index, position and playing flag
    pub fn snapshot(&self) -> PlaybackState {
        let position = self.sink.current_time();
        PlaybackState {
            index: self.index,
            position_secs: if position.is_finite() {
                position.max(0.0)
            } else {
                0.0
            },
            is_playing: self.is_playing,
        }
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Replace the playlist for this page view and reset the index
    pub fn set_playlist(&mut self, playlist: Playlist) -> Result<()> {
        if let PlayerState::Attempting { .. } = self.state {
            return Err(PlaybackError::IllegalTransition {
                state: self.state,
                trigger: Trigger::Request,
            });
        }
        self.playlist = playlist;
        self.index = 0;
        Ok(())
    }

    // ===== Playback Control =====

    /// Play the track at `index`, wrapped into the playlist
    ///
    /// Negative indices count back from the end, so `play_at(-1)` is the
    /// last track.
    pub async fn play_at(&mut self, index: i64) -> Result<()> {
        self.apply(Trigger::Request)?;
        self.attempt_index(index).await
    }

    /// Skip to next track
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<()> {
        self.play_at(self.index as i64 + 1).await
    }

    /// Go to previous track
    pub async fn previous(&mut self) -> Result<()> {
        self.play_at(self.index as i64 - 1).await
    }

    /// Continue after a pause, or (re)start the current index otherwise
    pub async fn resume(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Playing => Ok(()),
            PlayerState::Paused => {
                self.apply(Trigger::Request)?;
                let track = self.current_track().id.clone();
                let result = self.sink.resume().await;
                self.settle(&track, result)
            }
            _ => self.play_at(self.index as i64).await,
        }
    }

    /// Pause playback
    ///
    /// Persists immediately. Pausing while already paused does nothing.
    pub fn pause(&mut self) -> Result<()> {
        if self.state == PlayerState::Playing {
            self.sink.pause();
            self.is_playing = false;
        }
        self.apply(Trigger::Pause).map(|_| ())
    }

    /// Initial open: walk the playlist, then the default asset
    ///
    /// Starts at `start` (or a random index), tries each playlist entry at
    /// most once, then the default asset. Returns
    /// [`PlaybackError::ChainExhausted`] when nothing played; the caller is
    /// expected to fall back to a user-picked file.
    pub async fn open_with_fallback(&mut self, start: Option<usize>) -> Result<ChainOutcome> {
        let len = self.playlist.len();
        let start = start.unwrap_or_else(|| self.random.index_below(len)) % len;
        let mut attempts = 0u32;

        for offset in 0..len {
            let index = (start + offset) % len;
            self.apply(if attempts == 0 {
                Trigger::Request
            } else {
                Trigger::Retry
            })?;
            attempts += 1;

            match self.attempt_index(index as i64).await {
                Ok(()) => return Ok(ChainOutcome::Playlist { index, attempts }),
                Err(PlaybackError::Superseded) => return Err(PlaybackError::Superseded),
                Err(e) => debug!(attempt = attempts, "Fallback candidate failed: {}", e),
            }
        }

        self.apply(Trigger::Retry)?;
        attempts += 1;
        let configured = std::mem::replace(
            &mut self.playlist,
            Playlist::single(TrackRef::default_asset(self.default_asset.clone())),
        );

        match self.attempt_index(0).await {
            Ok(()) => {
                info!(attempts, "Playlist unplayable, playing default asset");
                return Ok(ChainOutcome::DefaultAsset { attempts });
            }
            Err(e) => {
                self.playlist = configured;
                self.index = start;
                if e.is_superseded() {
                    return Err(e);
                }
            }
        }

        warn!(attempts, "Fallback chain exhausted");
        self.pending_events
            .push(PlaybackEvent::FallbackExhausted { attempts });
        Err(PlaybackError::ChainExhausted { attempts })
    }

    /// Play a user-picked file as a transient one-track playlist
    pub async fn play_local_file(&mut self, object_ref: String) -> Result<()> {
        self.apply(Trigger::Request)?;
        self.playlist = Playlist::single(TrackRef::local_file(object_ref));
        self.attempt_index(0).await
    }

    // ===== Seeking =====

    /// Seek within the current track
    ///
    /// Valid targets are `0 <= position < duration`. Before metadata has
    /// loaded the request is parked and applied by `on_metadata_loaded`.
    pub fn seek(&mut self, position_secs: f64) -> Result<SeekOutcome> {
        if !position_secs.is_finite() || position_secs < 0.0 {
            return Err(PlaybackError::InvalidSeekPosition(position_secs));
        }

        match self.sink.duration() {
            Some(duration) => {
                self.apply_seek(position_secs, duration)?;
                Ok(SeekOutcome::Applied)
            }
            None => {
                self.pending_seek = Some(position_secs);
                Ok(SeekOutcome::Deferred)
            }
        }
    }

    fn apply_seek(&mut self, position_secs: f64, duration: f64) -> Result<()> {
        if position_secs >= duration {
            return Err(PlaybackError::InvalidSeekPosition(position_secs));
        }
        self.sink
            .seek(position_secs)
            .map_err(|_| PlaybackError::InvalidSeekPosition(position_secs))?;
        self.pending_events
            .push(PlaybackEvent::PositionRestored { position_secs });
        if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            self.persist_now();
        }
        Ok(())
    }

    // ===== Media and page lifecycle =====

    /// Metadata (duration) became available for the current source
    pub fn on_metadata_loaded(&mut self) {
        let Some(position) = self.pending_seek.take() else {
            return;
        };
        match self.sink.duration() {
            Some(duration) => {
                if let Err(e) = self.apply_seek(position, duration) {
                    debug!("Dropping deferred seek: {}", e);
                }
            }
            None => debug!(position, "Track has no finite duration, dropping deferred seek"),
        }
    }

    /// Natural end of track: advance and try the next entry
    pub async fn on_ended(&mut self) -> Result<()> {
        let finished = self.index;
        self.apply(Trigger::Ended)?;
        self.pending_events
            .push(PlaybackEvent::TrackFinished { index: finished });
        self.play_at(finished as i64 + 1).await
    }

    /// Persistence timer callback
    pub fn tick(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        // Skip ticks that land right after a state-change write
        let now = self.clock.now_ms();
        if let Some(last) = self.last_persist_ms {
            if now.saturating_sub(last) < self.persist_interval_ms / 2 {
                return;
            }
        }
        self.persist_now();
    }

    pub fn on_hidden(&mut self) {
        self.hidden = true;
        self.apply_lifecycle(Trigger::Hidden);
    }

    pub fn on_visible(&mut self) {
        self.hidden = false;
        self.apply_lifecycle(Trigger::Visible);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Page is entering the back/forward cache
    ///
    /// Persists and stops the timer like [`teardown`](Self::teardown) but
    /// keeps the media resource, parking playback as `Paused`. Returns
    /// whether audio was playing.
    pub fn suspend(&mut self) -> bool {
        let was_playing = self.state == PlayerState::Playing;
        self.hidden = true;
        // Persist first so the record still says playing
        self.apply_lifecycle(Trigger::Suspend);
        if was_playing {
            self.sink.pause();
            self.is_playing = false;
        }
        was_playing
    }

    /// Write the current snapshot if there is playback worth keeping
    pub fn checkpoint(&mut self) {
        if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            self.persist_now();
        }
    }

    /// Persist, stop the timer and release the media resource
    pub fn teardown(&mut self) {
        self.apply_lifecycle(Trigger::Teardown);
        self.pending_seek = None;
        self.sink.release();
    }

    // ===== Internals =====

    async fn attempt_index(&mut self, index: i64) -> Result<()> {
        self.index = self.playlist.wrap_index(index);
        self.pending_seek = None;
        let track = self.playlist.track(self.index as i64).id.clone();
        debug!(index = self.index, track = %track, "Attempting playback");

        let result = self.sink.play(&track).await;
        self.settle(&track, result)
    }

    /// Feed a finished media request back into the state machine
    fn settle(&mut self, track: &str, result: std::result::Result<(), MediaError>) -> Result<()> {
        match result {
            Ok(()) => {
                self.is_playing = true;
                self.apply(Trigger::Started)?;
                info!(index = self.index, track, "Playing");
                self.pending_events.push(PlaybackEvent::TrackChanged {
                    index: self.index,
                    track_id: track.to_string(),
                });
                Ok(())
            }
            Err(MediaError::Aborted) => {
                self.is_playing = false;
                self.apply(Trigger::Rejected)?;
                debug!(track, "Playback request superseded");
                Err(PlaybackError::Superseded)
            }
            Err(err) => {
                self.is_playing = false;
                self.apply(Trigger::Rejected)?;
                warn!(track, "Playback attempt failed: {}", err);
                self.pending_events.push(PlaybackEvent::AttemptFailed {
                    track_id: track.to_string(),
                    reason: err.to_string(),
                });
                Err(PlaybackError::MediaRejected {
                    track: track.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    fn apply(&mut self, trigger: Trigger) -> Result<Transition> {
        let t = transition(self.state, trigger)?;
        let changed = t.next != self.state;
        self.state = t.next;

        match t.ticker {
            TickerChange::Start if self.hidden => {
                debug!("Page hidden, timer stays off");
            }
            TickerChange::Start if !self.ticker.is_running() => {
                self.ticker.start(self.persist_interval_ms);
            }
            TickerChange::Stop if self.ticker.is_running() => self.ticker.stop(),
            _ => {}
        }

        if t.persist {
            self.persist_now();
        }

        if changed {
            self.pending_events
                .push(PlaybackEvent::StateChanged { state: self.state });
        }

        Ok(t)
    }

    /// Lifecycle triggers are legal in every state
    fn apply_lifecycle(&mut self, trigger: Trigger) {
        if let Err(e) = self.apply(trigger) {
            debug!("Ignoring {:?}: {}", trigger, e);
        }
    }

    fn persist_now(&mut self) {
        if self.playlist.is_transient() {
            return;
        }
        let snapshot = self.snapshot();
        self.store.save(&snapshot);
        self.last_persist_ms = Some(self.clock.now_ms());
    }
}
