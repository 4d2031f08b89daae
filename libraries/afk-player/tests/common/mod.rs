//! Shared fakes for the integration tests
//!
//! Every fake appends to one journal so tests can check the order in which
//! the engine touched the page, the media resource and the timer.

use afk_player::{
    Clock, KeyValueStore, MediaError, MediaSink, PageControls, PersistenceStore, Platform,
    PlaybackController, PlayerConfig, PlayerSession, Playlist, RandomSource, StorageKeys,
    StoreError, Ticker, TrackRef,
};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type Journal = Rc<RefCell<Vec<String>>>;

// ===== Media =====

/// Knobs and readings for [`FakeSink`]
#[derive(Debug, Default)]
pub struct SinkState {
    /// Sources that fail with `Unsupported`
    pub failing: HashSet<String>,
    /// Every play/resume is refused by the autoplay policy
    pub not_allowed: bool,
    /// The next play is superseded
    pub abort_next: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
}

pub struct FakeSink {
    state: Rc<RefCell<SinkState>>,
    journal: Journal,
}

#[async_trait(?Send)]
impl MediaSink for FakeSink {
    async fn play(&mut self, source: &str) -> Result<(), MediaError> {
        self.journal.borrow_mut().push(format!("play:{source}"));
        let mut state = self.state.borrow_mut();
        if state.abort_next {
            state.abort_next = false;
            return Err(MediaError::Aborted);
        }
        if state.not_allowed {
            return Err(MediaError::NotAllowed("no user gesture".into()));
        }
        if state.failing.contains(source) {
            return Err(MediaError::Unsupported(format!("{source} not found")));
        }
        state.current_time = 0.0;
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), MediaError> {
        self.journal.borrow_mut().push("resume".into());
        if self.state.borrow().not_allowed {
            return Err(MediaError::NotAllowed("no user gesture".into()));
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.journal.borrow_mut().push("pause".into());
    }

    fn seek(&mut self, position_secs: f64) -> Result<(), MediaError> {
        self.journal.borrow_mut().push(format!("seek:{position_secs}"));
        self.state.borrow_mut().current_time = position_secs;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn release(&mut self) {
        self.journal.borrow_mut().push("release".into());
    }
}

// ===== Storage =====

/// Map-backed store that can be switched to throw on every call
#[derive(Clone, Default)]
pub struct FakeStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
}

impl FakeStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.get() {
            Err(StoreError::Unavailable("SecurityError".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FakeStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.put(key, value);
        Ok(())
    }
}

// ===== Timer, clock, randomness =====

pub struct FakeTicker {
    running: Rc<Cell<bool>>,
    journal: Journal,
}

impl Ticker for FakeTicker {
    fn start(&mut self, period_ms: u64) {
        self.journal
            .borrow_mut()
            .push(format!("ticker_start:{period_ms}"));
        self.running.set(true);
    }

    fn stop(&mut self) {
        self.journal.borrow_mut().push("ticker_stop".into());
        self.running.set(false);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

pub struct FakeClock(Rc<Cell<u64>>);

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Always picks `start` (mod bound)
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn index_below(&mut self, bound: usize) -> usize {
        self.0 % bound
    }
}

// ===== Page =====

pub struct FakeControls {
    journal: Journal,
}

impl PageControls for FakeControls {
    fn show_overlay(&mut self) {
        self.journal.borrow_mut().push("show_overlay".into());
    }

    fn hide_overlay(&mut self) {
        self.journal.borrow_mut().push("hide_overlay".into());
    }

    fn show_resume(&mut self) {
        self.journal.borrow_mut().push("show_resume".into());
    }

    fn hide_resume(&mut self) {
        self.journal.borrow_mut().push("hide_resume".into());
    }

    fn open_file_picker(&mut self) {
        self.journal.borrow_mut().push("file_picker".into());
    }
}

// ===== Harness =====

/// Owns the shared handles behind one set of fakes
pub struct Harness {
    pub sink: Rc<RefCell<SinkState>>,
    pub store: FakeStore,
    pub ticker_running: Rc<Cell<bool>>,
    pub clock: Rc<Cell<u64>>,
    pub journal: Journal,
    pub random_start: usize,
    pub config: PlayerConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            sink: Rc::default(),
            store: FakeStore::default(),
            ticker_running: Rc::default(),
            clock: Rc::default(),
            journal: Rc::default(),
            random_start: 0,
            config: PlayerConfig::default(),
        }
    }

    pub fn with_random_start(mut self, start: usize) -> Self {
        self.random_start = start;
        self
    }

    pub fn fail(&self, sources: &[&str]) {
        let mut sink = self.sink.borrow_mut();
        sink.failing.extend(sources.iter().map(|s| s.to_string()));
    }

    pub fn platform(&self) -> Platform {
        Platform {
            sink: Box::new(FakeSink {
                state: Rc::clone(&self.sink),
                journal: Rc::clone(&self.journal),
            }),
            store: Box::new(self.store.clone()),
            ticker: Box::new(FakeTicker {
                running: Rc::clone(&self.ticker_running),
                journal: Rc::clone(&self.journal),
            }),
            clock: Box::new(FakeClock(Rc::clone(&self.clock))),
            random: Box::new(FixedRandom(self.random_start)),
        }
    }

    pub fn controller(&self, ids: &[&str]) -> PlaybackController {
        PlaybackController::new(&self.config, playlist(ids), self.platform())
    }

    pub fn session(&self) -> PlayerSession {
        let controls = FakeControls {
            journal: Rc::clone(&self.journal),
        };
        PlayerSession::new(self.config.clone(), self.platform(), Box::new(controls))
    }

    /// A second view onto the same store, as the next page load would see it
    pub fn persistence(&self) -> PersistenceStore {
        PersistenceStore::new(Box::new(self.store.clone()), self.config.storage.clone())
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.config.storage
    }

    /// Journal entries starting with `prefix`
    pub fn entries(&self, prefix: &str) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn plays(&self) -> Vec<String> {
        self.entries("play:")
            .into_iter()
            .map(|e| e.trim_start_matches("play:").to_string())
            .collect()
    }

    pub fn position_of(&self, entry: &str) -> Option<usize> {
        self.journal.borrow().iter().position(|e| e == entry)
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }
}

pub fn playlist(ids: &[&str]) -> Playlist {
    Playlist::new(ids.iter().map(|id| TrackRef::configured(*id)).collect())
        .expect("non-empty playlist")
}
