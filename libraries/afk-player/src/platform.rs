//! Host capabilities the engine needs besides the media sink
//!
//! Everything here has a browser implementation in `crate::wasm` and a plain
//! in-process one (or a trivial one) for native hosts and tests.

use crate::error::StoreError;
use crate::sink::MediaSink;
use rand::Rng;
use std::cell::RefCell;
use std::collections::HashMap;

/// Fallible string key/value store (browser `localStorage`)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, for native hosts
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Source of pseudo-random start indices
pub trait RandomSource {
    /// Uniform index in `[0, bound)`; `bound` is at least 1
    fn index_below(&mut self, bound: usize) -> usize;
}

/// `rand::thread_rng` backed source (uses `getrandom`'s `js` backend in the browser)
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index_below(&mut self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound.max(1))
    }
}

/// Monotonic-enough millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// The recurring persistence timer
///
/// The host calls [`crate::PlayerSession::tick`] every `period_ms` while
/// running.
pub trait Ticker {
    fn start(&mut self, period_ms: u64);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Page affordances the engine can show or trigger
pub trait PageControls {
    fn show_overlay(&mut self);
    fn hide_overlay(&mut self);

    /// Manual "resume" control, shown after a rejected automatic play
    fn show_resume(&mut self);
    fn hide_resume(&mut self);

    /// Native file-open dialog restricted to one audio file
    fn open_file_picker(&mut self);
}

/// Capabilities handed to the controller at construction
pub struct Platform {
    pub sink: Box<dyn MediaSink>,
    pub store: Box<dyn KeyValueStore>,
    pub ticker: Box<dyn Ticker>,
    pub clock: Box<dyn Clock>,
    pub random: Box<dyn RandomSource>,
}
