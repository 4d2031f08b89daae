//! Best-effort mirror of playback state in the browser-local store
//!
//! Every value is stored as a plain string under its own key. Nothing here
//! returns an error: a store that is missing, throws, or holds garbage reads
//! as "nothing persisted".

use crate::error::StoreError;
use crate::platform::KeyValueStore;
use crate::types::{PersistedRecord, PlaybackState, StorageKeys};
use tracing::debug;

const UNLOCKED: &str = "1";

pub struct PersistenceStore {
    backend: Box<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PersistenceStore {
    pub fn new(backend: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// Write the snapshot; failures are logged and dropped
    pub fn save(&self, state: &PlaybackState) {
        let position = if state.position_secs.is_finite() {
            state.position_secs.max(0.0)
        } else {
            0.0
        };

        let writes = [
            (&self.keys.index, state.index.to_string()),
            (&self.keys.position, position.to_string()),
            (&self.keys.playing, state.is_playing.to_string()),
        ];

        for (key, value) in &writes {
            if let Err(e) = self.backend.set(key, value) {
                debug!("Playback state not persisted: {}", e);
                return;
            }
        }
    }

    /// Read the snapshot, or defaults when missing or corrupt
    pub fn load(&self) -> PlaybackState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => PlaybackState::default(),
            Err(e) => {
                debug!("Ignoring persisted playback state: {}", e);
                PlaybackState::default()
            }
        }
    }

    pub fn load_record(&self) -> PersistedRecord {
        PersistedRecord {
            state: self.load(),
            gesture_unlocked: self.gesture_unlocked(),
        }
    }

    /// Whether this profile has already passed the gesture overlay
    pub fn gesture_unlocked(&self) -> bool {
        match self.backend.get(&self.keys.gesture) {
            Ok(value) => value.as_deref() == Some(UNLOCKED),
            Err(e) => {
                debug!("Gesture flag unreadable: {}", e);
                false
            }
        }
    }

    pub fn mark_unlocked(&self) {
        if let Err(e) = self.backend.set(&self.keys.gesture, UNLOCKED) {
            debug!("Gesture flag not persisted: {}", e);
        }
    }

    /// `Ok(None)` when no index was ever written
    fn try_load(&self) -> Result<Option<PlaybackState>, StoreError> {
        let Some(raw_index) = self.backend.get(&self.keys.index)? else {
            return Ok(None);
        };
        let index = raw_index
            .trim()
            .parse::<usize>()
            .map_err(|_| self.corrupt(&self.keys.index, &raw_index))?;

        let position_secs = match self.backend.get(&self.keys.position)? {
            None => 0.0,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(p) if p.is_finite() && p >= 0.0 => p,
                _ => return Err(self.corrupt(&self.keys.position, &raw)),
            },
        };

        let is_playing = match self.backend.get(&self.keys.playing)? {
            None => false,
            Some(raw) => match raw.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(self.corrupt(&self.keys.playing, &raw)),
            },
        };

        Ok(Some(PlaybackState {
            index,
            position_secs,
            is_playing,
        }))
    }

    fn corrupt(&self, key: &str, value: &str) -> StoreError {
        StoreError::Corrupt {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
