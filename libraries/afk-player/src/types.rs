//! Core types for playback management

use serde::{Deserialize, Serialize};

/// Where a track reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackOrigin {
    /// Listed in the page's `data-audio` attribute
    Configured,

    /// Built-in default playlist or the well-known fallback asset
    Default,

    /// Object reference to a file the user picked by hand
    LocalFile,
}

/// Opaque reference to a playable track
///
/// `id` is whatever the media resource accepts as a source (a relative URL or
/// an object URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub id: String,
    pub origin: TrackOrigin,
}

impl TrackRef {
    pub fn configured(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: TrackOrigin::Configured,
        }
    }

    pub fn default_asset(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: TrackOrigin::Default,
        }
    }

    pub fn local_file(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: TrackOrigin::LocalFile,
        }
    }
}

/// Ordered, non-empty list of tracks for one page view
///
/// The only ways to build one are [`Playlist::new`] (which refuses empty
/// input) and [`Playlist::single`], so `len() >= 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    tracks: Vec<TrackRef>,
}

impl Playlist {
    /// Build a playlist, or `None` when `tracks` is empty
    pub fn new(tracks: Vec<TrackRef>) -> Option<Self> {
        if tracks.is_empty() {
            None
        } else {
            Some(Self { tracks })
        }
    }

    /// One-entry playlist
    pub fn single(track: TrackRef) -> Self {
        Self {
            tracks: vec![track],
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Normalize any (possibly negative) index into `[0, len)`
    pub fn wrap_index(&self, index: i64) -> usize {
        index.rem_euclid(self.tracks.len() as i64) as usize
    }

    /// Track at `index` after wrapping
    pub fn track(&self, index: i64) -> &TrackRef {
        &self.tracks[self.wrap_index(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }

    /// A picked local file does not survive navigation, so its playlist is
    /// never persisted
    pub fn is_transient(&self) -> bool {
        self.tracks
            .iter()
            .any(|t| t.origin == TrackOrigin::LocalFile)
    }
}

/// Playback position snapshot, as mirrored into the persistence store
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Index into the playlist
    pub index: usize,

    /// Seconds from the start of the track (always >= 0)
    pub position_secs: f64,

    /// Whether audio was playing when the snapshot was taken
    pub is_playing: bool,
}

/// Everything persisted per browser profile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub state: PlaybackState,
    pub gesture_unlocked: bool,
}

/// Playlist resolution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Characters separating entries in the page attribute (default: `,` and `|`)
    pub delimiters: Vec<char>,

    /// Used when the page supplies nothing usable
    pub default_playlist: Vec<String>,

    /// Used when `default_playlist` is empty too
    pub fallback_track: String,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            delimiters: vec![',', '|'],
            default_playlist: vec![DEFAULT_ASSET.to_string()],
            fallback_track: DEFAULT_ASSET.to_string(),
        }
    }
}

/// Keys used in the browser-local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub gesture: String,
    pub index: String,
    pub position: String,
    pub playing: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            gesture: "afk_opened".to_string(),
            index: "afk_index".to_string(),
            position: "afk_position".to_string(),
            playing: "afk_playing".to_string(),
        }
    }
}

/// Element ids the browser bindings look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageIds {
    pub overlay: String,
    pub resume_button: String,
    pub file_input: String,
    pub visit_count: String,
}

impl Default for PageIds {
    fn default() -> Self {
        Self {
            overlay: "open-overlay".to_string(),
            resume_button: "resume-audio".to_string(),
            file_input: "file-input".to_string(),
            visit_count: "visit-count".to_string(),
        }
    }
}

/// The well-known asset every site deploy ships with
pub const DEFAULT_ASSET: &str = "song.mp3";

/// Configuration for the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub playlist: PlaylistSettings,

    pub storage: StorageKeys,

    pub page: PageIds,

    /// Persistence cadence while playing (default: 1000 ms)
    pub persist_interval_ms: u64,

    /// Last resort before asking the user for a file (default: `song.mp3`)
    pub default_asset: String,

    /// Visit-count endpoint; `None` disables the badge
    pub visits_endpoint: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playlist: PlaylistSettings::default(),
            storage: StorageKeys::default(),
            page: PageIds::default(),
            persist_interval_ms: 1000,
            default_asset: DEFAULT_ASSET.to_string(),
            visits_endpoint: Some("/api/visits".to_string()),
        }
    }
}
