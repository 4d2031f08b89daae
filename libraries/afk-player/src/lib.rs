//! AFK Player - Gesture-gated, resumable playlist playback
//!
//! Client-side audio engine for the AFK static site.
//!
//! This crate provides:
//! - Playlist resolution from the page's `data-audio` attribute
//! - A fallback chain (playlist entries, default asset, user-picked file)
//! - A one-time gesture overlay that satisfies browser autoplay policies
//! - Persistence of index, position and playing flag across page loads
//! - Resume on load, with a manual control when autoplay is refused
//! - A unique-visitor badge
//!
//! # Architecture
//!
//! `afk-player` keeps all decisions in platform-agnostic code:
//! - No DOM access outside the `wasm` feature
//! - Every host capability (media resource, storage, timer, clock, random
//!   source, page controls) is a trait in [`platform`] or [`sink`]
//! - Controller state changes go through one pure transition table
//!   ([`machine::transition`])
//!
//! The `wasm` feature adds browser implementations of the capabilities and a
//! `#[wasm_bindgen(start)]` entry point that wires them to the page.
//!
//! # Example: Resolving a playlist
//!
//! ```rust
//! use afk_player::{PlaylistResolver, PlaylistSettings};
//!
//! let resolver = PlaylistResolver::new(PlaylistSettings::default());
//! let playlist = resolver.resolve(Some(" a.mp3 | b.mp3,,c.mp3 "));
//!
//! assert_eq!(playlist.ids(), vec!["a.mp3", "b.mp3", "c.mp3"]);
//! assert_eq!(resolver.resolve(None).ids(), vec!["song.mp3"]);
//! ```
//!
//! # Example: Host integration
//!
//! ```rust,ignore
//! use afk_player::{GateInput, Platform, PlayerConfig, PlayerSession};
//!
//! let platform = Platform {
//!     sink: Box::new(MyAudioElement::new()),
//!     store: Box::new(MyStorage::new()),
//!     ticker: Box::new(MyInterval::new()),
//!     clock: Box::new(MyClock),
//!     random: Box::new(afk_player::ThreadRandom),
//! };
//! let mut session = PlayerSession::new(PlayerConfig::default(), platform, Box::new(MyControls));
//!
//! // Page load
//! session.boot(Some("a.mp3,b.mp3")).await;
//!
//! // Overlay clicked: the first play runs inside this call
//! session.activate_overlay(GateInput::Click).await;
//!
//! // Timer, media and page events
//! session.tick();
//! session.media_ended().await;
//! session.visibility_changed(true);
//! session.teardown();
//! ```

pub mod controller;
mod error;
pub mod events;
pub mod gesture;
pub mod machine;
pub mod persistence;
pub mod platform;
pub mod playlist;
pub mod resume;
pub mod session;
pub mod sink;
pub mod types;
pub mod visits;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use controller::{ChainOutcome, PlaybackController, SeekOutcome};
pub use error::{PlaybackError, Result, StoreError, VisitError};
pub use events::PlaybackEvent;
pub use gesture::{GateInput, GateState, GestureGate};
pub use machine::{PlayerState, Trigger};
pub use persistence::PersistenceStore;
pub use platform::{Clock, KeyValueStore, MemoryStore, PageControls, Platform, RandomSource, ThreadRandom, Ticker};
pub use playlist::PlaylistResolver;
pub use resume::{ResumeOutcome, ResumeSupervisor};
pub use session::{BootOutcome, PlayerSession};
pub use sink::{MediaError, MediaSink};
pub use types::{
    PageIds, PersistedRecord, PlaybackState, PlayerConfig, Playlist, PlaylistSettings, StorageKeys,
    TrackOrigin, TrackRef, DEFAULT_ASSET,
};
pub use visits::{VisitBadge, VisitCounter, VisitResponse};
