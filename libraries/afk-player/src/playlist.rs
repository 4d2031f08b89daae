//! Playlist resolution from page configuration

use crate::types::{Playlist, PlaylistSettings, TrackRef};
use tracing::debug;

/// Turns the page's `data-audio` attribute into a non-empty playlist
///
/// Resolution never fails: empty or missing configuration falls back to the
/// built-in default playlist, then to the single fallback track.
#[derive(Debug, Clone)]
pub struct PlaylistResolver {
    settings: PlaylistSettings,
}

impl PlaylistResolver {
    pub fn new(settings: PlaylistSettings) -> Self {
        Self { settings }
    }

    /// Resolve a playlist for this page view
    pub fn resolve(&self, page_config: Option<&str>) -> Playlist {
        let configured = page_config
            .map(|raw| self.parse_candidates(raw))
            .unwrap_or_default();

        if let Some(playlist) =
            Playlist::new(configured.into_iter().map(TrackRef::configured).collect())
        {
            debug!(tracks = ?playlist.ids(), "Using page playlist");
            return playlist;
        }

        let defaults = self
            .settings
            .default_playlist
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(TrackRef::default_asset)
            .collect();

        if let Some(playlist) = Playlist::new(defaults) {
            debug!(tracks = ?playlist.ids(), "Page playlist empty, using default playlist");
            return playlist;
        }

        debug!(
            track = %self.settings.fallback_track,
            "Default playlist empty, using fallback track"
        );
        Playlist::single(TrackRef::default_asset(self.fallback_id()))
    }

    /// Split on any configured delimiter, trim, drop empties; order is kept
    pub fn parse_candidates(&self, raw: &str) -> Vec<String> {
        raw.split(|c: char| self.settings.delimiters.contains(&c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn fallback_id(&self) -> &str {
        let trimmed = self.settings.fallback_track.trim();
        if trimmed.is_empty() {
            crate::types::DEFAULT_ASSET
        } else {
            trimmed
        }
    }
}

impl Default for PlaylistResolver {
    fn default() -> Self {
        Self::new(PlaylistSettings::default())
    }
}
