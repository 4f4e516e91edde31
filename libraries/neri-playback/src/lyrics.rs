//! Lyric lookup
//!
//! Sources, first hit wins:
//! 1. Lyric text from a user-selected metadata match
//! 2. A downloaded `.lrc` file
//! 3. The NetEase lyric endpoint (NetEase songs only; Bilibili has none)

use crate::error::ApiError;
use crate::library::LocalLibrary;
use crate::platform::NeteaseApi;
use neri_core::{parse_lrc, LyricEntry, MusicPlatform, Song, SongSource};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct LyricResponse {
    #[serde(default)]
    lrc: Option<LyricBody>,
    #[serde(default)]
    tlyric: Option<LyricBody>,
}

#[derive(Debug, Default, Deserialize)]
struct LyricBody {
    #[serde(default)]
    lyric: String,
}

/// Finds and parses lyrics for songs
pub struct LyricService {
    netease: Arc<dyn NeteaseApi>,
    library: Arc<dyn LocalLibrary>,
}

impl LyricService {
    pub fn new(netease: Arc<dyn NeteaseApi>, library: Arc<dyn LocalLibrary>) -> Self {
        Self { netease, library }
    }

    /// Original-language lyrics; empty when none are found
    pub async fn lyrics(&self, song: &Song) -> Vec<LyricEntry> {
        if let Some(text) = song.matched_lyric.as_deref().filter(|t| !t.trim().is_empty()) {
            let entries = parse_lrc(text);
            if !entries.is_empty() {
                return entries;
            }
        }

        if let Some(path) = self.library.lyric_file(song) {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    let entries = parse_lrc(&text);
                    if !entries.is_empty() {
                        return entries;
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read lyric file");
                }
            }
        }

        if song.source.is_bilibili() {
            return Vec::new();
        }

        match self.fetch(song.id).await {
            Ok(response) => response
                .lrc
                .map(|body| parse_lrc(&body.lyric))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(song_id = song.id, error = %e, "Failed to fetch lyrics");
                Vec::new()
            }
        }
    }

    /// Translated lyrics, available from NetEase only
    ///
    /// Bilibili songs get them through a CloudMusic metadata match.
    pub async fn translated_lyrics(&self, song: &Song) -> Vec<LyricEntry> {
        let Some(netease_id) = translation_source(song) else {
            return Vec::new();
        };

        match self.fetch(netease_id).await {
            Ok(response) => response
                .tlyric
                .map(|body| parse_lrc(&body.lyric))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(song_id = netease_id, error = %e, "Failed to fetch translated lyrics");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, song_id: i64) -> Result<LyricResponse, ApiError> {
        let body = self.netease.lyric(song_id).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// NetEase id whose translation applies to `song`
///
/// NetEase songs always use their own id; a Bilibili song needs a
/// CloudMusic match.
fn translation_source(song: &Song) -> Option<i64> {
    match (&song.source, song.matched_lyric_source) {
        (SongSource::Bilibili { .. }, Some(MusicPlatform::CloudMusic)) => song
            .matched_song_id
            .as_deref()
            .and_then(|id| id.parse::<i64>().ok()),
        (SongSource::Bilibili { .. }, _) => None,
        (SongSource::Netease, None | Some(MusicPlatform::CloudMusic)) => Some(song.id),
        (SongSource::Netease, Some(MusicPlatform::QqMusic)) => None,
    }
}
