//! Song and source types
//!
//! A song is an immutable value: metadata updates replace the whole value.
//! Identity is the pair `(id, source)`, so a NetEase song and a Bilibili video
//! that happen to share a numeric id never collide.

use super::quality::QualitySettings;
use crate::error::NeriError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Legacy source tag prefix for Bilibili entries (`"Bilibili"` or `"Bilibili|<cid>"`)
pub const BILI_SOURCE_TAG: &str = "Bilibili";

/// Where a song is streamed from
///
/// Each variant carries the extra identifiers its platform needs to resolve
/// a stream URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum SongSource {
    /// NetEase Cloud Music track, `Song::id` is the song id
    Netease,

    /// Bilibili video, `Song::id` is the avid
    Bilibili {
        /// Page (part) id; `None` means the first page of the video
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cid: Option<i64>,
    },
}

impl SongSource {
    /// Interpret a legacy source tag
    ///
    /// `"Bilibili|<cid>"` carries a page id; a missing, zero or unparsable cid
    /// means "first page". Any tag not starting with `Bilibili` is NetEase.
    pub fn from_tag(tag: &str) -> Self {
        if !tag.starts_with(BILI_SOURCE_TAG) {
            return Self::Netease;
        }

        let cid = tag
            .split('|')
            .nth(1)
            .and_then(|part| part.parse::<i64>().ok())
            .filter(|cid| *cid != 0);

        Self::Bilibili { cid }
    }

    /// Legacy source tag for this source
    pub fn tag(&self) -> String {
        match self {
            Self::Netease => "Netease".to_string(),
            Self::Bilibili { cid: Some(cid) } => format!("{}|{}", BILI_SOURCE_TAG, cid),
            Self::Bilibili { cid: None } => BILI_SOURCE_TAG.to_string(),
        }
    }

    pub fn is_bilibili(&self) -> bool {
        matches!(self, Self::Bilibili { .. })
    }
}

impl std::fmt::Display for SongSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Platform a lyric/metadata match was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicPlatform {
    CloudMusic,
    QqMusic,
}

impl FromStr for MusicPlatform {
    type Err = NeriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloud_music" => Ok(Self::CloudMusic),
            "qq_music" => Ok(Self::QqMusic),
            other => Err(NeriError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Metadata picked by the user from a search on another platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedMetadata {
    pub name: String,
    pub artist: String,
    pub cover_url: Option<String>,
    /// Raw LRC text of the matched song
    pub lyric: Option<String>,
    pub source: MusicPlatform,
    /// Song id on the matched platform
    pub song_id: String,
}

/// A playable song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Platform id (NetEase song id or Bilibili avid)
    pub id: i64,

    /// Display title
    pub name: String,

    pub artist: String,

    /// Platform and secondary id
    pub source: SongSource,

    #[serde(default)]
    pub duration_ms: u64,

    #[serde(default)]
    pub cover_url: Option<String>,

    /// Raw LRC text from a user-selected metadata match
    #[serde(default)]
    pub matched_lyric: Option<String>,

    #[serde(default)]
    pub matched_lyric_source: Option<MusicPlatform>,

    #[serde(default)]
    pub matched_song_id: Option<String>,

    /// User adjustment applied to lyric timestamps
    #[serde(default)]
    pub user_lyric_offset_ms: i64,
}

impl Song {
    /// Create a song with empty optional metadata
    pub fn new(id: i64, name: impl Into<String>, artist: impl Into<String>, source: SongSource) -> Self {
        Self {
            id,
            name: name.into(),
            artist: artist.into(),
            source,
            duration_ms: 0,
            cover_url: None,
            matched_lyric: None,
            matched_lyric_source: None,
            matched_song_id: None,
            user_lyric_offset_ms: 0,
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    /// Whether both values refer to the same track (same id and source)
    pub fn same_track(&self, other: &Song) -> bool {
        self.id == other.id && self.source == other.source
    }

    /// Copy of this song carrying the matched metadata
    #[must_use]
    pub fn with_matched(&self, matched: MatchedMetadata) -> Song {
        Song {
            name: matched.name,
            artist: matched.artist,
            cover_url: matched.cover_url,
            matched_lyric: matched.lyric,
            matched_lyric_source: Some(matched.source),
            matched_song_id: Some(matched.song_id),
            ..self.clone()
        }
    }

    /// Copy of this song with a new lyric offset
    #[must_use]
    pub fn with_lyric_offset(&self, offset_ms: i64) -> Song {
        Song {
            user_lyric_offset_ms: offset_ms,
            ..self.clone()
        }
    }

    /// Key for the media cache
    ///
    /// Built from source, ids and the active quality for the song's platform:
    /// - NetEase: `netease-<id>-<quality>`
    /// - Bilibili: `bili-<avid>-<cid>-<quality>` or `bili-<avid>-<quality>`
    pub fn cache_key(&self, quality: &QualitySettings) -> String {
        match self.source {
            SongSource::Netease => format!("netease-{}-{}", self.id, quality.netease),
            SongSource::Bilibili { cid: Some(cid) } => {
                format!("bili-{}-{}-{}", self.id, cid, quality.bilibili)
            }
            SongSource::Bilibili { cid: None } => format!("bili-{}-{}", self.id, quality.bilibili),
        }
    }

    /// Quality-independent file stem used for downloaded audio and lyrics
    pub fn file_stem(&self) -> String {
        match self.source {
            SongSource::Netease => format!("netease-{}", self.id),
            SongSource::Bilibili { cid: Some(cid) } => format!("bili-{}-{}", self.id, cid),
            SongSource::Bilibili { cid: None } => format!("bili-{}", self.id),
        }
    }
}
