//! NeriPlayer Core
//!
//! Platform-agnostic domain types shared by the playback engine and the
//! applications built on top of it.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongSource`, `MusicPlatform`, quality settings
//! - **Cache keys**: deterministic keys combining source, ids and quality
//! - **Lyrics**: LRC parsing into timed entries
//! - **Error Handling**: Unified `NeriError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use neri_core::{QualitySettings, Song, SongSource};
//!
//! let song = Song::new(42, "Song", "Artist", SongSource::Bilibili { cid: Some(7) });
//! let key = song.cache_key(&QualitySettings::default());
//! assert_eq!(key, "bili-42-7-high");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod lyrics;
pub mod types;

// Re-export commonly used types
pub use error::{NeriError, Result};
pub use lyrics::{parse_lrc, LyricEntry};
pub use types::{
    BiliQuality, MatchedMetadata, MusicPlatform, NeteaseQuality, QualitySettings, Song,
    SongSource, BILI_SOURCE_TAG,
};
