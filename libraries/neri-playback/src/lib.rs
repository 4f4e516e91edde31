//! NeriPlayer - Playback Management
//!
//! Platform-agnostic playback engine for NeriPlayer.
//!
//! This crate provides:
//! - Playback queue with move-on-duplicate insertion
//! - Reversible shuffle (history / future / bag)
//! - Repeat modes (Off, All, One)
//! - URL resolution for NetEase and Bilibili songs, local files first
//! - Consecutive failure cap
//! - Queue persistence across launches
//! - Lyric lookup (matched, downloaded, online)
//!
//! # Architecture
//!
//! `neri-playback` never decodes audio or talks HTTP itself:
//! - Audio output is a [`MediaPlayer`] provided by the platform
//! - Platform clients are [`NeteaseApi`] and [`BiliApi`] implementations
//! - Local storage is [`LocalLibrary`] and [`LocalPlaylistStore`]
//!
//! The [`PlayerManager`] task ties them together and is driven through a
//! cloneable [`PlayerHandle`].
//!
//! # Example: Navigation
//!
//! ```rust
//! use neri_core::{Song, SongSource};
//! use neri_playback::{Navigator, RepeatMode, Step};
//!
//! let songs: Vec<Song> = (1..=3)
//!     .map(|id| Song::new(id, format!("Song {id}"), "Artist", SongSource::Netease))
//!     .collect();
//!
//! let mut nav = Navigator::new(Some(7));
//! assert_eq!(nav.set_playlist(songs, 0), Step::Play(0));
//! assert_eq!(nav.next(false), Step::Play(1));
//!
//! nav.set_repeat(RepeatMode::One);
//! assert_eq!(nav.track_ended(), Step::Play(1));
//! ```
//!
//! # Example: Running the manager
//!
//! ```rust,no_run
//! use neri_playback::{
//!     event_channel, MediaItem, MediaPlayer, MemoryPlaylistStore, PlaybackConfig, PlayerDeps,
//!     PlayerManager, ResolveOutcome, SharedSettings, SongResolver,
//! };
//! use neri_core::{Song, SongSource};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl SongResolver for Echo {
//!     async fn resolve(&self, song: &Song) -> ResolveOutcome {
//!         ResolveOutcome::Success(format!("https://cdn.example/{}.mp3", song.id))
//!     }
//! }
//!
//! struct Silent;
//!
//! impl MediaPlayer for Silent {
//!     fn load(&self, _item: MediaItem) {}
//!     fn play(&self) {}
//!     fn pause(&self) {}
//!     fn stop(&self) {}
//!     fn seek(&self, _position: Duration) {}
//!     fn position(&self) -> Duration { Duration::ZERO }
//!     fn is_loaded(&self) -> bool { true }
//! }
//!
//! # async fn run() -> neri_playback::Result<()> {
//! let handle = PlayerManager::spawn(
//!     PlaybackConfig::default(),
//!     PlayerDeps {
//!         resolver: Arc::new(Echo),
//!         player: Arc::new(Silent),
//!         settings: Arc::new(SharedSettings::default()),
//!         playlists: Arc::new(MemoryPlaylistStore::new()),
//!         events: event_channel(),
//!     },
//! );
//!
//! handle
//!     .play_playlist(vec![Song::new(1, "Song", "Artist", SongSource::Netease)], 0)
//!     .await?;
//! handle.release().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod library;
pub mod lyrics;
mod manager;
pub mod navigator;
pub mod persistence;
pub mod platform;
pub mod player;
pub mod queue;
pub mod resolver;
pub mod settings;
pub mod shuffle;
pub mod types;

// Public exports
pub use error::{ApiError, PlaybackError, Result};
pub use events::{PlayerEvent, PlayerSnapshot};
pub use library::{DirectoryLibrary, LocalLibrary, LocalPlaylistStore, MemoryPlaylistStore};
pub use lyrics::LyricService;
pub use manager::{event_channel, PlayerDeps, PlayerHandle, PlayerManager, EVENT_CAPACITY};
pub use navigator::{Navigator, Step};
pub use persistence::{PersistWriter, PersistedState, StateStore};
pub use platform::{BiliApi, BiliAudioStream, BiliPage, BiliVideoInfo, BiliVideoItem, NeteaseApi};
pub use player::MediaPlayer;
pub use queue::{IndexRemap, Queue};
pub use resolver::{PlatformResolver, ResolveOutcome, SongResolver};
pub use settings::{SettingsStore, SharedSettings};
pub use shuffle::{Advance, ShuffleState};
pub use types::{
    MediaItem, PlaybackConfig, PlaybackState, PlayerErrorKind, RepeatMode,
    DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_PROGRESS_INTERVAL,
};
