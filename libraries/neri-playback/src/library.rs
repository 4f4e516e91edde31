//! Local collaborators: downloaded files and user playlists

use crate::error::ApiError;
use async_trait::async_trait;
use neri_core::Song;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Audio extensions probed for downloaded songs, in order
const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "m4a", "ogg", "opus"];

/// Fully downloaded songs and lyrics on this device
pub trait LocalLibrary: Send + Sync {
    /// Downloaded audio file for `song`, if complete
    fn local_file(&self, song: &Song) -> Option<PathBuf>;

    /// Downloaded LRC file for `song`
    fn lyric_file(&self, song: &Song) -> Option<PathBuf>;
}

/// Download directory with files named after [`Song::file_stem`]
///
/// ```text
/// downloads/
///   netease-1824020871.flac
///   netease-1824020871.lrc
///   bili-170001-42.m4a
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn existing(&self, stem: &str, extension: &str) -> Option<PathBuf> {
        let path = self.root.join(format!("{}.{}", stem, extension));
        path.is_file().then_some(path)
    }
}

impl LocalLibrary for DirectoryLibrary {
    fn local_file(&self, song: &Song) -> Option<PathBuf> {
        let stem = song.file_stem();
        AUDIO_EXTENSIONS
            .iter()
            .find_map(|ext| self.existing(&stem, ext))
    }

    fn lyric_file(&self, song: &Song) -> Option<PathBuf> {
        self.existing(&song.file_stem(), "lrc")
    }
}

/// User playlists kept on the device (favorites and custom lists)
#[async_trait]
pub trait LocalPlaylistStore: Send + Sync {
    async fn add_to_favorites(&self, song: &Song) -> Result<(), ApiError>;

    async fn remove_from_favorites(&self, song: &Song) -> Result<(), ApiError>;

    async fn is_favorite(&self, song: &Song) -> Result<bool, ApiError>;

    async fn add_song_to_playlist(&self, playlist_id: i64, song: &Song) -> Result<(), ApiError>;

    /// Replace every stored copy of `original` with `updated`
    async fn update_song_metadata(&self, original: &Song, updated: &Song) -> Result<(), ApiError>;
}

#[derive(Debug, Default)]
struct Lists {
    favorites: Vec<Song>,
    playlists: HashMap<i64, Vec<Song>>,
}

/// Playlist store kept in memory, for tools and tests
#[derive(Debug, Default)]
pub struct MemoryPlaylistStore {
    lists: Mutex<Lists>,
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty custom playlist
    pub fn create_playlist(&self, playlist_id: i64) -> Result<(), ApiError> {
        self.with_lists(|lists| {
            lists.playlists.entry(playlist_id).or_default();
            Ok(())
        })
    }

    pub fn favorites(&self) -> Result<Vec<Song>, ApiError> {
        self.with_lists(|lists| Ok(lists.favorites.clone()))
    }

    pub fn playlist(&self, playlist_id: i64) -> Result<Vec<Song>, ApiError> {
        self.with_lists(|lists| Ok(lists.playlists.get(&playlist_id).cloned().unwrap_or_default()))
    }

    fn with_lists<T>(
        &self,
        f: impl FnOnce(&mut Lists) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|_| ApiError::Storage("playlist store lock poisoned".to_string()))?;
        f(&mut lists)
    }
}

#[async_trait]
impl LocalPlaylistStore for MemoryPlaylistStore {
    async fn add_to_favorites(&self, song: &Song) -> Result<(), ApiError> {
        self.with_lists(|lists| {
            if !lists.favorites.iter().any(|s| s.same_track(song)) {
                lists.favorites.push(song.clone());
            }
            Ok(())
        })
    }

    async fn remove_from_favorites(&self, song: &Song) -> Result<(), ApiError> {
        self.with_lists(|lists| {
            lists.favorites.retain(|s| !s.same_track(song));
            Ok(())
        })
    }

    async fn is_favorite(&self, song: &Song) -> Result<bool, ApiError> {
        self.with_lists(|lists| Ok(lists.favorites.iter().any(|s| s.same_track(song))))
    }

    async fn add_song_to_playlist(&self, playlist_id: i64, song: &Song) -> Result<(), ApiError> {
        self.with_lists(|lists| {
            let playlist = lists
                .playlists
                .get_mut(&playlist_id)
                .ok_or_else(|| ApiError::Storage(format!("playlist {} not found", playlist_id)))?;
            if !playlist.iter().any(|s| s.same_track(song)) {
                playlist.push(song.clone());
            }
            Ok(())
        })
    }

    async fn update_song_metadata(&self, original: &Song, updated: &Song) -> Result<(), ApiError> {
        self.with_lists(|lists| {
            let all = lists
                .playlists
                .values_mut()
                .flatten()
                .chain(lists.favorites.iter_mut());
            for song in all.filter(|s| s.same_track(original)) {
                *song = updated.clone();
            }
            Ok(())
        })
    }
}
