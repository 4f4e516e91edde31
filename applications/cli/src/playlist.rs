//! Playlist files
//!
//! Either a plain JSON array of songs or a saved playback state
//! (`{"playlist": [...], "index": 2}`).

use crate::error::{CliError, Result};
use neri_core::Song;
use neri_playback::PersistedState;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum PlaylistFile {
    Saved(PersistedState),
    Songs(Vec<Song>),
}

/// Songs plus the index to start from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub songs: Vec<Song>,
    pub start: usize,
}

impl Playlist {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json).map_err(|reason| CliError::Playlist {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(json: &str) -> std::result::Result<Self, String> {
        let file: PlaylistFile = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(match file {
            PlaylistFile::Saved(saved) => {
                let start = usize::try_from(saved.index).unwrap_or(0);
                Self {
                    songs: saved.playlist,
                    start,
                }
            }
            PlaylistFile::Songs(songs) => Self { songs, start: 0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neri_core::SongSource;

    #[test]
    fn parses_song_array() {
        let json = r#"[
            {"id": 1, "name": "A", "artist": "X", "source": {"platform": "netease"}},
            {"id": 2, "name": "B", "artist": "Y", "source": {"platform": "bilibili", "cid": 7}}
        ]"#;
        let playlist = Playlist::parse(json).unwrap();
        assert_eq!(playlist.start, 0);
        assert_eq!(playlist.songs.len(), 2);
        assert_eq!(playlist.songs[1].source, SongSource::Bilibili { cid: Some(7) });
    }

    #[test]
    fn parses_saved_state() {
        let json = r#"{"playlist": [{"id": 1, "name": "A", "artist": "X", "source": {"platform": "netease"}}], "index": -1}"#;
        let playlist = Playlist::parse(json).unwrap();
        assert_eq!(playlist.start, 0);
        assert_eq!(playlist.songs[0].id, 1);
    }

    #[test]
    fn reports_path_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            Playlist::load(&path),
            Err(CliError::Playlist { .. })
        ));
    }
}
