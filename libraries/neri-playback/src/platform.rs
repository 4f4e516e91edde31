//! Streaming platform clients
//!
//! The engine only needs a handful of calls from each platform. Concrete HTTP
//! clients live in the application; these traits are the seam.

use crate::error::ApiError;
use async_trait::async_trait;
use neri_core::{BiliQuality, NeteaseQuality, Song, SongSource};

/// NetEase Cloud Music endpoints used for playback
#[async_trait]
pub trait NeteaseApi: Send + Sync {
    /// Raw JSON body of the song URL endpoint
    ///
    /// Expected shape: `{"code": 200, "data": [{"url": "..."}]}` (`data` may
    /// also be a single object). `code` 301 means the user must log in.
    async fn song_url(&self, song_id: i64, quality: NeteaseQuality) -> Result<String, ApiError>;

    /// Raw JSON body of the lyric endpoint (`lrc.lyric`, `tlyric.lyric`)
    async fn lyric(&self, song_id: i64) -> Result<String, ApiError>;
}

/// Bilibili endpoints used for playback
#[async_trait]
pub trait BiliApi: Send + Sync {
    /// Basic video info by avid
    async fn video_info(&self, avid: i64) -> Result<BiliVideoInfo, ApiError>;

    /// Best playable audio stream of one page, `None` when nothing is playable
    async fn best_audio(
        &self,
        bvid: &str,
        cid: i64,
        quality: BiliQuality,
    ) -> Result<Option<BiliAudioStream>, ApiError>;
}

/// One page (part) of a Bilibili video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiliPage {
    pub cid: i64,
    /// Part title
    pub part: String,
    pub duration_sec: u64,
}

/// Basic info of a Bilibili video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiliVideoInfo {
    pub aid: i64,
    pub bvid: String,
    pub title: String,
    pub owner_name: String,
    pub pages: Vec<BiliPage>,
}

impl BiliVideoInfo {
    /// One song per page, all sharing the video's avid and cover
    pub fn part_songs(&self, cover_url: &str) -> Vec<Song> {
        self.pages
            .iter()
            .map(|page| {
                Song::new(
                    self.aid,
                    page.part.clone(),
                    self.owner_name.clone(),
                    SongSource::Bilibili {
                        cid: Some(page.cid),
                    },
                )
                .with_duration_ms(page.duration_sec * 1000)
                .with_cover_url(cover_url)
            })
            .collect()
    }
}

/// A Bilibili video listed in search results or favorites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiliVideoItem {
    /// avid
    pub id: i64,
    pub title: String,
    pub uploader: String,
    pub duration_sec: u64,
    pub cover_url: String,
}

impl BiliVideoItem {
    /// Song playing the video's first page
    pub fn to_song(&self) -> Song {
        Song::new(
            self.id,
            self.title.clone(),
            self.uploader.clone(),
            SongSource::Bilibili { cid: None },
        )
        .with_duration_ms(self.duration_sec * 1000)
        .with_cover_url(self.cover_url.clone())
    }
}

/// Playable audio stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiliAudioStream {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_become_part_songs() {
        let info = BiliVideoInfo {
            aid: 100,
            bvid: "BV1xx".to_string(),
            title: "Concert".to_string(),
            owner_name: "Uploader".to_string(),
            pages: vec![
                BiliPage {
                    cid: 1,
                    part: "Opening".to_string(),
                    duration_sec: 60,
                },
                BiliPage {
                    cid: 2,
                    part: "Encore".to_string(),
                    duration_sec: 90,
                },
            ],
        };

        let songs = info.part_songs("https://img/c.jpg");
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[1].id, 100);
        assert_eq!(songs[1].name, "Encore");
        assert_eq!(songs[1].artist, "Uploader");
        assert_eq!(songs[1].source, SongSource::Bilibili { cid: Some(2) });
        assert_eq!(songs[1].duration_ms, 90_000);
        assert_eq!(songs[1].cover_url.as_deref(), Some("https://img/c.jpg"));
    }

    #[test]
    fn video_item_plays_first_page() {
        let item = BiliVideoItem {
            id: 5,
            title: "Video".to_string(),
            uploader: "Up".to_string(),
            duration_sec: 3,
            cover_url: "c".to_string(),
        };
        let song = item.to_song();
        assert_eq!(song.source, SongSource::Bilibili { cid: None });
        assert_eq!(song.duration_ms, 3_000);
    }
}
