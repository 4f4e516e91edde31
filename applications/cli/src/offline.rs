//! Platform clients for running without network access
//!
//! Every call fails, so only downloaded songs resolve.

use async_trait::async_trait;
use neri_core::{BiliQuality, NeteaseQuality};
use neri_playback::{ApiError, BiliApi, BiliAudioStream, BiliVideoInfo, NeteaseApi};

const OFFLINE: &str = "offline mode, no platform client configured";

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetease;

#[async_trait]
impl NeteaseApi for OfflineNetease {
    async fn song_url(&self, song_id: i64, quality: NeteaseQuality) -> Result<String, ApiError> {
        tracing::debug!(song_id, %quality, "NetEase request skipped");
        Err(ApiError::Network(OFFLINE.to_string()))
    }

    async fn lyric(&self, song_id: i64) -> Result<String, ApiError> {
        tracing::debug!(song_id, "NetEase lyric request skipped");
        Err(ApiError::Network(OFFLINE.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBili;

#[async_trait]
impl BiliApi for OfflineBili {
    async fn video_info(&self, avid: i64) -> Result<BiliVideoInfo, ApiError> {
        tracing::debug!(avid, "Bilibili request skipped");
        Err(ApiError::Network(OFFLINE.to_string()))
    }

    async fn best_audio(
        &self,
        _bvid: &str,
        _cid: i64,
        _quality: BiliQuality,
    ) -> Result<Option<BiliAudioStream>, ApiError> {
        Err(ApiError::Network(OFFLINE.to_string()))
    }
}
