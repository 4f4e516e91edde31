//! Song URL resolution
//!
//! Turns a [`Song`] into something the media player can open:
//!
//! 1. A fully downloaded local file wins (`file://` URL, no network)
//! 2. NetEase: song URL endpoint with the configured quality
//! 3. Bilibili: page cid (looked up when missing), then the best audio stream
//!
//! Problems the user should see are emitted as [`PlayerEvent`]s; the caller
//! only learns the [`ResolveOutcome`].

use crate::error::ApiError;
use crate::events::PlayerEvent;
use crate::library::LocalLibrary;
use crate::platform::{BiliApi, NeteaseApi};
use crate::settings::SettingsStore;
use async_trait::async_trait;
use neri_core::{Song, SongSource};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

/// NetEase response code for "login required"
const NETEASE_CODE_LOGIN_REQUIRED: i64 = 301;
const NETEASE_CODE_OK: i64 = 200;

/// Result of resolving one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Playable URL
    Success(String),

    /// The platform wants a logged-in user for this song
    RequiresLogin,

    /// Nothing playable
    Failure,
}

/// Anything that can turn a song into a playable URL
#[async_trait]
pub trait SongResolver: Send + Sync {
    async fn resolve(&self, song: &Song) -> ResolveOutcome;
}

/// Resolver backed by the local library and the platform clients
pub struct PlatformResolver {
    library: Arc<dyn LocalLibrary>,
    netease: Arc<dyn NeteaseApi>,
    bili: Arc<dyn BiliApi>,
    settings: Arc<dyn SettingsStore>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlatformResolver {
    pub fn new(
        library: Arc<dyn LocalLibrary>,
        netease: Arc<dyn NeteaseApi>,
        bili: Arc<dyn BiliApi>,
        settings: Arc<dyn SettingsStore>,
        events: broadcast::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            library,
            netease,
            bili,
            settings,
            events,
        }
    }

    async fn resolve_netease(&self, song: &Song) -> ResolveOutcome {
        let quality = self.settings.quality().netease;
        match self.netease.song_url(song.id, quality).await {
            Ok(body) => self.interpret_netease(song, &body),
            Err(e) => {
                tracing::error!(song_id = song.id, error = %e, "NetEase song URL request failed");
                self.show_error(format!("Failed to get playback URL: {}", e));
                ResolveOutcome::Failure
            }
        }
    }

    fn interpret_netease(&self, song: &Song, body: &str) -> ResolveOutcome {
        let root: Value = match serde_json::from_str(body) {
            Ok(root) => root,
            Err(e) => {
                tracing::error!(song_id = song.id, error = %e, "Malformed NetEase response");
                self.show_error(format!("Failed to get playback URL: {}", e));
                return ResolveOutcome::Failure;
            }
        };

        let code = root.get("code").and_then(Value::as_i64).unwrap_or(0);
        match code {
            NETEASE_CODE_LOGIN_REQUIRED => {
                tracing::warn!(song_id = song.id, "NetEase requires login for this song");
                ResolveOutcome::RequiresLogin
            }
            NETEASE_CODE_OK => match netease_url(&root) {
                Some(url) => ResolveOutcome::Success(upgrade_to_https(url)),
                None => {
                    tracing::warn!(song_id = song.id, "NetEase returned no URL");
                    self.show_error("Playback URL is empty".to_string());
                    ResolveOutcome::Failure
                }
            },
            other => {
                tracing::warn!(song_id = song.id, code = other, "NetEase refused song URL");
                self.show_error(format!("Failed to get playback URL (code {})", other));
                ResolveOutcome::Failure
            }
        }
    }

    async fn resolve_bili(&self, song: &Song, cid: Option<i64>) -> ResolveOutcome {
        match self.bili_stream_url(song, cid).await {
            Ok(Some(url)) => ResolveOutcome::Success(url),
            Ok(None) => ResolveOutcome::Failure,
            Err(e) => {
                tracing::error!(avid = song.id, error = %e, "Bilibili resolution failed");
                self.show_error(format!("Failed to get playback URL: {}", e));
                ResolveOutcome::Failure
            }
        }
    }

    /// `Ok(None)` means the user was already told why
    async fn bili_stream_url(
        &self,
        song: &Song,
        cid: Option<i64>,
    ) -> Result<Option<String>, ApiError> {
        let info = self.bili.video_info(song.id).await?;

        let cid = match cid.or_else(|| info.pages.first().map(|p| p.cid)) {
            Some(cid) if cid != 0 => cid,
            _ => {
                tracing::warn!(avid = song.id, "Bilibili video has no playable page");
                self.show_error("Unable to get video info (cid)".to_string());
                return Ok(None);
            }
        };

        let quality = self.settings.quality().bilibili;
        let stream = self.bili.best_audio(&info.bvid, cid, quality).await?;
        match stream.filter(|s| !s.url.trim().is_empty()) {
            Some(stream) => {
                tracing::debug!(avid = song.id, cid, %quality, "Resolved Bilibili audio stream");
                Ok(Some(stream.url))
            }
            None => {
                tracing::warn!(avid = song.id, cid, "No playable Bilibili audio stream");
                self.show_error("Unable to get playback URL".to_string());
                Ok(None)
            }
        }
    }

    fn show_error(&self, message: String) {
        // No subscribers is fine: nobody is looking at the UI
        let _ = self.events.send(PlayerEvent::ShowError { message });
    }
}

#[async_trait]
impl SongResolver for PlatformResolver {
    async fn resolve(&self, song: &Song) -> ResolveOutcome {
        if let Some(path) = self.library.local_file(song) {
            tracing::debug!(song_id = song.id, path = %path.display(), "Playing downloaded file");
            return ResolveOutcome::Success(format!("file://{}", path.display()));
        }

        match song.source {
            SongSource::Netease => self.resolve_netease(song).await,
            SongSource::Bilibili { cid } => self.resolve_bili(song, cid).await,
        }
    }
}

/// `data.url` where `data` is an object or the first element of an array
fn netease_url(root: &Value) -> Option<&str> {
    let data = root.get("data")?;
    let data = match data {
        Value::Array(items) => items.first()?,
        _ => data,
    };
    data.get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.trim().is_empty())
}

fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{BiliAudioStream, BiliPage, BiliVideoInfo};
    use crate::settings::SharedSettings;
    use neri_core::{BiliQuality, NeteaseQuality};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLibrary {
        file: Option<PathBuf>,
    }

    impl LocalLibrary for FakeLibrary {
        fn local_file(&self, _song: &Song) -> Option<PathBuf> {
            self.file.clone()
        }

        fn lyric_file(&self, _song: &Song) -> Option<PathBuf> {
            None
        }
    }

    struct FakeNetease {
        body: String,
        requests: Mutex<Vec<(i64, NeteaseQuality)>>,
    }

    impl FakeNetease {
        fn answering(body: &str) -> Self {
            Self {
                body: body.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NeteaseApi for FakeNetease {
        async fn song_url(&self, song_id: i64, quality: NeteaseQuality) -> Result<String, ApiError> {
            self.requests.lock().unwrap().push((song_id, quality));
            Ok(self.body.clone())
        }

        async fn lyric(&self, _song_id: i64) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct FakeBili {
        pages: Vec<i64>,
        stream: Option<String>,
        fail: bool,
        audio_requests: Mutex<Vec<(String, i64, BiliQuality)>>,
    }

    #[async_trait]
    impl BiliApi for FakeBili {
        async fn video_info(&self, avid: i64) -> Result<BiliVideoInfo, ApiError> {
            if self.fail {
                return Err(ApiError::Network("timeout".to_string()));
            }
            Ok(BiliVideoInfo {
                aid: avid,
                bvid: format!("BV{}", avid),
                title: "Video".to_string(),
                owner_name: "Up".to_string(),
                pages: self
                    .pages
                    .iter()
                    .map(|cid| BiliPage {
                        cid: *cid,
                        part: format!("P{}", cid),
                        duration_sec: 10,
                    })
                    .collect(),
            })
        }

        async fn best_audio(
            &self,
            bvid: &str,
            cid: i64,
            quality: BiliQuality,
        ) -> Result<Option<BiliAudioStream>, ApiError> {
            self.audio_requests
                .lock()
                .unwrap()
                .push((bvid.to_string(), cid, quality));
            Ok(self.stream.clone().map(|url| BiliAudioStream { url }))
        }
    }

    struct Harness {
        resolver: PlatformResolver,
        netease: Arc<FakeNetease>,
        bili: Arc<FakeBili>,
        events: broadcast::Receiver<PlayerEvent>,
    }

    fn harness(library: FakeLibrary, netease: FakeNetease, bili: FakeBili) -> Harness {
        let (tx, events) = broadcast::channel(16);
        let netease = Arc::new(netease);
        let bili = Arc::new(bili);
        let settings = SharedSettings::default();
        settings.set_netease_quality(NeteaseQuality::Lossless);
        let resolver = PlatformResolver::new(
            Arc::new(library),
            netease.clone(),
            bili.clone(),
            Arc::new(settings),
            tx,
        );
        Harness {
            resolver,
            netease,
            bili,
            events,
        }
    }

    fn netease_song() -> Song {
        Song::new(1, "Song", "Artist", SongSource::Netease)
    }

    fn bili_song(cid: Option<i64>) -> Song {
        Song::new(170_001, "Video", "Up", SongSource::Bilibili { cid })
    }

    fn error_message(events: &mut broadcast::Receiver<PlayerEvent>) -> Option<String> {
        match events.try_recv() {
            Ok(PlayerEvent::ShowError { message }) => Some(message),
            _ => None,
        }
    }

    #[tokio::test]
    async fn local_file_skips_network() {
        let library = FakeLibrary {
            file: Some(PathBuf::from("/music/netease-1.flac")),
        };
        let h = harness(library, FakeNetease::answering("{}"), FakeBili::default());

        let outcome = h.resolver.resolve(&netease_song()).await;
        assert_eq!(
            outcome,
            ResolveOutcome::Success("file:///music/netease-1.flac".to_string())
        );
        assert!(h.netease.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn netease_array_url_is_upgraded_to_https() {
        let body = r#"{"code":200,"data":[{"id":1,"url":"http://m701.music.126.net/a.flac"}]}"#;
        let h = harness(FakeLibrary::default(), FakeNetease::answering(body), FakeBili::default());

        let outcome = h.resolver.resolve(&netease_song()).await;
        assert_eq!(
            outcome,
            ResolveOutcome::Success("https://m701.music.126.net/a.flac".to_string())
        );
        assert_eq!(
            h.netease.requests.lock().unwrap().as_slice(),
            &[(1, NeteaseQuality::Lossless)]
        );
    }

    #[tokio::test]
    async fn netease_object_url() {
        let body = r#"{"code":200,"data":{"url":"https://x/a.mp3"}}"#;
        let h = harness(FakeLibrary::default(), FakeNetease::answering(body), FakeBili::default());
        assert_eq!(
            h.resolver.resolve(&netease_song()).await,
            ResolveOutcome::Success("https://x/a.mp3".to_string())
        );
    }

    #[tokio::test]
    async fn netease_login_required() {
        let mut h = harness(
            FakeLibrary::default(),
            FakeNetease::answering(r#"{"code":301}"#),
            FakeBili::default(),
        );
        assert_eq!(
            h.resolver.resolve(&netease_song()).await,
            ResolveOutcome::RequiresLogin
        );
        assert!(error_message(&mut h.events).is_none());
    }

    #[tokio::test]
    async fn netease_blank_url_fails_with_message() {
        let body = r#"{"code":200,"data":[{"url":"  "}]}"#;
        let mut h = harness(FakeLibrary::default(), FakeNetease::answering(body), FakeBili::default());
        assert_eq!(h.resolver.resolve(&netease_song()).await, ResolveOutcome::Failure);
        assert_eq!(
            error_message(&mut h.events).as_deref(),
            Some("Playback URL is empty")
        );
    }

    #[tokio::test]
    async fn netease_other_code_reports_code() {
        let mut h = harness(
            FakeLibrary::default(),
            FakeNetease::answering(r#"{"code":404}"#),
            FakeBili::default(),
        );
        assert_eq!(h.resolver.resolve(&netease_song()).await, ResolveOutcome::Failure);
        assert!(error_message(&mut h.events).unwrap().contains("404"));
    }

    #[tokio::test]
    async fn bili_missing_cid_uses_first_page() {
        let bili = FakeBili {
            pages: vec![42, 43],
            stream: Some("https://upos/audio.m4s".to_string()),
            ..FakeBili::default()
        };
        let h = harness(FakeLibrary::default(), FakeNetease::answering("{}"), bili);

        assert_eq!(
            h.resolver.resolve(&bili_song(None)).await,
            ResolveOutcome::Success("https://upos/audio.m4s".to_string())
        );
        assert_eq!(
            h.bili.audio_requests.lock().unwrap().as_slice(),
            &[("BV170001".to_string(), 42, BiliQuality::High)]
        );
    }

    #[tokio::test]
    async fn bili_known_cid_is_kept() {
        let bili = FakeBili {
            pages: vec![42, 43],
            stream: Some("https://upos/p2.m4s".to_string()),
            ..FakeBili::default()
        };
        let h = harness(FakeLibrary::default(), FakeNetease::answering("{}"), bili);

        h.resolver.resolve(&bili_song(Some(43))).await;
        assert_eq!(h.bili.audio_requests.lock().unwrap()[0].1, 43);
    }

    #[tokio::test]
    async fn bili_without_pages_fails() {
        let mut h = harness(
            FakeLibrary::default(),
            FakeNetease::answering("{}"),
            FakeBili::default(),
        );
        assert_eq!(h.resolver.resolve(&bili_song(None)).await, ResolveOutcome::Failure);
        assert!(error_message(&mut h.events).unwrap().contains("cid"));
        assert!(h.bili.audio_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bili_without_stream_fails() {
        let bili = FakeBili {
            pages: vec![1],
            ..FakeBili::default()
        };
        let mut h = harness(FakeLibrary::default(), FakeNetease::answering("{}"), bili);
        assert_eq!(h.resolver.resolve(&bili_song(None)).await, ResolveOutcome::Failure);
        assert!(error_message(&mut h.events).is_some());
    }

    #[tokio::test]
    async fn bili_network_error_fails_with_message() {
        let bili = FakeBili {
            fail: true,
            ..FakeBili::default()
        };
        let mut h = harness(FakeLibrary::default(), FakeNetease::answering("{}"), bili);
        assert_eq!(h.resolver.resolve(&bili_song(Some(1))).await, ResolveOutcome::Failure);
        assert!(error_message(&mut h.events).unwrap().contains("timeout"));
    }
}
