//! Dry-run playback
//!
//! Runs a playlist through the real playback manager with a media player
//! that only keeps time. Songs are resolved against the download directory;
//! platform requests fail, which exercises the skip and halt paths.

use crate::config::NeriConfig;
use crate::error::Result;
use crate::offline::{OfflineBili, OfflineNetease};
use neri_core::Song;
use neri_playback::{
    event_channel, DirectoryLibrary, MediaItem, MediaPlayer, MemoryPlaylistStore, PlatformResolver,
    PlaybackState, PlayerDeps, PlayerEvent, PlayerManager, RepeatMode, SharedSettings,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Clock {
    item: Option<MediaItem>,
    started: Option<Instant>,
    offset: Duration,
}

impl Clock {
    fn position(&self) -> Duration {
        self.offset + self.started.map_or(Duration::ZERO, |s| s.elapsed())
    }
}

/// Media player that logs calls and tracks a virtual position
#[derive(Debug, Default)]
pub struct DryRunPlayer {
    clock: Mutex<Clock>,
}

impl DryRunPlayer {
    fn clock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaPlayer for DryRunPlayer {
    fn load(&self, item: MediaItem) {
        tracing::info!(url = %item.url, cache_key = %item.cache_key, "Loaded media");
        let mut clock = self.clock();
        clock.item = Some(item);
        clock.started = None;
        clock.offset = Duration::ZERO;
    }

    fn play(&self) {
        let mut clock = self.clock();
        if clock.started.is_none() {
            clock.started = Some(Instant::now());
        }
    }

    fn pause(&self) {
        let mut clock = self.clock();
        clock.offset = clock.position();
        clock.started = None;
    }

    fn stop(&self) {
        *self.clock() = Clock::default();
    }

    fn seek(&self, position: Duration) {
        let mut clock = self.clock();
        clock.offset = position;
        if clock.started.is_some() {
            clock.started = Some(Instant::now());
        }
    }

    fn position(&self) -> Duration {
        self.clock().position()
    }

    fn is_loaded(&self) -> bool {
        self.clock().item.is_some()
    }
}

/// How to drive the simulated session
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub start: usize,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Virtual length of every song
    pub track_duration: Duration,
    /// Stop after this many songs started playing
    pub max_tracks: usize,
}

/// What happened during a simulated session
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    /// Songs in the order they started playing
    pub played: Vec<Song>,
    pub events: Vec<PlayerEvent>,
    pub final_state: PlaybackState,
}

/// Play `songs` until the queue stops or `max_tracks` songs have played
pub async fn run(
    config: &NeriConfig,
    songs: Vec<Song>,
    options: &SimulationOptions,
) -> Result<SimulationReport> {
    let events = event_channel();
    let settings = Arc::new(SharedSettings::new(config.quality));
    let resolver = PlatformResolver::new(
        Arc::new(DirectoryLibrary::new(&config.library.download_dir)),
        Arc::new(OfflineNetease),
        Arc::new(OfflineBili),
        settings.clone(),
        events.clone(),
    );

    let handle = PlayerManager::spawn(
        config.playback_config(),
        PlayerDeps {
            resolver: Arc::new(resolver),
            player: Arc::new(DryRunPlayer::default()),
            settings,
            playlists: Arc::new(MemoryPlaylistStore::new()),
            events: events.clone(),
        },
    );

    let mut subscription = handle.subscribe();
    // Closed once the manager is released and this sender is gone
    drop(events);
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    tracing::info!(?event, "Player event");
                    seen.push(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed player events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    });

    handle.set_shuffle(options.shuffle).await?;
    handle.set_repeat_mode(options.repeat).await?;
    handle.play_playlist(songs, options.start).await?;

    let mut snapshots = handle.watch_snapshot();
    let mut played = Vec::new();
    let final_state = loop {
        let snapshot = match snapshots
            .wait_for(|s| matches!(s.state, PlaybackState::Playing | PlaybackState::Stopped))
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => break PlaybackState::Idle,
        };
        if snapshot.state == PlaybackState::Stopped {
            break PlaybackState::Stopped;
        }

        if let Some(song) = snapshot.current_song {
            tracing::info!(song_id = song.id, name = %song.name, "Now playing");
            played.push(song);
        }
        if played.len() >= options.max_tracks {
            break snapshot.state;
        }

        tokio::time::sleep(options.track_duration).await;
        handle.track_ended().await?;
    };

    handle.release().await?;
    drop(handle);
    let events = collector.await.unwrap_or_default();

    Ok(SimulationReport {
        played,
        events,
        final_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use neri_core::SongSource;

    fn config_with_downloads(dir: &std::path::Path) -> NeriConfig {
        let mut config = NeriConfig::default();
        config.library.download_dir = dir.to_path_buf();
        config.playback.shuffle_seed = Some(3);
        config
    }

    fn options(max_tracks: usize) -> SimulationOptions {
        SimulationOptions {
            start: 0,
            shuffle: false,
            repeat: RepeatMode::Off,
            track_duration: Duration::from_millis(5),
            max_tracks,
        }
    }

    #[tokio::test]
    async fn downloaded_songs_play_and_missing_ones_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("netease-1.mp3"), b"a").unwrap();
        std::fs::write(dir.path().join("bili-3-9.m4a"), b"b").unwrap();

        let songs = vec![
            Song::new(1, "One", "A", SongSource::Netease),
            Song::new(2, "Two", "A", SongSource::Netease),
            Song::new(3, "Three", "B", SongSource::Bilibili { cid: Some(9) }),
        ];

        let report = run(&config_with_downloads(dir.path()), songs, &options(10))
            .await
            .unwrap();

        let ids: Vec<i64> = report.played.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(report.final_state, PlaybackState::Stopped);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, PlayerEvent::ShowError { .. })));
    }

    #[tokio::test]
    async fn nothing_downloaded_halts_after_failure_cap() {
        let dir = tempfile::tempdir().unwrap();
        let songs = (0..15)
            .map(|id| Song::new(id, "Missing", "A", SongSource::Netease))
            .collect();

        let report = run(&config_with_downloads(dir.path()), songs, &options(10))
            .await
            .unwrap();

        assert!(report.played.is_empty());
        assert!(report
            .events
            .contains(&PlayerEvent::PlaybackHalted { failures: 10 }));
    }

    #[tokio::test]
    async fn repeat_one_is_bounded_by_max_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("netease-1.flac"), b"a").unwrap();
        let songs = vec![Song::new(1, "One", "A", SongSource::Netease)];

        let mut opts = options(3);
        opts.repeat = RepeatMode::One;
        let report = run(&config_with_downloads(dir.path()), songs, &opts)
            .await
            .unwrap();

        assert_eq!(report.played.len(), 3);
        assert_eq!(report.final_state, PlaybackState::Playing);
    }
}
