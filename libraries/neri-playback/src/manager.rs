//! Playback manager - core orchestration
//!
//! Coordinates the navigator, URL resolution, the media player, persistence
//! and the failure counter. The manager runs as a single tokio task and owns
//! all mutable playback state; callers talk to it through a cloneable
//! [`PlayerHandle`].
//!
//! ```text
//!  PlayerHandle ──command + ack──▶ PlayerManager ──load/play──▶ MediaPlayer
//!       ▲                             │     ▲
//!       │ watch: snapshot, position   │     │ resolved (generation-tagged)
//!       │ broadcast: events           │     │
//!       └─────────────────────────────┘   resolve task ──▶ SongResolver
//! ```
//!
//! Every navigation bumps a generation counter and aborts the in-flight
//! resolve. A result carrying an older generation is dropped, so a slow
//! resolve can never start a song the user has already skipped.

use crate::{
    error::{ApiError, PlaybackError, Result},
    events::{PlayerEvent, PlayerSnapshot},
    library::LocalPlaylistStore,
    navigator::{Navigator, Step},
    persistence::{PersistWriter, PersistedState, StateStore},
    platform::{BiliVideoInfo, BiliVideoItem},
    player::MediaPlayer,
    resolver::{ResolveOutcome, SongResolver},
    settings::SettingsStore,
    types::{MediaItem, PlaybackConfig, PlaybackState, PlayerErrorKind, RepeatMode},
};
use neri_core::{MatchedMetadata, Song};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Buffered commands before senders wait
const COMMAND_CAPACITY: usize = 64;

/// Events kept for slow subscribers before they start lagging
pub const EVENT_CAPACITY: usize = 64;

/// Floor for the position polling period
const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(1);

/// Create the event channel shared by the resolver and the manager
pub fn event_channel() -> broadcast::Sender<PlayerEvent> {
    broadcast::channel(EVENT_CAPACITY).0
}

/// Collaborators the manager drives
pub struct PlayerDeps {
    pub resolver: Arc<dyn SongResolver>,
    pub player: Arc<dyn MediaPlayer>,
    pub settings: Arc<dyn SettingsStore>,
    pub playlists: Arc<dyn LocalPlaylistStore>,
    /// Also given to the resolver, see [`event_channel`]
    pub events: broadcast::Sender<PlayerEvent>,
}

type Reply<T = ()> = oneshot::Sender<Result<T>>;

enum Command {
    PlayPlaylist {
        songs: Vec<Song>,
        start: usize,
        reply: Reply,
    },
    Play(Reply),
    Pause(Reply),
    TogglePlayPause(Reply),
    Seek {
        position: Duration,
        reply: Reply,
    },
    Next(Reply),
    Previous(Reply),
    PlayFromQueue {
        index: usize,
        reply: Reply,
    },
    AddToQueueNext {
        song: Song,
        reply: Reply,
    },
    AddToQueueEnd {
        song: Song,
        reply: Reply,
    },
    SetShuffle {
        enabled: bool,
        reply: Reply,
    },
    SetRepeat {
        mode: RepeatMode,
        reply: Reply,
    },
    CycleRepeat(Reply<RepeatMode>),
    TrackEnded(Reply),
    PlayerError {
        kind: PlayerErrorKind,
        reply: Reply,
    },
    AddCurrentToFavorites(Reply),
    RemoveCurrentFromFavorites(Reply),
    ToggleCurrentFavorite(Reply),
    AddCurrentToPlaylist {
        playlist_id: i64,
        reply: Reply,
    },
    ApplyMatchedMetadata {
        original: Song,
        matched: Box<MatchedMetadata>,
        reply: Reply,
    },
    UpdateLyricOffset {
        song: Song,
        offset_ms: i64,
        reply: Reply,
    },
    Release(Reply),
}

/// Result of a resolve task
struct Resolved {
    generation: u64,
    song: Song,
    outcome: ResolveOutcome,
}

fn respond<T>(reply: Reply<T>, result: Result<T>) {
    // The caller may have stopped waiting
    let _ = reply.send(result);
}

/// Playback manager
///
/// Created with [`PlayerManager::spawn`]; only reachable through the
/// returned [`PlayerHandle`].
pub struct PlayerManager {
    config: PlaybackConfig,
    deps: PlayerDeps,
    nav: Navigator,
    state: PlaybackState,

    /// Songs in a row that could not be played
    failures: u32,

    /// URL loaded into the player for the current song
    media_url: Option<String>,

    generation: u64,
    resolve_task: Option<JoinHandle<()>>,
    progress_task: Option<JoinHandle<()>>,
    persist: Option<PersistWriter>,

    resolved_tx: mpsc::UnboundedSender<Resolved>,
    snapshot: watch::Sender<PlayerSnapshot>,
    position: Arc<watch::Sender<Duration>>,
}

impl PlayerManager {
    /// Start the manager on the current tokio runtime
    ///
    /// When a state file is configured, the saved queue is restored
    /// (without starting playback).
    pub fn spawn(config: PlaybackConfig, deps: PlayerDeps) -> PlayerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(PlayerSnapshot::default());
        let (position_tx, position_rx) = watch::channel(Duration::ZERO);
        let events = deps.events.clone();

        let store = config.state_file.clone().map(StateStore::new);
        let persist = store.clone().map(PersistWriter::spawn);

        let mut manager = Self {
            nav: Navigator::new(config.shuffle_seed),
            config,
            deps,
            state: PlaybackState::Idle,
            failures: 0,
            media_url: None,
            generation: 0,
            resolve_task: None,
            progress_task: None,
            persist,
            resolved_tx,
            snapshot: snapshot_tx,
            position: Arc::new(position_tx),
        };

        if let Some(store) = &store {
            manager.restore(store);
        }
        manager.publish();

        tokio::spawn(manager.run(commands_rx, resolved_rx));

        PlayerHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            position: position_rx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut resolved: mpsc::UnboundedReceiver<Resolved>,
    ) {
        tracing::debug!("Playback manager started");
        loop {
            tokio::select! {
                Some(done) = resolved.recv() => self.on_resolved(done),
                command = commands.recv() => {
                    let Some(command) = command else {
                        // Every handle is gone
                        self.shutdown().await;
                        break;
                    };
                    if self.handle(command).await.is_break() {
                        break;
                    }
                }
            }
        }
    }

    async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::PlayPlaylist {
                songs,
                start,
                reply,
            } => respond(reply, self.play_playlist(songs, start)),
            Command::Play(reply) => respond(reply, self.play()),
            Command::Pause(reply) => {
                self.pause();
                respond(reply, Ok(()));
            }
            Command::TogglePlayPause(reply) => {
                let result = if matches!(self.state, PlaybackState::Playing | PlaybackState::Resolving) {
                    self.pause();
                    Ok(())
                } else {
                    self.play()
                };
                respond(reply, result);
            }
            Command::Seek { position, reply } => {
                self.deps.player.seek(position);
                self.position.send_replace(position);
                respond(reply, Ok(()));
            }
            Command::Next(reply) => {
                let step = self.nav.next(false);
                respond(reply, self.apply(step));
            }
            Command::Previous(reply) => {
                let step = self.nav.previous();
                respond(reply, self.apply(step));
            }
            Command::PlayFromQueue { index, reply } => respond(reply, self.play_from_queue(index)),
            Command::AddToQueueNext { song, reply } => {
                respond(reply, self.add_to_queue(song, Navigator::insert_next));
            }
            Command::AddToQueueEnd { song, reply } => {
                respond(reply, self.add_to_queue(song, Navigator::append_end));
            }
            Command::SetShuffle { enabled, reply } => {
                if self.nav.set_shuffle(enabled) {
                    tracing::info!(enabled, "Shuffle changed");
                    self.publish();
                }
                respond(reply, Ok(()));
            }
            Command::SetRepeat { mode, reply } => {
                self.set_repeat(mode);
                respond(reply, Ok(()));
            }
            Command::CycleRepeat(reply) => {
                let mode = self.nav.repeat().cycle();
                self.set_repeat(mode);
                respond(reply, Ok(mode));
            }
            Command::TrackEnded(reply) => {
                if self.state != PlaybackState::Playing {
                    // Left over from a song already replaced or paused
                    tracing::debug!(state = ?self.state, "Ignoring track end");
                    respond(reply, Ok(()));
                    return ControlFlow::Continue(());
                }
                self.position.send_replace(Duration::ZERO);
                let step = self.nav.track_ended();
                respond(reply, self.apply(step));
            }
            Command::PlayerError { kind, reply } => {
                self.on_player_error(&kind);
                respond(reply, Ok(()));
            }
            Command::AddCurrentToFavorites(reply) => match self.current_song() {
                Ok(song) => self.spawn_store_op(reply, move |store| async move {
                    store.add_to_favorites(&song).await
                }),
                Err(e) => respond(reply, Err(e)),
            },
            Command::RemoveCurrentFromFavorites(reply) => match self.current_song() {
                Ok(song) => self.spawn_store_op(reply, move |store| async move {
                    store.remove_from_favorites(&song).await
                }),
                Err(e) => respond(reply, Err(e)),
            },
            Command::ToggleCurrentFavorite(reply) => match self.current_song() {
                Ok(song) => self.spawn_store_op(reply, move |store| async move {
                    if store.is_favorite(&song).await? {
                        store.remove_from_favorites(&song).await
                    } else {
                        store.add_to_favorites(&song).await
                    }
                }),
                Err(e) => respond(reply, Err(e)),
            },
            Command::AddCurrentToPlaylist { playlist_id, reply } => match self.current_song() {
                Ok(song) => self.spawn_store_op(reply, move |store| async move {
                    store.add_song_to_playlist(playlist_id, &song).await
                }),
                Err(e) => respond(reply, Err(e)),
            },
            Command::ApplyMatchedMetadata {
                original,
                matched,
                reply,
            } => {
                let updated = self.queued_copy(&original).with_matched(*matched);
                self.update_song(original, updated, reply);
            }
            Command::UpdateLyricOffset {
                song,
                offset_ms,
                reply,
            } => {
                let updated = self.queued_copy(&song).with_lyric_offset(offset_ms);
                self.update_song(song, updated, reply);
            }
            Command::Release(reply) => {
                self.shutdown().await;
                respond(reply, Ok(()));
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn restore(&mut self, store: &StateStore) {
        match store.load() {
            Ok(Some(saved)) => {
                tracing::info!(
                    songs = saved.playlist.len(),
                    index = saved.index,
                    "Restored playback queue"
                );
                self.nav.restore(saved.playlist, saved.index);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %store.path().display(), error = %e, "Ignoring unreadable playback state");
            }
        }
    }

    fn play_playlist(&mut self, songs: Vec<Song>, start: usize) -> Result<()> {
        if songs.is_empty() {
            tracing::warn!("Refusing to play an empty playlist");
            return Err(PlaybackError::EmptyPlaylist);
        }
        tracing::info!(songs = songs.len(), start, "Playing playlist");
        self.failures = 0;
        let step = self.nav.set_playlist(songs, start);
        self.apply(step)
    }

    fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Resolving => Ok(()),
            PlaybackState::Paused if self.media_url.is_some() && self.deps.player.is_loaded() => {
                self.deps.player.play();
                self.state = PlaybackState::Playing;
                self.start_progress();
                self.publish();
                Ok(())
            }
            _ => match self.nav.queue().current_index() {
                Some(index) => self.play_at(index),
                None => Ok(()),
            },
        }
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Resolving {
            self.cancel_resolve();
        }
        self.deps.player.pause();
        self.stop_progress();
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Resolving) {
            self.state = PlaybackState::Paused;
        }
        self.publish();
    }

    fn play_from_queue(&mut self, index: usize) -> Result<()> {
        if self.nav.queue().is_empty() {
            return Ok(());
        }
        let step = self.nav.jump_to(index)?;
        self.apply(step)
    }

    fn add_to_queue(&mut self, song: Song, add: fn(&mut Navigator, Song)) -> Result<()> {
        if self.nav.queue().is_empty() {
            return self.play_playlist(vec![song], 0);
        }
        add(&mut self.nav, song);
        self.persist();
        self.publish();
        Ok(())
    }

    fn set_repeat(&mut self, mode: RepeatMode) {
        tracing::info!(?mode, "Repeat mode changed");
        self.nav.set_repeat(mode);
        self.publish();
    }

    fn apply(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Play(index) => self.play_at(index),
            Step::Stop => {
                self.stop_and_clear();
                Ok(())
            }
            Step::Stay => {
                self.publish();
                Ok(())
            }
        }
    }

    /// Resolve and play the song at `index` (already current in the queue)
    fn play_at(&mut self, index: usize) -> Result<()> {
        if self.failures >= self.config.max_consecutive_failures {
            let failures = self.failures;
            tracing::error!(failures, "Too many consecutive failures, stopping playback");
            self.emit(PlayerEvent::PlaybackHalted { failures });
            self.stop_and_clear();
            return Err(PlaybackError::ExceededFailureCap(failures));
        }
        let Some(song) = self.nav.queue().get(index).cloned() else {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.nav.queue().len(),
            });
        };

        self.cancel_resolve();
        self.stop_progress();
        // The previous song must not keep playing while this one resolves
        self.deps.player.pause();
        self.position.send_replace(Duration::ZERO);
        self.media_url = None;
        self.state = PlaybackState::Resolving;

        let generation = self.generation;
        tracing::debug!(index, song_id = song.id, source = %song.source, generation, "Resolving song");

        let resolver = Arc::clone(&self.deps.resolver);
        let resolved = self.resolved_tx.clone();
        self.resolve_task = Some(tokio::spawn(async move {
            let outcome = resolver.resolve(&song).await;
            let _ = resolved.send(Resolved {
                generation,
                song,
                outcome,
            });
        }));

        self.persist();
        self.publish();
        Ok(())
    }

    fn on_resolved(&mut self, resolved: Resolved) {
        if resolved.generation != self.generation {
            tracing::debug!(
                generation = resolved.generation,
                current = self.generation,
                "Dropping superseded resolve result"
            );
            return;
        }
        self.resolve_task = None;

        let Resolved { song, outcome, .. } = resolved;
        match outcome {
            ResolveOutcome::Success(url) => self.start_playback(&song, url),
            ResolveOutcome::RequiresLogin => {
                tracing::warn!(song_id = song.id, "Login required, skipping song");
                self.emit(PlayerEvent::ShowLoginPrompt {
                    message: "Log in to play this song".to_string(),
                });
                self.skip_failed();
            }
            ResolveOutcome::Failure => {
                self.failures += 1;
                tracing::warn!(song_id = song.id, failures = self.failures, "Could not resolve song, skipping");
                self.skip_failed();
            }
        }
    }

    fn start_playback(&mut self, song: &Song, url: String) {
        self.failures = 0;
        let cache_key = song.cache_key(&self.deps.settings.quality());
        tracing::info!(song_id = song.id, name = %song.name, %cache_key, "Starting playback");

        self.deps.player.load(MediaItem {
            media_id: song.id.to_string(),
            url: url.clone(),
            cache_key,
        });
        self.deps.player.play();

        self.media_url = Some(url);
        self.state = PlaybackState::Playing;
        self.start_progress();
        self.publish();
    }

    fn skip_failed(&mut self) {
        let step = self.nav.next(false);
        if let Err(e) = self.apply(step) {
            tracing::debug!(error = %e, "Stopped while skipping a failed song");
        }
    }

    fn on_player_error(&mut self, kind: &PlayerErrorKind) {
        self.failures += 1;
        tracing::error!(?kind, failures = self.failures, "Media player error");
        self.emit(PlayerEvent::ShowError {
            message: kind.user_message(),
        });
        // Playing again resolves a fresh URL
        self.media_url = None;
        self.pause();
    }

    fn stop_and_clear(&mut self) {
        tracing::info!("Stopping playback and clearing the queue");
        self.cancel_resolve();
        self.stop_progress();
        self.deps.player.stop();
        self.nav.clear();
        self.failures = 0;
        self.media_url = None;
        self.state = PlaybackState::Stopped;
        self.position.send_replace(Duration::ZERO);
        self.persist();
        self.publish();
    }

    /// Stop everything and flush the state file; the saved queue stays
    async fn shutdown(&mut self) {
        self.cancel_resolve();
        self.stop_progress();
        self.deps.player.stop();
        self.nav.clear();
        self.failures = 0;
        self.media_url = None;
        self.state = PlaybackState::Idle;
        self.publish();

        if let Some(writer) = self.persist.take() {
            writer.close().await;
        }
        tracing::info!("Playback manager released");
    }

    fn current_song(&self) -> Result<Song> {
        self.nav
            .queue()
            .current_song()
            .cloned()
            .ok_or(PlaybackError::NoCurrentSong)
    }

    /// The queued copy of `song`, or `song` itself when not queued
    fn queued_copy(&self, song: &Song) -> Song {
        let queue = self.nav.queue();
        queue
            .position_of(song)
            .and_then(|i| queue.get(i))
            .unwrap_or(song)
            .clone()
    }

    fn update_song(&mut self, original: Song, updated: Song, reply: Reply) {
        if self.nav.replace_song(&original, updated.clone()).is_some() {
            self.persist();
            self.publish();
        }
        self.spawn_store_op(reply, move |store| async move {
            store.update_song_metadata(&original, &updated).await
        });
    }

    /// Run a playlist store call off the manager task; the reply is sent
    /// once it finishes
    fn spawn_store_op<F, Fut>(&self, reply: Reply, op: F)
    where
        F: FnOnce(Arc<dyn LocalPlaylistStore>) -> Fut,
        Fut: Future<Output = std::result::Result<(), ApiError>> + Send + 'static,
    {
        let pending = op(Arc::clone(&self.deps.playlists));
        tokio::spawn(async move {
            let result = pending.await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Playlist store update failed");
            }
            respond(reply, result.map_err(PlaybackError::from));
        });
    }

    /// Abort the in-flight resolve and invalidate its result
    fn cancel_resolve(&mut self) {
        self.generation += 1;
        if let Some(task) = self.resolve_task.take() {
            task.abort();
        }
    }

    fn start_progress(&mut self) {
        self.stop_progress();
        let player = Arc::clone(&self.deps.player);
        let position = Arc::clone(&self.position);
        let period = self.config.progress_interval.max(MIN_PROGRESS_INTERVAL);

        self.progress_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                position.send_replace(player.position());
            }
        }));
    }

    fn stop_progress(&mut self) {
        if let Some(task) = self.progress_task.take() {
            task.abort();
        }
    }

    fn persist(&self) {
        if let Some(writer) = &self.persist {
            let queue = self.nav.queue();
            writer.submit(PersistedState::new(
                queue.songs().to_vec(),
                queue.current_index(),
            ));
        }
    }

    fn publish(&self) {
        let queue = self.nav.queue();
        self.snapshot.send_replace(PlayerSnapshot {
            state: self.state,
            queue: queue.songs().to_vec(),
            current_index: queue.current_index(),
            current_song: queue.current_song().cloned(),
            shuffle_enabled: self.nav.is_shuffle_enabled(),
            repeat_mode: self.nav.repeat(),
            media_url: self.media_url.clone(),
        });
    }

    fn emit(&self, event: PlayerEvent) {
        let _ = self.deps.events.send(event);
    }
}

/// Cloneable access to a running [`PlayerManager`]
///
/// Commands are acknowledged once the manager has applied them; song
/// resolution continues in the background and shows up in the snapshot.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<PlayerSnapshot>,
    position: watch::Receiver<Duration>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PlaybackError::ManagerClosed)?;
        response.await.map_err(|_| PlaybackError::ManagerClosed)?
    }

    /// Replace the queue and start playing at `start` (clamped)
    pub async fn play_playlist(&self, songs: Vec<Song>, start: usize) -> Result<()> {
        self.request(|reply| Command::PlayPlaylist {
            songs,
            start,
            reply,
        })
        .await
    }

    /// Play every page of a Bilibili video as its own song
    pub async fn play_bili_video_parts(
        &self,
        info: &BiliVideoInfo,
        start: usize,
        cover_url: &str,
    ) -> Result<()> {
        self.play_playlist(info.part_songs(cover_url), start).await
    }

    /// Play a list of Bilibili videos, one song per video
    pub async fn play_bili_videos(&self, videos: &[BiliVideoItem], start: usize) -> Result<()> {
        let songs = videos.iter().map(BiliVideoItem::to_song).collect();
        self.play_playlist(songs, start).await
    }

    /// Resume, or start the current song when nothing is loaded
    pub async fn play(&self) -> Result<()> {
        self.request(Command::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(Command::TogglePlayPause).await
    }

    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.request(|reply| Command::Seek { position, reply }).await
    }

    /// Skip forward; at the end of the queue without repeat this stops
    pub async fn next(&self) -> Result<()> {
        self.request(Command::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.request(Command::Previous).await
    }

    pub async fn play_from_queue(&self, index: usize) -> Result<()> {
        self.request(|reply| Command::PlayFromQueue { index, reply })
            .await
    }

    /// Queue a song right after the current one
    pub async fn add_to_queue_next(&self, song: Song) -> Result<()> {
        self.request(|reply| Command::AddToQueueNext { song, reply })
            .await
    }

    /// Queue a song at the end
    pub async fn add_to_queue_end(&self, song: Song) -> Result<()> {
        self.request(|reply| Command::AddToQueueEnd { song, reply })
            .await
    }

    pub async fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.request(|reply| Command::SetShuffle { enabled, reply })
            .await
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.request(|reply| Command::SetRepeat { mode, reply })
            .await
    }

    /// Off -> All -> One -> Off; returns the new mode
    pub async fn cycle_repeat_mode(&self) -> Result<RepeatMode> {
        self.request(Command::CycleRepeat).await
    }

    /// Reported by the media player when the current song finished
    pub async fn track_ended(&self) -> Result<()> {
        self.request(Command::TrackEnded).await
    }

    /// Reported by the media player when playback failed
    pub async fn report_player_error(&self, kind: PlayerErrorKind) -> Result<()> {
        self.request(|reply| Command::PlayerError { kind, reply })
            .await
    }

    pub async fn add_current_to_favorites(&self) -> Result<()> {
        self.request(Command::AddCurrentToFavorites).await
    }

    pub async fn remove_current_from_favorites(&self) -> Result<()> {
        self.request(Command::RemoveCurrentFromFavorites).await
    }

    pub async fn toggle_current_favorite(&self) -> Result<()> {
        self.request(Command::ToggleCurrentFavorite).await
    }

    pub async fn add_current_to_playlist(&self, playlist_id: i64) -> Result<()> {
        self.request(|reply| Command::AddCurrentToPlaylist { playlist_id, reply })
            .await
    }

    /// Replace a song's metadata with a match picked by the user
    ///
    /// Updates the queue, the state file and every stored playlist copy.
    pub async fn apply_matched_metadata(
        &self,
        original: Song,
        matched: MatchedMetadata,
    ) -> Result<()> {
        self.request(|reply| Command::ApplyMatchedMetadata {
            original,
            matched: Box::new(matched),
            reply,
        })
        .await
    }

    pub async fn update_user_lyric_offset(&self, song: Song, offset_ms: i64) -> Result<()> {
        self.request(|reply| Command::UpdateLyricOffset {
            song,
            offset_ms,
            reply,
        })
        .await
    }

    /// Stop playback and shut the manager down
    ///
    /// The saved queue is flushed and kept for the next launch. Every
    /// handle fails with [`PlaybackError::ManagerClosed`] afterwards.
    pub async fn release(&self) -> Result<()> {
        self.request(Command::Release).await
    }

    /// Latest playback state
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.clone()
    }

    /// Last polled playback position
    pub fn position(&self) -> Duration {
        *self.position.borrow()
    }

    pub fn watch_position(&self) -> watch::Receiver<Duration> {
        self.position.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}
