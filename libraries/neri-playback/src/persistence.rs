//! Queue persistence
//!
//! The queue and current index are written to a small JSON file so the next
//! launch can pick up where the user left off:
//!
//! ```json
//! {"playlist": [{"id": 1, "name": "...", "source": {"platform": "netease"}}], "index": 0}
//! ```
//!
//! Writes go through [`PersistWriter`]: a single background task that only
//! ever writes the newest submitted state. An older snapshot can never land
//! on disk after a newer one.

use crate::error::Result;
use neri_core::Song;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What is written to the state file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub playlist: Vec<Song>,

    /// Current index, `-1` when nothing is selected
    pub index: i64,
}

impl PersistedState {
    pub fn new(playlist: Vec<Song>, current: Option<usize>) -> Self {
        let index = current
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1);
        Self { playlist, index }
    }
}

/// JSON state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved state
    ///
    /// A missing file is `Ok(None)`. An unreadable or corrupt file is an
    /// error; callers usually log it and start empty.
    pub fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let state: PersistedState = serde_json::from_str(&json)?;
        Ok(Some(state))
    }

    /// Write the state; an empty playlist deletes the file instead
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if state.playlist.is_empty() {
            return self.delete();
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves half a file behind
        let json = serde_json::to_string(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Background writer keeping only the latest submitted state
pub struct PersistWriter {
    latest: watch::Sender<Option<PersistedState>>,
    task: JoinHandle<()>,
}

impl PersistWriter {
    /// Spawn the writer task on the current runtime
    pub fn spawn(store: StateStore) -> Self {
        let (latest, mut rx) = watch::channel::<Option<PersistedState>>(None);

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(state) = rx.borrow_and_update().clone() else {
                    continue;
                };
                let store = store.clone();
                let written = tokio::task::spawn_blocking(move || store.save(&state)).await;
                match written {
                    Ok(Ok(())) => tracing::trace!("Playback state saved"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "Failed to save playback state"),
                    Err(e) => tracing::warn!(error = %e, "Playback state writer panicked"),
                }
            }
        });

        Self { latest, task }
    }

    /// Queue a state for writing, replacing any not yet written
    pub fn submit(&self, state: PersistedState) {
        self.latest.send_replace(Some(state));
    }

    /// Flush the last submitted state and stop the task
    pub async fn close(self) {
        drop(self.latest);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Playback state writer ended abnormally");
        }
    }
}
