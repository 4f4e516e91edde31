//! Queue navigation
//!
//! Combines the queue, the shuffle engine and the repeat mode into the
//! decisions "what plays next". Pure and synchronous: the manager turns each
//! [`Step`] into player and resolver work.

use crate::error::{PlaybackError, Result};
use crate::queue::Queue;
use crate::shuffle::{Advance, ShuffleState};
use crate::types::RepeatMode;
use neri_core::Song;

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Resolve and play this index (already made current)
    Play(usize),

    /// Nothing left to play: stop and clear the queue
    Stop,

    /// Nothing to do
    Stay,
}

/// Queue + shuffle + repeat
#[derive(Debug, Clone)]
pub struct Navigator {
    queue: Queue,
    shuffle: ShuffleState,
    shuffle_enabled: bool,
    repeat: RepeatMode,
}

impl Navigator {
    pub fn new(shuffle_seed: Option<u64>) -> Self {
        Self {
            queue: Queue::new(),
            shuffle: ShuffleState::new(shuffle_seed),
            shuffle_enabled: false,
            repeat: RepeatMode::Off,
        }
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn shuffle(&self) -> &ShuffleState {
        &self.shuffle
    }

    pub fn is_shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Turn shuffle on or off; returns whether anything changed
    ///
    /// Both directions drop history and future. Enabling fills a new bag
    /// without the current index.
    pub fn set_shuffle(&mut self, enabled: bool) -> bool {
        if self.shuffle_enabled == enabled {
            return false;
        }
        self.shuffle_enabled = enabled;
        if enabled {
            self.shuffle.reset(self.queue.len(), self.queue.current_index());
        } else {
            self.shuffle.clear();
        }
        true
    }

    /// Replace the queue; the start index is clamped
    pub fn set_playlist(&mut self, songs: Vec<Song>, start: usize) -> Step {
        let current = self.queue.set_playlist(songs, start);
        self.reset_shuffle();
        current.map_or(Step::Stay, Step::Play)
    }

    /// Load a persisted queue without starting playback
    pub fn restore(&mut self, songs: Vec<Song>, index: i64) {
        self.queue.restore(songs, index);
        self.reset_shuffle();
    }

    /// Forward step
    ///
    /// `force` allows wrapping around (or a new shuffle round) even when
    /// repeat is off.
    pub fn next(&mut self, force: bool) -> Step {
        if self.queue.is_empty() {
            return Step::Stay;
        }
        let wrap = force || self.repeat == RepeatMode::All;
        let current = self.queue.current_index();

        if self.shuffle_enabled {
            return match self.shuffle.advance(current, self.queue.len(), wrap) {
                Advance::Redo(index) | Advance::Picked(index) | Advance::Replay(index) => {
                    self.select(index)
                }
                Advance::Exhausted => Step::Stop,
            };
        }

        match (current, self.queue.last_index()) {
            (Some(c), Some(last)) if c < last => self.select(c + 1),
            _ if wrap => self.select(0),
            _ => Step::Stop,
        }
    }

    /// Backward step
    pub fn previous(&mut self) -> Step {
        if self.queue.is_empty() {
            return Step::Stay;
        }
        let current = self.queue.current_index();

        if self.shuffle_enabled {
            return match self.shuffle.retreat(current) {
                Some(index) => self.select(index),
                None => Step::Stay,
            };
        }

        match current {
            Some(c) if c > 0 => self.select(c - 1),
            _ if self.repeat == RepeatMode::All => match self.queue.last_index() {
                Some(last) => self.select(last),
                None => Step::Stay,
            },
            _ => Step::Stay,
        }
    }

    /// The current song finished playing on its own
    pub fn track_ended(&mut self) -> Step {
        let Some(current) = self.queue.current_index() else {
            return Step::Stay;
        };

        match self.repeat {
            RepeatMode::One => self.select(current),
            RepeatMode::All => self.next(true),
            RepeatMode::Off => {
                let more = if self.shuffle_enabled {
                    self.shuffle.has_pending()
                } else {
                    self.queue.last_index().is_some_and(|last| current < last)
                };
                if more {
                    self.next(false)
                } else {
                    Step::Stop
                }
            }
        }
    }

    /// User picked a queue entry
    pub fn jump_to(&mut self, index: usize) -> Result<Step> {
        if index >= self.queue.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.queue.len(),
            });
        }
        if self.shuffle_enabled {
            self.shuffle.jump(self.queue.current_index(), index);
        }
        Ok(self.select(index))
    }

    /// Queue `song` right after the current one (moving an existing copy)
    pub fn insert_next(&mut self, song: Song) {
        let remap = self.queue.insert_next(song);
        if self.shuffle_enabled {
            self.shuffle
                .remap(&remap, self.queue.len(), self.queue.current_index());
        }
    }

    /// Queue `song` at the end (moving an existing copy)
    pub fn append_end(&mut self, song: Song) {
        let remap = self.queue.append_end(song);
        if self.shuffle_enabled {
            self.shuffle
                .remap(&remap, self.queue.len(), self.queue.current_index());
        }
    }

    /// Replace a song's metadata in place
    pub fn replace_song(&mut self, original: &Song, updated: Song) -> Option<usize> {
        self.queue.replace_song(original, updated)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.shuffle.clear();
    }

    fn select(&mut self, index: usize) -> Step {
        self.queue.set_current(index);
        if self.shuffle_enabled {
            self.shuffle.mark_current(index);
        }
        Step::Play(index)
    }

    fn reset_shuffle(&mut self) {
        if self.shuffle_enabled {
            self.shuffle
                .reset(self.queue.len(), self.queue.current_index());
        } else {
            self.shuffle.clear();
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(None)
    }
}
