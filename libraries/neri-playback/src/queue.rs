//! Playback queue
//!
//! An ordered list of songs plus the position of the current one.
//!
//! ```text
//!   0: Song A
//! > 1: Song B   <- current
//!   2: Song C   <- insert_next lands here
//!   3: Song D
//!                <- append_end lands here
//! ```
//!
//! Songs are unique by `(id, source)`: adding a song that is already queued
//! moves the existing entry instead of duplicating it.

use crate::error::{PlaybackError, Result};
use neri_core::Song;

/// Where each pre-mutation index ended up after a queue mutation
///
/// Used to keep shuffle history/future pointing at the same songs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRemap(Vec<usize>);

impl IndexRemap {
    fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Build from the post-mutation slots, each holding the old index it came from
    fn from_slots(slots: &[Option<usize>], old_len: usize) -> Self {
        let mut old_to_new = vec![0; old_len];
        for (new_index, slot) in slots.iter().enumerate() {
            if let Some(old_index) = slot {
                old_to_new[*old_index] = new_index;
            }
        }
        Self(old_to_new)
    }

    /// New position of an old index
    pub fn map(&self, old_index: usize) -> Option<usize> {
        self.0.get(old_index).copied()
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, n)| i == *n)
    }
}

/// Ordered songs with a current position
///
/// Invariant: `current` is `Some(i)` with `i < len` whenever the queue is
/// non-empty, and `None` when it is empty.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    songs: Vec<Song>,
    current: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole queue
    ///
    /// `start` is clamped into bounds. Returns the new current index, `None`
    /// for an empty list.
    pub fn set_playlist(&mut self, songs: Vec<Song>, start: usize) -> Option<usize> {
        self.current = if songs.is_empty() {
            None
        } else {
            Some(start.min(songs.len() - 1))
        };
        self.songs = songs;
        self.current
    }

    /// Restore a persisted queue; an out-of-range index falls back to 0
    pub fn restore(&mut self, songs: Vec<Song>, index: i64) {
        let start = usize::try_from(index)
            .ok()
            .filter(|i| *i < songs.len())
            .unwrap_or(0);
        self.set_playlist(songs, start);
    }

    /// Put a song right after the current one
    ///
    /// An already queued copy is moved. Inserting the current song is a no-op.
    pub fn insert_next(&mut self, song: Song) -> IndexRemap {
        let old_len = self.songs.len();
        let existing = self.position_of(&song);

        if existing.is_some() && existing == self.current {
            return IndexRemap::identity(old_len);
        }

        let mut slots: Vec<Option<usize>> = (0..old_len).map(Some).collect();
        let mut moved_slot = None;
        if let Some(index) = existing {
            self.songs.remove(index);
            slots.remove(index);
            moved_slot = Some(index);
        }

        let old_current = self.current;
        let current_now = old_current.and_then(|c| slots.iter().position(|s| *s == Some(c)));
        let insert_at = current_now.map_or(0, |c| c + 1);

        self.songs.insert(insert_at, song);
        slots.insert(insert_at, moved_slot);
        self.current = current_now.or(Some(insert_at));

        IndexRemap::from_slots(&slots, old_len)
    }

    /// Put a song at the end of the queue
    ///
    /// An already queued copy is moved; if it was the current song the
    /// current position follows it.
    pub fn append_end(&mut self, song: Song) -> IndexRemap {
        let old_len = self.songs.len();
        let mut slots: Vec<Option<usize>> = (0..old_len).map(Some).collect();
        let mut moved_slot = None;

        if let Some(index) = self.position_of(&song) {
            self.songs.remove(index);
            slots.remove(index);
            moved_slot = Some(index);
        }

        self.songs.push(song);
        slots.push(moved_slot);

        self.current = match self.current {
            Some(c) => slots.iter().position(|s| *s == Some(c)),
            None => Some(self.songs.len() - 1),
        };

        IndexRemap::from_slots(&slots, old_len)
    }

    /// Make `index` the current position
    pub fn jump_to(&mut self, index: usize) -> Result<&Song> {
        if index >= self.songs.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.songs.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.songs[index])
    }

    /// Move the current position to an index already known to be in bounds
    pub(crate) fn set_current(&mut self, index: usize) {
        debug_assert!(index < self.songs.len());
        self.current = Some(index);
    }

    /// Replace the entry with the same identity as `original`
    ///
    /// Returns the index that was updated.
    pub fn replace_song(&mut self, original: &Song, updated: Song) -> Option<usize> {
        let index = self.position_of(original)?;
        self.songs[index] = updated;
        Some(index)
    }

    pub fn clear(&mut self) {
        self.songs.clear();
        self.current = None;
    }

    pub fn position_of(&self, song: &Song) -> Option<usize> {
        self.songs.iter().position(|s| s.same_track(song))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|i| self.songs.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.songs.len().checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neri_core::SongSource;

    fn song(id: i64) -> Song {
        Song::new(id, format!("Song {}", id), "Artist", SongSource::Netease)
    }

    fn ids(queue: &Queue) -> Vec<i64> {
        queue.songs().iter().map(|s| s.id).collect()
    }

    fn queue_of(n: i64, current: usize) -> Queue {
        let mut queue = Queue::new();
        queue.set_playlist((0..n).map(song).collect(), current);
        queue
    }

    #[test]
    fn set_playlist_clamps_start() {
        let mut queue = Queue::new();
        assert_eq!(queue.set_playlist(vec![song(1), song(2)], 10), Some(1));
        assert_eq!(queue.current_song().unwrap().id, 2);

        assert_eq!(queue.set_playlist(vec![], 3), None);
        assert!(queue.current_song().is_none());
    }

    #[test]
    fn restore_falls_back_to_first_song() {
        let mut queue = Queue::new();
        queue.restore(vec![song(1), song(2)], -1);
        assert_eq!(queue.current_index(), Some(0));

        queue.restore(vec![song(1), song(2)], 1);
        assert_eq!(queue.current_index(), Some(1));

        queue.restore(vec![song(1)], 5);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn insert_next_new_song() {
        let mut queue = queue_of(3, 1);
        let remap = queue.insert_next(song(9));

        assert_eq!(ids(&queue), vec![0, 1, 9, 2]);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(remap.map(2), Some(3));
        assert_eq!(remap.map(1), Some(1));
    }

    #[test]
    fn insert_next_moves_existing_song_after_current() {
        let mut queue = queue_of(5, 1);
        let remap = queue.insert_next(song(4));

        assert_eq!(ids(&queue), vec![0, 1, 4, 2, 3]);
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(remap.map(4), Some(2));
        assert_eq!(remap.map(2), Some(3));
    }

    #[test]
    fn insert_next_moves_song_from_before_current() {
        let mut queue = queue_of(5, 3);
        queue.insert_next(song(0));

        assert_eq!(ids(&queue), vec![1, 2, 3, 0, 4]);
        // Still on song 3
        assert_eq!(queue.current_song().unwrap().id, 3);
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn insert_next_of_current_song_is_noop() {
        let mut queue = queue_of(3, 1);
        let remap = queue.insert_next(song(1));
        assert_eq!(ids(&queue), vec![0, 1, 2]);
        assert!(remap.is_identity());
    }

    #[test]
    fn append_end_moves_existing() {
        let mut queue = queue_of(4, 2);
        queue.append_end(song(0));

        assert_eq!(ids(&queue), vec![1, 2, 3, 0]);
        assert_eq!(queue.current_song().unwrap().id, 2);
    }

    #[test]
    fn append_end_of_current_song_follows_it() {
        let mut queue = queue_of(3, 0);
        queue.append_end(song(0));

        assert_eq!(ids(&queue), vec![1, 2, 0]);
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn adding_to_empty_queue_selects_song() {
        let mut queue = Queue::new();
        queue.append_end(song(1));
        assert_eq!(queue.current_index(), Some(0));

        let mut queue = Queue::new();
        queue.insert_next(song(1));
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn jump_to_bounds() {
        let mut queue = queue_of(3, 0);
        assert_eq!(queue.jump_to(2).unwrap().id, 2);
        assert_eq!(queue.current_index(), Some(2));
        assert!(matches!(
            queue.jump_to(3),
            Err(PlaybackError::IndexOutOfBounds { index: 3, len: 3 })
        ));
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn replace_song_by_identity() {
        let mut queue = queue_of(3, 0);
        let updated = song(1).with_lyric_offset(300);
        assert_eq!(queue.replace_song(&song(1), updated), Some(1));
        assert_eq!(queue.get(1).unwrap().user_lyric_offset_ms, 300);
        assert_eq!(queue.replace_song(&song(42), song(42)), None);
    }
}
