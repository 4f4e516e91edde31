//! Shuffle engine
//!
//! Random traversal with reversible navigation, built on three collections of
//! queue indices:
//!
//! ```text
//! history: [2, 0]      visited, most recent last   (previous pops here)
//! current: 3
//! future:  [1]         undone picks, next first    (next pops here before drawing)
//! bag:     {4, 5}      not yet drawn this round    (never holds current)
//! ```
//!
//! Going back pushes the current index onto `future`, so going forward again
//! replays the exact same path. Drawing a fresh index from the bag starts a
//! new branch and drops the recorded future.

use crate::queue::IndexRemap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Result of a forward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Replayed a previously undone pick from `future`
    Redo(usize),

    /// Drew a fresh index from the bag
    Picked(usize),

    /// New round on a single-song queue: play the current song again
    Replay(usize),

    /// Bag is empty and no new round was allowed
    Exhausted,
}

/// History / future / bag state for shuffled playback
#[derive(Debug, Clone)]
pub struct ShuffleState {
    history: Vec<usize>,
    future: Vec<usize>,
    bag: Vec<usize>,
    rng: StdRng,
}

impl ShuffleState {
    /// Create an empty state; a seed makes every draw reproducible
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            history: Vec::new(),
            future: Vec::new(),
            bag: Vec::new(),
            rng,
        }
    }

    /// Start a fresh round: clear history and future, refill the bag
    pub fn reset(&mut self, len: usize, current: Option<usize>) {
        self.history.clear();
        self.future.clear();
        self.rebuild_bag(len, current);
    }

    /// Forget everything (shuffle turned off, queue cleared)
    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
        self.bag.clear();
    }

    /// Refill the bag with every index except `exclude`, in random order
    pub fn rebuild_bag(&mut self, len: usize, exclude: Option<usize>) {
        self.bag = (0..len).filter(|i| Some(*i) != exclude).collect();
        self.bag.shuffle(&mut self.rng);
    }

    /// Step forward
    ///
    /// `new_round` allows refilling an empty bag (repeat-all or forced skip).
    pub fn advance(&mut self, current: Option<usize>, len: usize, new_round: bool) -> Advance {
        if let Some(next) = self.future.pop() {
            if let Some(current) = current {
                self.history.push(current);
            }
            return Advance::Redo(next);
        }

        if self.bag.is_empty() {
            if !new_round {
                return Advance::Exhausted;
            }
            self.rebuild_bag(len, current);
            if self.bag.is_empty() {
                return current.map_or(Advance::Exhausted, Advance::Replay);
            }
        }

        if let Some(current) = current {
            self.history.push(current);
        }
        self.future.clear();

        let pick = self.rng.gen_range(0..self.bag.len());
        Advance::Picked(self.bag.swap_remove(pick))
    }

    /// Step back; `None` when there is no history
    pub fn retreat(&mut self, current: Option<usize>) -> Option<usize> {
        let previous = self.history.pop()?;
        if let Some(current) = current {
            self.future.push(current);
        }
        Some(previous)
    }

    /// User picked `target` directly: a new branch starting there
    pub fn jump(&mut self, current: Option<usize>, target: usize) {
        if let Some(current) = current {
            self.history.push(current);
        }
        self.future.clear();
        self.bag.retain(|i| *i != target);
    }

    /// Drop `index` from the bag once it becomes current
    pub fn mark_current(&mut self, index: usize) {
        self.bag.retain(|i| *i != index);
    }

    /// Follow songs moved by a queue mutation and start a new bag
    pub fn remap(&mut self, remap: &IndexRemap, len: usize, current: Option<usize>) {
        self.history = self.history.iter().filter_map(|i| remap.map(*i)).collect();
        self.future = self.future.iter().filter_map(|i| remap.map(*i)).collect();
        self.rebuild_bag(len, current);
    }

    /// Whether a forward step without a new round would find something
    pub fn has_pending(&self) -> bool {
        !self.future.is_empty() || !self.bag.is_empty()
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn future(&self) -> &[usize] {
        &self.future
    }

    pub fn bag(&self) -> &[usize] {
        &self.bag
    }
}

impl Default for ShuffleState {
    fn default() -> Self {
        Self::new(None)
    }
}
