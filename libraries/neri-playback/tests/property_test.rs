//! Property-based tests for queue navigation
//!
//! Random operation sequences against the navigator, checking the invariants
//! the player relies on after every step.

use neri_core::{Song, SongSource};
use neri_playback::{Navigator, RepeatMode, Step};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

fn song(id: i64) -> Song {
    let source = if id % 3 == 0 {
        SongSource::Bilibili { cid: Some(id) }
    } else {
        SongSource::Netease
    };
    Song::new(id, format!("Song {}", id), "Artist", source)
}

fn playlist(len: usize) -> Vec<Song> {
    (0..len as i64).map(song).collect()
}

#[derive(Debug, Clone)]
enum Op {
    Next,
    ForceNext,
    Previous,
    TrackEnded,
    Jump(usize),
    InsertNext(i64),
    AppendEnd(i64),
    ToggleShuffle,
    Repeat(RepeatMode),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Next),
        Just(Op::ForceNext),
        Just(Op::Previous),
        Just(Op::TrackEnded),
        (0usize..40).prop_map(Op::Jump),
        (0i64..40).prop_map(Op::InsertNext),
        (0i64..40).prop_map(Op::AppendEnd),
        Just(Op::ToggleShuffle),
        prop_oneof![
            Just(RepeatMode::Off),
            Just(RepeatMode::All),
            Just(RepeatMode::One)
        ]
        .prop_map(Op::Repeat),
    ]
}

fn apply(nav: &mut Navigator, op: &Op) -> Step {
    match op {
        Op::Next => nav.next(false),
        Op::ForceNext => nav.next(true),
        Op::Previous => nav.previous(),
        Op::TrackEnded => nav.track_ended(),
        Op::Jump(index) => nav.jump_to(*index).unwrap_or(Step::Stay),
        Op::InsertNext(id) => {
            nav.insert_next(song(*id));
            Step::Stay
        }
        Op::AppendEnd(id) => {
            nav.append_end(song(*id));
            Step::Stay
        }
        Op::ToggleShuffle => {
            let enabled = nav.is_shuffle_enabled();
            nav.set_shuffle(!enabled);
            Step::Stay
        }
        Op::Repeat(mode) => {
            nav.set_repeat(*mode);
            Step::Stay
        }
    }
}

fn check_invariants(nav: &Navigator) -> Result<(), TestCaseError> {
    let queue = nav.queue();
    let len = queue.len();

    match queue.current_index() {
        Some(current) => prop_assert!(current < len, "current {} out of {}", current, len),
        None => prop_assert!(queue.is_empty(), "non-empty queue without current"),
    }

    let identities: HashSet<(i64, String)> = queue
        .songs()
        .iter()
        .map(|s| (s.id, s.source.tag()))
        .collect();
    prop_assert_eq!(identities.len(), len, "duplicate songs in queue");

    let shuffle = nav.shuffle();
    if let Some(current) = queue.current_index() {
        prop_assert!(!shuffle.bag().contains(&current), "bag holds current");
    }
    for index in shuffle
        .history()
        .iter()
        .chain(shuffle.future())
        .chain(shuffle.bag())
    {
        prop_assert!(*index < len, "stale shuffle index {} (len {})", index, len);
    }
    let bag: HashSet<_> = shuffle.bag().iter().collect();
    prop_assert_eq!(bag.len(), shuffle.bag().len(), "bag holds duplicates");

    if !nav.is_shuffle_enabled() {
        prop_assert!(shuffle.history().is_empty() && shuffle.future().is_empty() && shuffle.bag().is_empty());
    }
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: Invariants hold after any sequence of navigation and queue edits
    #[test]
    fn invariants_hold_under_random_operations(
        len in 1usize..20,
        start in 0usize..25,
        seed in any::<u64>(),
        shuffle in any::<bool>(),
        ops in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let mut nav = Navigator::new(Some(seed));
        nav.set_shuffle(shuffle);
        nav.set_playlist(playlist(len), start);
        check_invariants(&nav)?;

        for op in &ops {
            if apply(&mut nav, op) == Step::Stop {
                // The player clears the queue on stop
                nav.clear();
            }
            check_invariants(&nav)?;
        }
    }

    /// Property: One shuffled pass plays every song exactly once, then stops
    #[test]
    fn shuffle_pass_visits_every_song_once(
        len in 1usize..30,
        start in 0usize..30,
        seed in any::<u64>(),
    ) {
        let mut nav = Navigator::new(Some(seed));
        nav.set_shuffle(true);
        let Step::Play(first) = nav.set_playlist(playlist(len), start) else {
            return Err(TestCaseError::fail("playlist did not start"));
        };

        let mut seen = vec![first];
        loop {
            match nav.track_ended() {
                Step::Play(index) => seen.push(index),
                Step::Stop => break,
                Step::Stay => return Err(TestCaseError::fail("track end stayed")),
            }
            prop_assert!(seen.len() <= len, "more plays than songs");
        }

        let unique: HashSet<_> = seen.iter().collect();
        prop_assert_eq!(seen.len(), len);
        prop_assert_eq!(unique.len(), len);
    }

    /// Property: Going back then forward replays the same song
    #[test]
    fn previous_then_next_is_reversible(
        len in 2usize..20,
        steps in 1usize..15,
        seed in any::<u64>(),
    ) {
        let mut nav = Navigator::new(Some(seed));
        nav.set_shuffle(true);
        nav.set_repeat(RepeatMode::All);
        nav.set_playlist(playlist(len), 0);
        for _ in 0..steps {
            nav.next(false);
        }

        let before = nav.queue().current_index();
        if let Step::Play(_) = nav.previous() {
            let Step::Play(again) = nav.next(false) else {
                return Err(TestCaseError::fail("redo did not play"));
            };
            prop_assert_eq!(Some(again), before);
        }
    }

    /// Property: Restored queues always have a valid current index
    #[test]
    fn restore_always_selects_valid_index(len in 1usize..20, index in -5i64..40) {
        let mut nav = Navigator::new(Some(1));
        nav.restore(playlist(len), index);

        let current = nav.queue().current_index().unwrap_or(usize::MAX);
        prop_assert!(current < len);
        if (0..len as i64).contains(&index) {
            prop_assert_eq!(current as i64, index);
        } else {
            prop_assert_eq!(current, 0);
        }
    }
}
