//! LRC lyric parsing
//!
//! Turns LRC text into timed entries:
//! ```text
//! [ti:Title]
//! [offset:+200]
//! [00:12.34][01:02.00]Repeated line
//! [00:15.000]Next line
//! ```

use serde::{Deserialize, Serialize};

/// Display time given to the last line of a lyric
const LAST_LINE_DURATION_MS: u64 = 5_000;

/// One timed lyric line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricEntry {
    /// Start of the line in milliseconds
    pub start_ms: u64,

    /// End of the line (start of the next one)
    pub end_ms: u64,

    pub text: String,
}

/// Parse LRC text into entries sorted by start time
///
/// Lines without a timestamp (metadata tags, blank lines, garbage) are
/// skipped. An `[offset:±ms]` tag moves every line earlier by that amount.
pub fn parse_lrc(text: &str) -> Vec<LyricEntry> {
    let mut offset_ms: i64 = 0;
    let mut timed: Vec<(u64, String)> = Vec::new();

    for line in text.lines() {
        let mut rest = line.trim();
        let mut stamps = Vec::new();

        while let Some(tag_end) = rest.strip_prefix('[').and_then(|r| r.find(']')) {
            let tag = &rest[1..=tag_end];
            rest = &rest[tag_end + 2..];

            if let Some(ms) = parse_timestamp(tag) {
                stamps.push(ms);
            } else if let Some(value) = tag.strip_prefix("offset:") {
                offset_ms = value.trim().parse().unwrap_or(0);
            }
        }

        let text = rest.trim();
        for ms in stamps {
            timed.push((ms, text.to_string()));
        }
    }

    timed.sort_by_key(|(ms, _)| *ms);

    let starts: Vec<u64> = timed
        .iter()
        .map(|(ms, _)| {
            let ms = i64::try_from(*ms).unwrap_or(i64::MAX);
            u64::try_from(ms.saturating_sub(offset_ms)).unwrap_or(0)
        })
        .collect();

    timed
        .into_iter()
        .enumerate()
        .map(|(i, (_, text))| {
            let start_ms = starts[i];
            let end_ms = starts
                .get(i + 1)
                .copied()
                .unwrap_or(start_ms.saturating_add(LAST_LINE_DURATION_MS));
            LyricEntry {
                start_ms,
                end_ms,
                text,
            }
        })
        .collect()
}

/// Parse `mm:ss`, `mm:ss.f`, `mm:ss.ff`, `mm:ss.fff` (`:` also accepted before the fraction)
fn parse_timestamp(tag: &str) -> Option<u64> {
    let (minutes, rest) = tag.split_once(':')?;
    let minutes: u64 = minutes.trim().parse().ok()?;

    let (seconds, fraction) = match rest.find(['.', ':']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let seconds: u64 = seconds.trim().parse().ok()?;

    let millis = match fraction {
        None => 0,
        Some(f) if f.is_empty() || f.len() > 3 || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return None
        }
        Some(f) => {
            let value: u64 = f.parse().ok()?;
            match f.len() {
                1 => value * 100,
                2 => value * 10,
                _ => value,
            }
        }
    };

    minutes
        .checked_mul(60_000)?
        .checked_add(seconds.checked_mul(1_000)?)?
        .checked_add(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_lines() {
        let lyrics = parse_lrc("[00:01.00]first\n[00:03.50]second\n");
        assert_eq!(lyrics.len(), 2);
        assert_eq!(lyrics[0].start_ms, 1_000);
        assert_eq!(lyrics[0].end_ms, 3_500);
        assert_eq!(lyrics[0].text, "first");
        assert_eq!(lyrics[1].start_ms, 3_500);
        assert_eq!(lyrics[1].end_ms, 8_500);
    }

    #[test]
    fn fraction_precision() {
        assert_eq!(parse_timestamp("01:02"), Some(62_000));
        assert_eq!(parse_timestamp("00:00.5"), Some(500));
        assert_eq!(parse_timestamp("00:00.05"), Some(50));
        assert_eq!(parse_timestamp("00:00.005"), Some(5));
        assert_eq!(parse_timestamp("00:01:20"), Some(1_200));
        assert_eq!(parse_timestamp("ar:Someone"), None);
        assert_eq!(parse_timestamp("00:01.1234"), None);
    }

    #[test]
    fn repeated_tags_and_sorting() {
        let lyrics = parse_lrc("[00:10.00][00:02.00]chorus\n[00:05.00]verse");
        let texts: Vec<&str> = lyrics.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["chorus", "verse", "chorus"]);
        assert_eq!(lyrics[0].start_ms, 2_000);
        assert_eq!(lyrics[2].start_ms, 10_000);
    }

    #[test]
    fn metadata_tags_are_skipped() {
        let lyrics = parse_lrc("[ti:Title]\n[ar:Artist]\n\nnot a lyric\n[00:01.00]line");
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics[0].text, "line");
    }

    #[test]
    fn offset_moves_lines_earlier() {
        let lyrics = parse_lrc("[offset:+500]\n[00:00.20]a\n[00:02.00]b");
        assert_eq!(lyrics[0].start_ms, 0);
        assert_eq!(lyrics[1].start_ms, 1_500);

        let delayed = parse_lrc("[offset:-1000]\n[00:01.00]a");
        assert_eq!(delayed[0].start_ms, 2_000);
    }

    #[test]
    fn empty_input() {
        assert!(parse_lrc("").is_empty());
    }

    #[test]
    fn oversized_timestamp_is_ignored() {
        let lyrics = parse_lrc("[99999999999999999:00.00]too far\n[00:01.00]ok");
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics[0].text, "ok");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics_on_arbitrary_text(text in "\\PC*") {
                let _ = parse_lrc(&text);
            }

            #[test]
            fn entries_are_sorted_and_contiguous(
                stamps in prop::collection::vec((0u64..100, 0u64..60, 0u64..100), 1..20)
            ) {
                let text: String = stamps
                    .iter()
                    .map(|(m, s, cs)| format!("[{:02}:{:02}.{:02}]line\n", m, s, cs))
                    .collect();
                let lyrics = parse_lrc(&text);

                prop_assert_eq!(lyrics.len(), stamps.len());
                for pair in lyrics.windows(2) {
                    prop_assert!(pair[0].start_ms <= pair[1].start_ms);
                    prop_assert_eq!(pair[0].end_ms, pair[1].start_ms);
                }
                for entry in &lyrics {
                    prop_assert!(entry.end_ms >= entry.start_ms);
                }
            }
        }
    }
}
