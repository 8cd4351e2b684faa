//! Line index: which lyric line is in effect at a given playback second
//!
//! Pure functions over a sorted lyric set; the display state machine owns
//! all mutable state.

use super::types::LyricLine;

/// Result of a line lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    /// Index of the line currently in effect, `None` when the queried second
    /// precedes the first line (or the set is empty).
    pub index: Option<usize>,
    /// Start time of the following line, `None` when the located line is the
    /// last one (or the set is empty).
    pub next_start: Option<f64>,
}

/// Locate the lyric line in effect at `sec`.
///
/// Binary search for the greatest index whose start time is `<= sec`,
/// O(log n). `lines` must be sorted ascending by start time (see
/// `sanitize_lines`). When several lines share a start time the **last**
/// duplicate wins: `partition_point` counts every line with
/// `start_time <= sec`, so a later duplicate supersedes an earlier one the
/// moment both are eligible.
pub fn locate(sec: f64, lines: &[LyricLine]) -> Located {
    let upto = lines.partition_point(|line| line.start_time <= sec);

    if upto == 0 {
        // Before the first line (or empty set)
        return Located {
            index: None,
            next_start: lines.first().map(|line| line.start_time),
        };
    }

    Located {
        index: Some(upto - 1),
        next_start: lines.get(upto).map(|line| line.start_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> Vec<LyricLine> {
        vec![
            LyricLine::new("one", 1.0),
            LyricLine::new("two", 5.0),
            LyricLine::new("three", 9.0),
        ]
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(
            locate(3.0, &[]),
            Located {
                index: None,
                next_start: None,
            }
        );
    }

    #[test]
    fn test_before_first_line() {
        let lines = set();
        let located = locate(0.5, &lines);
        assert_eq!(located.index, None);
        assert_eq!(located.next_start, Some(1.0));
    }

    #[test]
    fn test_exact_line_start() {
        let lines = set();
        let located = locate(5.0, &lines);
        assert_eq!(located.index, Some(1));
        assert_eq!(located.next_start, Some(9.0));
    }

    #[test]
    fn test_between_lines() {
        let lines = set();
        let located = locate(7.3, &lines);
        assert_eq!(located.index, Some(1));
        assert_eq!(located.next_start, Some(9.0));
    }

    #[test]
    fn test_at_and_past_last_line() {
        let lines = set();
        for sec in [9.0, 100.0] {
            let located = locate(sec, &lines);
            assert_eq!(located.index, Some(2));
            assert_eq!(located.next_start, None);
        }
    }

    #[test]
    fn duplicate_start_times_pick_last() {
        let lines = vec![
            LyricLine::new("a", 2.0),
            LyricLine::new("b", 5.0),
            LyricLine::new("c", 5.0),
            LyricLine::new("d", 8.0),
        ];
        let located = locate(5.0, &lines);
        assert_eq!(located.index, Some(2));
        assert_eq!(located.next_start, Some(8.0));
    }

    #[test]
    fn test_idempotent() {
        let lines = set();
        assert_eq!(locate(6.0, &lines), locate(6.0, &lines));
    }
}
