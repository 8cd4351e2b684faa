//! Display state machine
//!
//! Converts the stream of playback ticks into show/hide decisions. Lyric
//! timestamps mark line *starts*, so the end of a line has to be inferred:
//! either the next line's start or a display ceiling for long instrumental
//! gaps. The machine also owns the hysteresis that keeps a hide from being
//! re-triggered (or the hidden line re-shown) while ticks jitter around a
//! deadline.

use tracing::debug;

use super::index::locate;
use super::types::LyricLine;
use crate::broadcast::Payload;

/// Default ceiling on how long a line stays visible with no successor.
pub const DEFAULT_MAX_DISPLAY_SEC: f64 = 10.0;

/// Suppression horizon after hiding the last line of a track.
const HIDDEN_SENTINEL_SEC: f64 = 9999.0;

/// Per-session display state.
///
/// `active_index` records the located line the machine last acted on and
/// deliberately survives a hide: in the gap after a hide the index search
/// still resolves to the hidden line, and that must not clear the
/// suppression window or count as a new line to show. An empty
/// `active_text` means nothing is currently displayed.
#[derive(Debug)]
pub struct DisplayEngine {
    max_display_sec: f64,
    active_index: Option<usize>,
    active_text: String,
    active_start: Option<f64>,
    active_next_start: Option<f64>,
    hidden_until: Option<f64>,
}

impl DisplayEngine {
    pub fn new(max_display_sec: f64) -> Self {
        Self {
            max_display_sec,
            active_index: None,
            active_text: String::new(),
            active_start: None,
            active_next_start: None,
            hidden_until: None,
        }
    }

    /// Forget everything; used on track change.
    pub fn reset(&mut self) {
        self.active_index = None;
        self.active_text.clear();
        self.active_start = None;
        self.active_next_start = None;
        self.hidden_until = None;
    }

    /// Process one playback tick against the current lyric set.
    ///
    /// `lines` must be sorted ascending by start time. Returns the decision
    /// to publish, or `None` when the display should stay as it is. The
    /// machine never returns the same decision twice in a row.
    pub fn tick(&mut self, sec: f64, lines: &[LyricLine]) -> Option<Payload> {
        let located = locate(sec, lines);

        // The natural end of the currently shown line: the next line's
        // start, bounded by the display ceiling.
        let hide_deadline = self.active_start.map(|start| match self.active_next_start {
            Some(next) => next.min(start + self.max_display_sec),
            None => start + self.max_display_sec,
        });

        // A line change always re-arms the hide logic.
        if located.index != self.active_index {
            self.hidden_until = None;
        }

        // Still inside the cooldown after a previous hide.
        if let Some(until) = self.hidden_until {
            if sec < until {
                return None;
            }
        }

        // Past the display window with no new line started yet: blank the
        // overlay and suppress further hide/show churn until the next line.
        if !self.active_text.is_empty() {
            if let Some(deadline) = hide_deadline {
                if sec >= deadline && located.index == self.active_index {
                    self.active_text.clear();
                    self.active_start = None;
                    self.active_next_start = None;
                    self.hidden_until =
                        Some(located.next_start.unwrap_or(sec + HIDDEN_SENTINEL_SEC));
                    debug!(
                        "hiding lyric line at {:.2}s, suppressed until {:?}",
                        sec, self.hidden_until
                    );
                    return Some(Payload::Hide { sec });
                }
            }
        }

        // A different line is in effect: show it.
        if let Some(idx) = located.index {
            if located.index != self.active_index {
                let line = &lines[idx];
                self.active_index = Some(idx);
                self.active_text = line.text.clone();
                self.active_start = Some(line.start_time);
                self.active_next_start = located.next_start;
                debug!("showing lyric line {} at {:.2}s", idx, sec);
                return Some(Payload::ShowLine {
                    text: line.text.clone(),
                    sec,
                });
            }
        }

        None
    }
}

impl Default for DisplayEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISPLAY_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(entries: &[(&str, f64)]) -> Vec<LyricLine> {
        entries
            .iter()
            .map(|(text, start)| LyricLine::new(*text, *start))
            .collect()
    }

    fn show(text: &str, sec: f64) -> Option<Payload> {
        Some(Payload::ShowLine {
            text: text.into(),
            sec,
        })
    }

    #[test]
    fn test_hello_world_tick_sequence() {
        // Two lines, ceiling 10: "World" is the last line, so at t=12 no
        // deadline has been crossed (5 + 10 = 15) and nothing is emitted.
        let set = lines(&[("Hello", 0.0), ("World", 5.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), show("Hello", 0.0));
        assert_eq!(engine.tick(2.0, &set), None);
        assert_eq!(engine.tick(5.0, &set), show("World", 5.0));
        assert_eq!(engine.tick(12.0, &set), None);
    }

    #[test]
    fn test_gap_between_lines_hides_at_ceiling() {
        let set = lines(&[("A", 0.0), ("B", 20.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), show("A", 0.0));
        assert_eq!(engine.tick(9.9, &set), None);
        // Deadline is min(20, 0 + 10) = 10.
        assert_eq!(engine.tick(10.0, &set), Some(Payload::Hide { sec: 10.0 }));
        // The gap stays blank: no re-show, no second hide.
        assert_eq!(engine.tick(11.0, &set), None);
        assert_eq!(engine.tick(19.5, &set), None);
        // The next line appears exactly at its start.
        assert_eq!(engine.tick(20.0, &set), show("B", 20.0));
    }

    #[test]
    fn test_hide_not_retriggered_by_backward_jitter() {
        let set = lines(&[("A", 0.0), ("B", 20.0)]);
        let mut engine = DisplayEngine::new(10.0);

        engine.tick(0.0, &set);
        assert_eq!(engine.tick(10.0, &set), Some(Payload::Hide { sec: 10.0 }));
        // Ticks jittering back below the deadline stay inside the cooldown.
        assert_eq!(engine.tick(9.8, &set), None);
        assert_eq!(engine.tick(10.1, &set), None);
    }

    #[test]
    fn test_last_line_hides_at_ceiling_and_stays_hidden() {
        let set = lines(&[("Only", 0.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), show("Only", 0.0));
        assert_eq!(engine.tick(9.0, &set), None);
        assert_eq!(engine.tick(10.0, &set), Some(Payload::Hide { sec: 10.0 }));
        // No next line: the far-future sentinel keeps the overlay blank.
        assert_eq!(engine.tick(60.0, &set), None);
        assert_eq!(engine.tick(600.0, &set), None);
    }

    #[test]
    fn test_repeated_ticks_emit_once() {
        let set = lines(&[("Hello", 0.0), ("World", 5.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(1.0, &set), show("Hello", 1.0));
        assert_eq!(engine.tick(1.0, &set), None);
        assert_eq!(engine.tick(1.0, &set), None);
    }

    #[test]
    fn test_before_first_line_shows_nothing() {
        let set = lines(&[("Late start", 30.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), None);
        assert_eq!(engine.tick(29.9, &set), None);
        assert_eq!(engine.tick(30.0, &set), show("Late start", 30.0));
    }

    #[test]
    fn test_empty_set_is_inert() {
        let mut engine = DisplayEngine::new(10.0);
        assert_eq!(engine.tick(0.0, &[]), None);
        assert_eq!(engine.tick(42.0, &[]), None);
    }

    #[test]
    fn test_line_replaced_before_ceiling() {
        // Tight lines never trigger the ceiling; each line replaces the
        // previous one at its own start.
        let set = lines(&[("a", 0.0), ("b", 2.0), ("c", 4.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), show("a", 0.0));
        assert_eq!(engine.tick(2.0, &set), show("b", 2.0));
        assert_eq!(engine.tick(4.5, &set), show("c", 4.5));
    }

    #[test]
    fn test_reset_forgets_shown_line() {
        let set = lines(&[("Hello", 0.0)]);
        let mut engine = DisplayEngine::new(10.0);

        assert_eq!(engine.tick(0.0, &set), show("Hello", 0.0));
        engine.reset();
        // After a reset the same tick shows the line again.
        assert_eq!(engine.tick(0.5, &set), show("Hello", 0.5));
    }
}
