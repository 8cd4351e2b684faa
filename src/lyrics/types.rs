//! Lyric line data types
//!
//! Owned, serde-friendly variants shared by the cache files, the resolver
//! and the synchronization engine.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single line of synced lyrics.
///
/// `start_time` is the playback second at which the line begins. The field
/// serializes as `startTime`, matching both the cache file format and the
/// wire payloads consumed by display clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// The line text
    pub text: String,
    /// Start time in seconds
    pub start_time: f64,
}

impl LyricLine {
    pub fn new(text: impl Into<String>, start_time: f64) -> Self {
        Self {
            text: text.into(),
            start_time,
        }
    }
}

/// Sanitize a lyric set: drop NaN times, clamp negative times to 0 and sort
/// ascending by start time.
///
/// Every set entering the synchronization engine goes through this, so the
/// engine can assume a sorted sequence of finite timestamps.
pub fn sanitize_lines(lines: Vec<LyricLine>) -> Vec<LyricLine> {
    let mut sanitized: Vec<LyricLine> = lines
        .into_iter()
        .filter_map(|mut line| {
            if line.start_time.is_nan() {
                return None;
            }
            if line.start_time < 0.0 {
                line.start_time = 0.0;
            }
            Some(line)
        })
        .collect();

    sanitized.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(Ordering::Equal)
    });

    sanitized
}
