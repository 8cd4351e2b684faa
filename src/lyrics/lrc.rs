//! Standard LRC format parser
//!
//! Supports the common [mm:ss.xx]text format with line-level synchronization,
//! which is what lrclib's `syncedLyrics` field carries.

use super::types::{LyricLine, sanitize_lines};

/// Parse a timestamp from LRC format: [mm:ss.xx], [mm:ss:xx] or [mm:ss]
///
/// Returns the number of bytes consumed and the time in seconds.
fn parse_time(src: &str) -> Option<(usize, f64)> {
    if !src.starts_with('[') {
        return None;
    }

    let end_bracket = src.find(']')?;
    let time_str = &src[1..end_bracket];

    // Skip metadata tags like [ar:Artist], [ti:Title]
    if time_str.contains(':') {
        if let Some(first_char) = time_str.chars().next() {
            if first_char.is_alphabetic() {
                return None;
            }
        }
    }

    let parts: Vec<&str> = time_str.split(|c| c == ':' || c == '.').collect();

    let time_ms = match parts.len() {
        2 => {
            // mm:ss format
            let min: u64 = parts[0].parse().ok()?;
            let sec: u64 = parts[1].parse().ok()?;
            min * 60 * 1000 + sec * 1000
        }
        3 => {
            // mm:ss.xx or mm:ss:xx format
            let min: u64 = parts[0].parse().ok()?;
            let sec: u64 = parts[1].parse().ok()?;
            let frac_str = parts[2];
            let mut frac: u64 = frac_str.parse().ok()?;

            // Handle different precision: x (deciseconds) to xxx (milliseconds)
            match frac_str.len() {
                1 => frac *= 100,
                2 => frac *= 10,
                3 => {}
                _ => return None,
            }

            min * 60 * 1000 + sec * 1000 + frac
        }
        _ => return None,
    };

    Some((end_bracket + 1, time_ms as f64 / 1000.0))
}

/// Parse a single LRC line, which may carry multiple timestamps
fn parse_line(line: &str) -> Vec<LyricLine> {
    let mut timestamps = Vec::new();
    let mut pos = 0;
    let line = line.trim();

    // Extract all timestamps at the beginning
    while pos < line.len() {
        if let Some((consumed, time)) = parse_time(&line[pos..]) {
            timestamps.push(time);
            pos += consumed;
        } else {
            break;
        }
    }

    if timestamps.is_empty() {
        return Vec::new();
    }

    // The text after all timestamps is shared by each of them
    let text = line[pos..].trim();

    timestamps
        .into_iter()
        .map(|start_time| LyricLine::new(text, start_time))
        .collect()
}

/// Parse LRC content into lyric lines, sorted ascending by start time
pub fn parse_lrc(src: &str) -> Vec<LyricLine> {
    let lines = src.lines();
    let mut result = Vec::with_capacity(lines.size_hint().1.unwrap_or(128).min(1024));

    for line in lines {
        result.extend(parse_line(line));
    }

    sanitize_lines(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("[00:01.12]"), Some((10, 1.12)));
        assert_eq!(parse_time("[00:10.254]"), Some((11, 10.254)));
        assert_eq!(parse_time("[01:10.1]"), Some((9, 70.1)));
        assert_eq!(parse_time("[00:42]"), Some((7, 42.0)));
        assert_eq!(parse_time("[00:00.00]"), Some((10, 0.0)));
    }

    #[test]
    fn test_parse_time_skips_metadata_tags() {
        assert_eq!(parse_time("[ar:Some Artist]"), None);
        assert_eq!(parse_time("[ti:Some Title]"), None);
    }

    #[test]
    fn test_parse_line() {
        let lines = parse_line("[00:01.12] test LyRiC");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].start_time, 1.12);
        assert_eq!(lines[0].text, "test LyRiC");
    }

    #[test]
    fn test_parse_multiple_timestamps() {
        let lines = parse_line("[00:12.50][01:30.00]Repeated line");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].start_time, 12.5);
        assert_eq!(lines[1].start_time, 90.0);
        assert_eq!(lines[0].text, lines[1].text);
    }

    #[test]
    fn test_parse_lrc() {
        let content = "[ti:Test Song]\n[ar:Test Artist]\n[00:00.00]First line\n[00:05.00]Second line\n[00:10.00]Third line";
        let lines = parse_lrc(content);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "First line");
        assert_eq!(lines[1].text, "Second line");
        assert_eq!(lines[2].text, "Third line");
    }

    #[test]
    fn test_parse_lrc_sorts_out_of_order_lines() {
        let content = "[00:30.00]Late\n[00:05.00]Early";
        let lines = parse_lrc(content);
        assert_eq!(lines[0].text, "Early");
        assert_eq!(lines[1].text, "Late");
    }
}
