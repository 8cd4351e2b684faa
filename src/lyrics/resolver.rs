//! Lyric resolution: disk cache or lrclib.net lookup
//!
//! One resolution per track session. Results are cached on disk keyed by
//! (artist, title), including the "no lyrics exist" result, so a track is
//! looked up remotely at most once across restarts. Cache writes are
//! best-effort and never affect the in-memory result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::lrc::parse_lrc;
use super::types::{LyricLine, sanitize_lines};

const LRCLIB_GET_URL: &str = "https://lrclib.net/api/get";

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("lyricast/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

/// Resolution failures, absorbed at the session boundary into the empty
/// result.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("lyrics api error: {0}")]
    Api(String),
    #[error("malformed lyrics payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Relevant subset of a lrclib `/api/get` response.
#[derive(Debug, Deserialize)]
struct LrclibResponse {
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

/// Cache-or-fetch lyric lookup.
#[derive(Debug, Clone)]
pub struct LyricResolver {
    cache_dir: PathBuf,
}

impl LyricResolver {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Cache file for a (title, artist) pair.
    pub fn cache_path(&self, title: &str, artist: &str) -> PathBuf {
        self.cache_dir.join(format!(
            "{}__{}.json",
            sanitize_filename(artist),
            sanitize_filename(title)
        ))
    }

    /// Resolve synced lyrics for a track. An empty vec is the definitive
    /// "no lyrics exist" answer; errors are reserved for lookups that could
    /// not complete.
    pub async fn resolve(&self, title: &str, artist: &str) -> Result<Vec<LyricLine>, ResolveError> {
        let cache_path = self.cache_path(title, artist);
        if let Some(cached) = load_cached(&cache_path) {
            debug!("lyrics cache hit: {:?}", cache_path);
            return Ok(cached);
        }

        debug!("fetching lyrics from lrclib: title={:?}, artist={:?}", title, artist);
        let lines = sanitize_lines(self.fetch(title, artist).await?);
        save_cache(&self.cache_dir, &cache_path, &lines);
        Ok(lines)
    }

    async fn fetch(&self, title: &str, artist: &str) -> Result<Vec<LyricLine>, ResolveError> {
        let response = HTTP_CLIENT
            .get(LRCLIB_GET_URL)
            .query(&[("track_name", title), ("artist_name", artist)])
            .send()
            .await?;

        // lrclib answers 404 for tracks it has never seen; that is the
        // definitive empty result, not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            debug!("no lyrics found for {:?} by {:?}", title, artist);
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(ResolveError::Api(format!(
                "lrclib returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let payload: LrclibResponse = serde_json::from_str(&body)?;

        Ok(match payload.synced_lyrics {
            Some(raw) if !raw.trim().is_empty() => parse_lrc(&raw),
            _ => Vec::new(),
        })
    }
}

/// Make a tag value safe to use as a file name component.
fn sanitize_filename(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn load_cached(path: &Path) -> Option<Vec<LyricLine>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(lines) => Some(lines),
        Err(err) => {
            warn!("ignoring unreadable lyrics cache entry {:?}: {}", path, err);
            None
        }
    }
}

/// Persist a resolution result, including the empty one. Best-effort.
fn save_cache(cache_dir: &Path, path: &Path, lines: &[LyricLine]) {
    if let Err(err) = fs::create_dir_all(cache_dir) {
        warn!("failed to create lyrics cache directory {:?}: {}", cache_dir, err);
        return;
    }
    let json = match serde_json::to_string(lines) {
        Ok(json) => json,
        Err(err) => {
            warn!("failed to serialize lyrics for caching: {}", err);
            return;
        }
    };
    if let Err(err) = fs::write(path, json) {
        warn!("failed to write lyrics cache {:?}: {}", path, err);
    } else {
        debug!("lyrics cached to {:?}", path);
    }
}
