// On-disk cache of raw league responses.
//
// One pretty-printed JSON file per fetch, named
// `{YYYY-MM-DD}_{league}_{season}_scoreboard.json`. Lookups return the most
// recent file for a league season; ISO dates sort lexicographically.

use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::client::LeagueKey;
use crate::error::CacheError;

pub struct ResponseCache {
    dir: PathBuf,
}

/// A cached response and the file it came from.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub path: PathBuf,
    pub body: Value,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(key: &LeagueKey, date: NaiveDate) -> String {
        format!("{}{}", date.format("%Y-%m-%d"), Self::suffix(key))
    }

    fn suffix(key: &LeagueKey) -> String {
        format!("_{}_{}_scoreboard.json", key.league_id, key.season)
    }

    /// Load the newest cached response for `key`.
    ///
    /// Returns `Ok(None)` when the cache directory or a matching file does
    /// not exist, or when the newest file is unreadable JSON (logged).
    pub fn load_latest(&self, key: &LeagueKey) -> Result<Option<CachedResponse>, CacheError> {
        if !self.dir.exists() {
            return Ok(None);
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let suffix = Self::suffix(key);
        let mut newest: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.ends_with(&suffix) && newest.as_ref().map_or(true, |n| name > *n) {
                newest = Some(name);
            }
        }

        let Some(name) = newest else {
            debug!("no cached response for league {} season {}", key.league_id, key.season);
            return Ok(None);
        };

        let path = self.dir.join(name);
        let text = std::fs::read_to_string(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        match serde_json::from_str(&text) {
            Ok(body) => Ok(Some(CachedResponse { path, body })),
            Err(e) => {
                warn!("ignoring unreadable cache file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Write `body` as the cached response for `key` on `date`, replacing any
    /// file already written that day.
    pub fn save(&self, key: &LeagueKey, date: NaiveDate, body: &Value) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.dir.join(Self::file_name(key, date));
        let text = serde_json::to_string_pretty(body)?;
        std::fs::write(&path, text).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}
