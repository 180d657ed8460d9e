// Cache-or-fetch loading of the raw league response.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::client::{LeagueKey, LeagueSource};
use crate::error::EspnError;

/// Where a league response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOrigin {
    Cache(std::path::PathBuf),
    Remote,
}

#[derive(Debug, Clone)]
pub struct LoadedLeague {
    pub body: Value,
    pub origin: ResponseOrigin,
}

/// Return the newest cached response for `key`, or fetch it from `source`
/// and cache it under `today`.
///
/// `refresh` skips the cache lookup but still writes the fresh response.
/// A failed cache write is logged and does not fail the load.
pub async fn load_league(
    source: &dyn LeagueSource,
    cache: Option<&ResponseCache>,
    key: &LeagueKey,
    refresh: bool,
    today: NaiveDate,
) -> Result<LoadedLeague, EspnError> {
    if let (Some(cache), false) = (cache, refresh) {
        if let Some(hit) = cache.load_latest(key)? {
            info!("Loaded cached league data from {}", hit.path.display());
            return Ok(LoadedLeague {
                body: hit.body,
                origin: ResponseOrigin::Cache(hit.path),
            });
        }
        info!("No cached data found, fetching from ESPN");
    }

    let body = source.fetch_league(key).await?;

    if let Some(cache) = cache {
        match cache.save(key, today, &body) {
            Ok(path) => info!("Saved league data to {}", path.display()),
            Err(e) => warn!("Failed to cache league data: {}", e),
        }
    }

    Ok(LoadedLeague {
        body,
        origin: ResponseOrigin::Remote,
    })
}
