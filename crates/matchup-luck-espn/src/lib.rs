// ESPN fantasy basketball data access: API client, on-disk response cache,
// and normalization of league responses into luck-engine input.

pub mod cache;
pub mod client;
pub mod error;
pub mod league;
pub mod loader;
pub mod stats;

pub use cache::ResponseCache;
pub use client::{
    build_api_url, parse_league_url, EspnClient, EspnCookies, LeagueKey, LeagueSource,
    LeagueUrlParts, DEFAULT_BASE_URL,
};
pub use error::{CacheError, EspnError};
pub use league::{LeagueSnapshot, StatCategory};
pub use loader::{load_league, LoadedLeague, ResponseOrigin};
