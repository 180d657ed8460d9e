// ESPN fantasy API client.
//
// Fetches the league endpoint with the scoreboard/settings/team views in one
// request. Private leagues need the `espn_s2` and `SWID` cookies from a
// logged-in browser session.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::EspnError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Base URL for fantasy basketball league reads.
pub const DEFAULT_BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/fba";

const LEAGUE_VIEWS: [&str; 6] = [
    "modular",
    "mNav",
    "mMatchupScore",
    "mScoreboard",
    "mSettings",
    "mTeam",
];

// ---------------------------------------------------------------------------
// League addressing
// ---------------------------------------------------------------------------

/// Identifies one league season; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeagueKey {
    pub league_id: String,
    pub season: String,
}

impl LeagueKey {
    pub fn new(league_id: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            league_id: league_id.into(),
            season: season.into(),
        }
    }
}

/// Build the league endpoint URL for the given season.
pub fn build_api_url(base_url: &str, key: &LeagueKey) -> String {
    let views: Vec<String> = LEAGUE_VIEWS.iter().map(|v| format!("view={v}")).collect();
    format!(
        "{}/seasons/{}/segments/0/leagues/{}?{}",
        base_url.trim_end_matches('/'),
        key.season,
        key.league_id,
        views.join("&")
    )
}

/// League id and season pulled out of a league page URL such as
/// `https://fantasy.espn.com/basketball/league?leagueId=2803&seasonId=2025`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueUrlParts {
    pub league_id: Option<String>,
    pub season: Option<String>,
}

pub fn parse_league_url(url: &str) -> Result<LeagueUrlParts, EspnError> {
    let parsed = Url::parse(url).map_err(|e| EspnError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let mut parts = LeagueUrlParts::default();
    for (name, value) in parsed.query_pairs() {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.as_ref() {
            "leagueId" => parts.league_id = Some(value.to_string()),
            "seasonId" => parts.season = Some(value.to_string()),
            _ => {}
        }
    }
    Ok(parts)
}

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Anything that can produce the raw league JSON for a league season.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn fetch_league(&self, key: &LeagueKey) -> Result<Value, EspnError>;
}

/// Session cookies for private leagues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspnCookies {
    pub espn_s2: String,
    pub swid: String,
}

impl EspnCookies {
    fn header_value(&self) -> String {
        format!("espn_s2={}; SWID={}", self.espn_s2, self.swid)
    }
}

// ---------------------------------------------------------------------------
// EspnClient
// ---------------------------------------------------------------------------

pub struct EspnClient {
    http: reqwest::Client,
    base_url: String,
    cookies: Option<EspnCookies>,
}

impl EspnClient {
    pub fn new(base_url: impl Into<String>, cookies: Option<EspnCookies>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cookies,
        }
    }
}

#[async_trait]
impl LeagueSource for EspnClient {
    async fn fetch_league(&self, key: &LeagueKey) -> Result<Value, EspnError> {
        let url = build_api_url(&self.base_url, key);
        info!("Requesting league {} season {} from ESPN", key.league_id, key.season);
        debug!(%url, authenticated = self.cookies.is_some(), "league request");

        let mut request = self.http.get(&url);
        if let Some(cookies) = &self.cookies {
            request = request.header(COOKIE, cookies.header_value());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EspnError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_includes_season_league_and_views() {
        let url = build_api_url(DEFAULT_BASE_URL, &LeagueKey::new("2803", "2025"));
        assert_eq!(
            url,
            "https://lm-api-reads.fantasy.espn.com/apis/v3/games/fba/seasons/2025/segments/0/leagues/2803\
             ?view=modular&view=mNav&view=mMatchupScore&view=mScoreboard&view=mSettings&view=mTeam"
        );
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let url = build_api_url("http://localhost:8080/fba/", &LeagueKey::new("1", "2024"));
        assert!(url.starts_with("http://localhost:8080/fba/seasons/2024/segments/0/leagues/1?"));
    }

    #[test]
    fn parses_league_and_season_from_url() {
        let parts = parse_league_url(
            "https://fantasy.espn.com/basketball/league?leagueId=2803&seasonId=2025",
        )
        .unwrap();
        assert_eq!(parts.league_id.as_deref(), Some("2803"));
        assert_eq!(parts.season.as_deref(), Some("2025"));
    }

    #[test]
    fn url_without_league_id_yields_none() {
        let parts = parse_league_url("https://fantasy.espn.com/basketball/team?teamId=4").unwrap();
        assert_eq!(parts, LeagueUrlParts::default());
    }

    #[test]
    fn garbage_url_is_rejected() {
        let err = parse_league_url("not a url").unwrap_err();
        assert!(matches!(err, EspnError::InvalidUrl { .. }));
    }

    #[test]
    fn cookie_header_format() {
        let cookies = EspnCookies {
            espn_s2: "abc".into(),
            swid: "{XYZ}".into(),
        };
        assert_eq!(cookies.header_value(), "espn_s2=abc; SWID={XYZ}");
    }
}
