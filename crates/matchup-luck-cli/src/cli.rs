// Command-line arguments and their merge with the loaded config.

use clap::{Parser, ValueEnum};

use matchup_luck_core::{Aggregation, ByePolicy};
use matchup_luck_espn::{parse_league_url, LeagueKey};

use crate::config::{validate_league_id, validate_season, Config, ConfigError, LuckSettings};

#[derive(Parser, Debug, Default)]
#[command(
    name = "matchup-luck",
    author,
    version,
    about = "Measure head-to-head category luck in an ESPN fantasy basketball league"
)]
pub struct Cli {
    /// ESPN league page URL; leagueId and seasonId are read from its query
    #[arg(long)]
    pub url: Option<String>,

    /// League id (overrides --url and league.toml)
    #[arg(short, long)]
    pub league: Option<String>,

    /// Season year, e.g. 2025 (overrides --url and league.toml)
    #[arg(short, long)]
    pub season: Option<String>,

    /// Ignore cached responses and fetch from ESPN
    #[arg(long)]
    pub refresh: bool,

    /// Print the report without writing text/HTML files
    #[arg(long)]
    pub no_save: bool,

    /// How weekly luck is combined into the season column
    #[arg(long, value_enum)]
    pub aggregation: Option<AggregationArg>,

    /// What to do with teams that have no opponent in a week
    #[arg(long, value_enum)]
    pub bye_policy: Option<ByePolicyArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationArg {
    Mean,
    Sum,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Mean => Aggregation::Mean,
            AggregationArg::Sum => Aggregation::Sum,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByePolicyArg {
    Exclude,
    Baseline,
    Reject,
}

impl From<ByePolicyArg> for ByePolicy {
    fn from(arg: ByePolicyArg) -> Self {
        match arg {
            ByePolicyArg::Exclude => ByePolicy::Exclude,
            ByePolicyArg::Baseline => ByePolicy::Baseline,
            ByePolicyArg::Reject => ByePolicy::Reject,
        }
    }
}

/// Everything a run needs after flags and config are merged.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub key: LeagueKey,
    pub luck: LuckSettings,
    pub refresh: bool,
    pub save: bool,
}

impl Cli {
    /// Merge flags over `config`. Precedence for league and season is
    /// explicit flag, then `--url`, then league.toml.
    pub fn resolve(&self, config: &Config) -> Result<RunOptions, ConfigError> {
        let from_url = match self.url.as_deref() {
            Some(url) => parse_league_url(url).map_err(|e| ConfigError::ValidationError {
                field: "--url".into(),
                message: e.to_string(),
            })?,
            None => Default::default(),
        };
        if self.url.is_some() && from_url.league_id.is_none() {
            return Err(ConfigError::ValidationError {
                field: "--url".into(),
                message: "URL has no leagueId parameter".into(),
            });
        }

        let league_id = self
            .league
            .clone()
            .or(from_url.league_id)
            .unwrap_or_else(|| config.league.league_id.clone());
        let season = self
            .season
            .clone()
            .or(from_url.season)
            .unwrap_or_else(|| config.league.season.clone());
        validate_league_id("league", &league_id)?;
        validate_season("season", &season)?;

        let mut luck = config.luck;
        if let Some(aggregation) = self.aggregation {
            luck.aggregation = aggregation.into();
        }
        if let Some(bye_policy) = self.bye_policy {
            luck.bye_policy = bye_policy.into();
        }

        Ok(RunOptions {
            key: LeagueKey::new(league_id, season),
            luck,
            refresh: self.refresh,
            save: !self.no_save,
        })
    }
}
