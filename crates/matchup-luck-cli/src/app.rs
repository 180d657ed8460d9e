// One luck analysis run: load the league response, normalize it, and
// compute the report.

use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::info;

use matchup_luck_core::{compute_luck, Direction, LuckConfig, LuckReport};
use matchup_luck_espn::{load_league, LeagueSnapshot, LeagueSource, ResponseCache, ResponseOrigin};

use crate::cli::RunOptions;
use crate::report::LuckTable;

/// Everything the binary prints or saves after a run.
#[derive(Debug)]
pub struct Analysis {
    pub league_name: String,
    pub origin: ResponseOrigin,
    /// `id:ABBR` pairs, ascending by team id.
    pub team_mappings: String,
    /// `statId:ABBR` pairs for the active scoring stats.
    pub stat_mappings: String,
    pub report: LuckReport,
    pub table: LuckTable,
}

pub async fn analyze(
    source: &dyn LeagueSource,
    cache: Option<&ResponseCache>,
    options: &RunOptions,
    directions: &HashMap<String, Direction>,
    today: NaiveDate,
) -> anyhow::Result<Analysis> {
    let key = &options.key;
    let loaded = load_league(source, cache, key, options.refresh, today)
        .await
        .with_context(|| format!("failed to load league {} season {}", key.league_id, key.season))?;

    let snapshot = LeagueSnapshot::from_json(&loaded.body).context("unexpected league response")?;
    info!(
        "League '{}': {} teams, {} scoring stats",
        snapshot.name,
        snapshot.teams.len(),
        snapshot.stats.len()
    );

    let categories = snapshot
        .category_set(directions)
        .context("league has no usable scoring categories")?;
    let config = LuckConfig::new(categories)
        .with_aggregation(options.luck.aggregation)
        .with_bye_policy(options.luck.bye_policy);

    let report = compute_luck(&snapshot.periods(), &config).context("luck computation failed")?;
    info!(
        "Computed luck over {} weeks ({} skipped)",
        report.periods.len(),
        report.excluded.len()
    );

    let table = LuckTable::from_report(&report);
    Ok(Analysis {
        team_mappings: team_mappings(&snapshot),
        stat_mappings: stat_mappings(&snapshot),
        league_name: snapshot.name,
        origin: loaded.origin,
        report,
        table,
    })
}

fn team_mappings(snapshot: &LeagueSnapshot) -> String {
    snapshot
        .teams
        .iter()
        .map(|(id, name)| format!("{id}:{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn stat_mappings(snapshot: &LeagueSnapshot) -> String {
    snapshot
        .stats
        .iter()
        .map(|s| format!("{}:{}", s.stat_id, s.category.id))
        .collect::<Vec<_>>()
        .join(", ")
}
