// Normalization of the raw ESPN league response into engine input.
//
// The response carries three things we need: the league settings (name and
// active scoring stats), the team list, and the schedule with per-stat
// cumulative scores for every matchup.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use matchup_luck_core::{
    Category, CategoryId, CategorySet, CategoryTotals, Direction, LuckError, Matchup, Period, Team,
    TeamTotals,
};

use crate::error::EspnError;
use crate::stats;

// ---------------------------------------------------------------------------
// Raw response structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeague {
    #[serde(default)]
    settings: RawSettings,
    #[serde(default)]
    teams: Vec<RawTeam>,
    #[serde(default)]
    schedule: Vec<RawScheduleEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    name: Option<String>,
    #[serde(default)]
    scoring_settings: RawScoringSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoringSettings {
    #[serde(default)]
    scoring_items: Vec<RawScoringItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoringItem {
    stat_id: Option<u16>,
    is_reverse_item: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTeam {
    id: u32,
    abbrev: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheduleEntry {
    matchup_period_id: Option<u32>,
    #[serde(default)]
    winner: String,
    home: Option<RawSide>,
    away: Option<RawSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSide {
    team_id: u32,
    cumulative_score: Option<RawCumulativeScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCumulativeScore {
    score_by_stat: Option<HashMap<String, RawStatScore>>,
}

#[derive(Debug, Deserialize)]
struct RawStatScore {
    score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One active scoring stat of the league.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCategory {
    pub stat_id: u16,
    pub category: Category,
}

/// A parsed league response.
#[derive(Debug)]
pub struct LeagueSnapshot {
    pub name: String,
    /// Team id → abbreviation.
    pub teams: BTreeMap<u32, String>,
    /// Active scoring stats, ascending by stat id.
    pub stats: Vec<StatCategory>,
    schedule: Vec<RawScheduleEntry>,
}

impl LeagueSnapshot {
    pub fn from_json(raw: &Value) -> Result<Self, EspnError> {
        let league = RawLeague::deserialize(raw)?;

        let name = league
            .settings
            .name
            .clone()
            .unwrap_or_else(|| "Unknown League".to_string());

        let teams = league
            .teams
            .iter()
            .map(|t| {
                let label = t
                    .abbrev
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Team {}", t.id));
                (t.id, label)
            })
            .collect();

        let stats = active_stats(&league.settings.scoring_settings.scoring_items);

        Ok(Self {
            name,
            teams,
            stats,
            schedule: league.schedule,
        })
    }

    /// The league's category set, with `overrides` (keyed by category id)
    /// replacing the direction reported by ESPN.
    pub fn category_set(&self, overrides: &HashMap<String, Direction>) -> Result<CategorySet, LuckError> {
        for key in self.unmatched_overrides(overrides) {
            warn!("direction override for '{}' matches no scoring category, ignoring", key);
        }
        let categories = self
            .stats
            .iter()
            .map(|s| match overrides.get(s.category.id.as_str()) {
                Some(direction) => Category::new(s.category.id.clone(), *direction),
                None => s.category.clone(),
            })
            .collect();
        CategorySet::new(categories)
    }

    /// Override keys that name none of the league's active categories,
    /// sorted.
    pub fn unmatched_overrides<'a>(&self, overrides: &'a HashMap<String, Direction>) -> Vec<&'a str> {
        let mut unmatched: Vec<&str> = overrides
            .keys()
            .map(String::as_str)
            .filter(|key| !self.stats.iter().any(|s| s.category.id.as_str() == *key))
            .collect();
        unmatched.sort_unstable();
        unmatched
    }

    /// Convert the schedule into periods, ascending by index.
    ///
    /// A period is complete when every one of its schedule entries has a
    /// decided winner. Entries without an away side are byes.
    pub fn periods(&self) -> Vec<Period> {
        let by_stat: HashMap<u16, &CategoryId> = self
            .stats
            .iter()
            .map(|s| (s.stat_id, &s.category.id))
            .collect();

        let mut periods: BTreeMap<u32, Period> = BTreeMap::new();
        for entry in &self.schedule {
            let Some(index) = entry.matchup_period_id.filter(|&p| p > 0) else {
                continue;
            };
            let period = periods
                .entry(index)
                .or_insert_with(|| Period::completed(index, Vec::new()));
            if !is_decided(&entry.winner) {
                period.complete = false;
            }

            let Some(home) = &entry.home else {
                warn!("period {}: schedule entry without a home team, skipping", index);
                continue;
            };
            let Some(home) = self.team_totals(home, &by_stat) else {
                warn!("period {}: unknown home team {}, skipping", index, home.team_id);
                continue;
            };

            match &entry.away {
                Some(away) => {
                    let Some(away) = self.team_totals(away, &by_stat) else {
                        warn!("period {}: unknown away team {}, skipping", index, away.team_id);
                        continue;
                    };
                    period.matchups.push(Matchup::new(home, away));
                }
                None => {
                    if home.totals.is_empty() {
                        debug!("period {}: bye for team {} has no stats", index, home.team.id);
                    } else {
                        period.byes.push(home);
                    }
                }
            }
        }

        periods.into_values().collect()
    }

    fn team_totals(&self, side: &RawSide, by_stat: &HashMap<u16, &CategoryId>) -> Option<TeamTotals> {
        let name = self.teams.get(&side.team_id)?;
        let totals: CategoryTotals = side
            .cumulative_score
            .as_ref()
            .and_then(|c| c.score_by_stat.as_ref())
            .map(|scores| {
                scores
                    .iter()
                    .filter_map(|(stat, score)| {
                        let id = by_stat.get(&stat.parse::<u16>().ok()?)?;
                        // An entry without a score counts as zero; a missing
                        // entry stays missing and is rejected by the engine.
                        Some(((*id).clone(), score.score.unwrap_or(0.0)))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(TeamTotals::new(Team::new(side.team_id, name.clone()), totals))
    }
}

fn is_decided(winner: &str) -> bool {
    matches!(winner.trim(), "HOME" | "AWAY" | "TIE")
}

/// Map the league's scoring items to categories. Unknown stat ids are
/// dropped; repeated abbreviations get the stat id appended.
fn active_stats(items: &[RawScoringItem]) -> Vec<StatCategory> {
    let mut by_id: BTreeMap<u16, Option<bool>> = BTreeMap::new();
    for item in items {
        if let Some(stat_id) = item.stat_id {
            by_id.insert(stat_id, item.is_reverse_item);
        }
    }

    let mut used = HashSet::new();
    let mut stats = Vec::with_capacity(by_id.len());
    for (stat_id, reverse) in by_id {
        let Some(abbrev) = stats::abbreviation(stat_id) else {
            warn!("ignoring unknown ESPN stat id {}", stat_id);
            continue;
        };
        let key = if used.insert(abbrev) {
            abbrev.to_string()
        } else {
            format!("{abbrev}#{stat_id}")
        };
        let direction = match reverse {
            Some(true) => Direction::LowerIsBetter,
            Some(false) => Direction::HigherIsBetter,
            None => stats::default_direction(stat_id),
        };
        stats.push(StatCategory {
            stat_id,
            category: Category::new(key, direction),
        });
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_for_sparse_response() {
        let snapshot = LeagueSnapshot::from_json(&json!({})).unwrap();
        assert_eq!(snapshot.name, "Unknown League");
        assert!(snapshot.teams.is_empty());
        assert!(snapshot.stats.is_empty());
        assert!(snapshot.periods().is_empty());
    }

    #[test]
    fn team_without_abbrev_gets_placeholder() {
        let snapshot = LeagueSnapshot::from_json(&json!({
            "teams": [{ "id": 3, "abbrev": "LUX" }, { "id": 8 }, { "id": 9, "abbrev": "  " }]
        }))
        .unwrap();
        assert_eq!(snapshot.teams[&3], "LUX");
        assert_eq!(snapshot.teams[&8], "Team 8");
        assert_eq!(snapshot.teams[&9], "Team 9");
    }

    #[test]
    fn reverse_flag_wins_over_default_direction() {
        let stats = active_stats(&[
            RawScoringItem { stat_id: Some(11), is_reverse_item: Some(false) },
            RawScoringItem { stat_id: Some(0), is_reverse_item: Some(true) },
            RawScoringItem { stat_id: Some(9), is_reverse_item: None },
        ]);
        let directions: Vec<(u16, Direction)> =
            stats.iter().map(|s| (s.stat_id, s.category.direction)).collect();
        assert_eq!(
            directions,
            vec![
                (0, Direction::LowerIsBetter),
                (9, Direction::LowerIsBetter),
                (11, Direction::HigherIsBetter),
            ]
        );
    }

    #[test]
    fn repeated_abbreviation_is_disambiguated() {
        let stats = active_stats(&[
            RawScoringItem { stat_id: Some(26), is_reverse_item: None },
            RawScoringItem { stat_id: Some(3), is_reverse_item: None },
            RawScoringItem { stat_id: Some(99), is_reverse_item: None },
            RawScoringItem { stat_id: None, is_reverse_item: None },
        ]);
        let keys: Vec<&str> = stats.iter().map(|s| s.category.id.as_str()).collect();
        assert_eq!(keys, vec!["AST", "AST#26"]);
    }

    #[test]
    fn decided_winners() {
        assert!(is_decided("HOME"));
        assert!(is_decided("AWAY"));
        assert!(is_decided("TIE"));
        assert!(!is_decided("UNDECIDED"));
        assert!(!is_decided(""));
    }
}
