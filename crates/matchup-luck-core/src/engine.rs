// Luck engine: actual vs. round-robin expected result per team and period,
// season aggregation, and extreme-result lookup.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::category::CategorySet;
use crate::compare::tally;
use crate::error::LuckError;
use crate::period::{Period, Team, TeamId, TeamTotals};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How per-period luck is folded into a season figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
}

/// Treatment of a team that has no opponent in a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByePolicy {
    /// Drop the team from the period entirely.
    #[default]
    Exclude,
    /// Count the team as an opponent in everyone else's expected result, but
    /// give it no luck record of its own.
    Baseline,
    /// Fail the computation.
    Reject,
}

/// Everything the engine needs besides the periods themselves.
#[derive(Debug, Clone)]
pub struct LuckConfig {
    pub categories: CategorySet,
    pub aggregation: Aggregation,
    pub bye_policy: ByePolicy,
}

impl LuckConfig {
    pub fn new(categories: CategorySet) -> Self {
        Self {
            categories,
            aggregation: Aggregation::default(),
            bye_policy: ByePolicy::default(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_bye_policy(mut self, bye_policy: ByePolicy) -> Self {
        self.bye_policy = bye_policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Luck for one team in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LuckRecord {
    pub team: Team,
    pub period: u32,
    /// Category fraction won against the actual opponent.
    pub actual: f64,
    /// Mean category fraction against every other team present.
    pub expected: f64,
    /// `actual - expected`.
    pub luck: f64,
}

/// Aggregate luck for one team over all eligible periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonLuck {
    pub team: Team,
    pub luck: f64,
    pub periods: usize,
}

/// A single (team, period) luck score singled out from the records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeResult {
    pub team: Team,
    pub period: u32,
    pub luck: f64,
}

impl From<&LuckRecord> for ExtremeResult {
    fn from(record: &LuckRecord) -> Self {
        Self {
            team: record.team.clone(),
            period: record.period,
            luck: record.luck,
        }
    }
}

/// Why a period contributed nothing to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exclusion {
    Incomplete,
    NoMatchups,
    InsufficientTeams { teams: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExcludedPeriod {
    pub period: u32,
    pub reason: Exclusion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LuckReport {
    /// Eligible period indices, ascending.
    pub periods: Vec<u32>,
    /// One record per (team, eligible period), ordered by period then team id.
    pub records: Vec<LuckRecord>,
    /// Teams ranked by season luck, luckiest first.
    pub season: Vec<SeasonLuck>,
    pub most_unlucky: ExtremeResult,
    pub most_lucky: ExtremeResult,
    pub excluded: Vec<ExcludedPeriod>,
}

impl LuckReport {
    pub fn record(&self, team: TeamId, period: u32) -> Option<&LuckRecord> {
        self.records
            .iter()
            .find(|r| r.team.id == team && r.period == period)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Compute per-period luck, season luck and the extreme results.
///
/// Incomplete periods, periods without matchups and periods with fewer than
/// two teams are excluded and listed in [`LuckReport::excluded`]. Missing or
/// non-finite category data anywhere aborts the whole computation.
pub fn compute_luck(periods: &[Period], config: &LuckConfig) -> Result<LuckReport, LuckError> {
    let mut ordered: Vec<&Period> = periods.iter().collect();
    ordered.sort_by_key(|p| p.index);
    if let Some(pair) = ordered.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(LuckError::DuplicatePeriod {
            period: pair[0].index,
        });
    }

    let mut eligible = Vec::new();
    let mut records = Vec::new();
    let mut excluded = Vec::new();

    for period in ordered {
        if let Some(reason) = precheck(period) {
            debug!(period = period.index, ?reason, "skipping period");
            excluded.push(ExcludedPeriod {
                period: period.index,
                reason,
            });
            continue;
        }

        match score_period(period, config) {
            Ok(mut period_records) => {
                debug!(
                    period = period.index,
                    teams = period_records.len(),
                    "scored period"
                );
                eligible.push(period.index);
                records.append(&mut period_records);
            }
            Err(LuckError::InsufficientTeams { period, teams }) => {
                warn!(
                    "excluding period {}: only {} team(s) present, need at least 2",
                    period, teams
                );
                excluded.push(ExcludedPeriod {
                    period,
                    reason: Exclusion::InsufficientTeams { teams },
                });
            }
            Err(e) => return Err(e),
        }
    }

    let (Some(most_unlucky), Some(most_lucky)) = (most_unlucky(&records), most_lucky(&records))
    else {
        return Err(LuckError::NoCompletedPeriods);
    };
    let season = aggregate(&records, config.aggregation);

    Ok(LuckReport {
        periods: eligible,
        records,
        season,
        most_unlucky,
        most_lucky,
        excluded,
    })
}

// ---------------------------------------------------------------------------
// Per-period scoring
// ---------------------------------------------------------------------------

fn precheck(period: &Period) -> Option<Exclusion> {
    if !period.complete {
        Some(Exclusion::Incomplete)
    } else if period.matchups.is_empty() {
        Some(Exclusion::NoMatchups)
    } else {
        None
    }
}

/// A team taking part in one period's round robin.
struct Entrant<'a> {
    entry: &'a TeamTotals,
    /// Index of the actual opponent in the field; `None` for a bye.
    opponent: Option<usize>,
}

fn build_field<'a>(period: &'a Period, policy: ByePolicy) -> Result<Vec<Entrant<'a>>, LuckError> {
    // Every listed team, byes included, is checked for duplicates before the
    // bye policy decides who takes part. A team paired with itself counts
    // once here; it is caught by the team count or the field check below.
    let mut seen = HashSet::new();
    let listed = period
        .matchups
        .iter()
        .flat_map(|m| {
            let away = (m.away.team.id != m.home.team.id).then_some(&m.away);
            std::iter::once(&m.home).chain(away)
        })
        .chain(&period.byes);
    for entry in listed {
        if !seen.insert(entry.team.id) {
            return Err(LuckError::DuplicateTeam {
                team: entry.team.id,
                period: period.index,
            });
        }
    }

    let mut field = Vec::with_capacity(period.matchups.len() * 2 + period.byes.len());
    for matchup in &period.matchups {
        let home = field.len();
        field.push(Entrant {
            entry: &matchup.home,
            opponent: Some(home + 1),
        });
        field.push(Entrant {
            entry: &matchup.away,
            opponent: Some(home),
        });
    }

    for bye in &period.byes {
        match policy {
            ByePolicy::Exclude => {}
            ByePolicy::Baseline => field.push(Entrant {
                entry: bye,
                opponent: None,
            }),
            ByePolicy::Reject => {
                return Err(LuckError::UnpairedTeam {
                    team: bye.team.id,
                    period: period.index,
                })
            }
        }
    }

    let distinct: BTreeSet<TeamId> = field.iter().map(|e| e.entry.team.id).collect();
    if distinct.len() < 2 {
        return Err(LuckError::InsufficientTeams {
            period: period.index,
            teams: distinct.len(),
        });
    }
    if distinct.len() != field.len() {
        if let Some(matchup) = period.matchups.iter().find(|m| m.home.team.id == m.away.team.id) {
            return Err(LuckError::DuplicateTeam {
                team: matchup.home.team.id,
                period: period.index,
            });
        }
    }

    Ok(field)
}

fn score_period(period: &Period, config: &LuckConfig) -> Result<Vec<LuckRecord>, LuckError> {
    let field = build_field(period, config.bye_policy)?;
    let versus = |ours: &TeamTotals, theirs: &TeamTotals| {
        tally(&ours.totals, &theirs.totals, &config.categories)
            .map_err(|e| LuckError::from_compare(e, ours.team.id, theirs.team.id, period.index))
    };

    // Expected results are accumulated as integer half-points so the value
    // does not depend on the order opponents are visited in.
    let per_opponent = 2 * config.categories.len();
    let opponents = field.len() - 1;

    let mut records = Vec::with_capacity(field.len());
    for (i, entrant) in field.iter().enumerate() {
        // Every team is checked against the full field, including byes, so
        // bad category data surfaces even for teams without a record.
        let mut half_points = 0;
        for (j, other) in field.iter().enumerate() {
            if i != j {
                half_points += versus(entrant.entry, other.entry)?.half_points();
            }
        }
        let expected = half_points as f64 / (per_opponent * opponents) as f64;

        let Some(opponent) = entrant.opponent else {
            continue;
        };
        let actual = versus(entrant.entry, field[opponent].entry)?.fraction();

        records.push(LuckRecord {
            team: entrant.entry.team.clone(),
            period: period.index,
            actual,
            expected,
            luck: actual - expected,
        });
    }

    records.sort_by_key(|r| r.team.id);
    Ok(records)
}

// ---------------------------------------------------------------------------
// Aggregation and extremes
// ---------------------------------------------------------------------------

fn aggregate(records: &[LuckRecord], aggregation: Aggregation) -> Vec<SeasonLuck> {
    let mut by_team: BTreeMap<TeamId, (&Team, f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_team
            .entry(record.team.id)
            .or_insert((&record.team, 0.0, 0));
        entry.1 += record.luck;
        entry.2 += 1;
    }

    let mut season: Vec<SeasonLuck> = by_team
        .into_values()
        .map(|(team, total, periods)| SeasonLuck {
            team: team.clone(),
            luck: match aggregation {
                Aggregation::Mean => total / periods as f64,
                Aggregation::Sum => total,
            },
            periods,
        })
        .collect();

    season.sort_by(|a, b| {
        b.luck
            .partial_cmp(&a.luck)
            .unwrap_or(Ordering::Equal)
            .then(a.team.id.cmp(&b.team.id))
    });
    season
}

/// Ordering used to break luck ties: earliest period, then lowest team id.
fn tie_break(a: &LuckRecord, b: &LuckRecord) -> Ordering {
    a.period.cmp(&b.period).then(a.team.id.cmp(&b.team.id))
}

/// The record with the lowest luck score. Ties go to the earliest period,
/// then the lowest team id, regardless of input order.
pub fn most_unlucky(records: &[LuckRecord]) -> Option<ExtremeResult> {
    records
        .iter()
        .min_by(|a, b| {
            a.luck
                .partial_cmp(&b.luck)
                .unwrap_or(Ordering::Equal)
                .then_with(|| tie_break(a, b))
        })
        .map(ExtremeResult::from)
}

/// The record with the highest luck score, with the same tie-break as
/// [`most_unlucky`].
pub fn most_lucky(records: &[LuckRecord]) -> Option<ExtremeResult> {
    records
        .iter()
        .min_by(|a, b| {
            b.luck
                .partial_cmp(&a.luck)
                .unwrap_or(Ordering::Equal)
                .then_with(|| tie_break(a, b))
        })
        .map(ExtremeResult::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, CategoryTotals};
    use crate::period::Matchup;

    fn points_only() -> LuckConfig {
        LuckConfig::new(CategorySet::new(vec![Category::higher("PTS")]).unwrap())
    }

    fn entry(id: u32, name: &str, pts: f64) -> TeamTotals {
        let totals: CategoryTotals = [("PTS", pts)].into_iter().collect();
        TeamTotals::new(Team::new(id, name), totals)
    }

    fn record(id: u32, period: u32, luck: f64) -> LuckRecord {
        LuckRecord {
            team: Team::new(id, format!("T{id}")),
            period,
            actual: 0.0,
            expected: 0.0,
            luck,
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lucky_win_against_weak_opponent() {
        // B (80) beats D (70) but would lose to A and C.
        let period = Period::completed(
            1,
            vec![
                Matchup::new(entry(1, "A", 100.0), entry(3, "C", 90.0)),
                Matchup::new(entry(2, "B", 80.0), entry(4, "D", 70.0)),
            ],
        );
        let report = compute_luck(&[period], &points_only()).unwrap();

        let b = report.record(TeamId(2), 1).unwrap();
        assert!(approx_eq(b.actual, 1.0));
        assert!(approx_eq(b.expected, 1.0 / 3.0));
        assert!(approx_eq(b.luck, 2.0 / 3.0));

        let c = report.record(TeamId(3), 1).unwrap();
        assert!(approx_eq(c.actual, 0.0));
        assert!(approx_eq(c.expected, 2.0 / 3.0));
        assert!(approx_eq(c.luck, -2.0 / 3.0));

        assert_eq!(report.most_lucky.team.id, TeamId(2));
        assert_eq!(report.most_unlucky.team.id, TeamId(3));
    }

    #[test]
    fn incomplete_periods_are_excluded_not_scored() {
        let periods = vec![
            Period::completed(1, vec![Matchup::new(entry(1, "A", 10.0), entry(2, "B", 5.0))]),
            Period::in_progress(2, vec![Matchup::new(entry(1, "A", 1.0), entry(2, "B", 5.0))]),
        ];
        let report = compute_luck(&periods, &points_only()).unwrap();

        assert_eq!(report.periods, vec![1]);
        assert_eq!(report.records.len(), 2);
        assert_eq!(
            report.excluded,
            vec![ExcludedPeriod {
                period: 2,
                reason: Exclusion::Incomplete
            }]
        );
    }

    #[test]
    fn period_without_matchups_is_excluded() {
        let periods = vec![
            Period::completed(1, vec![]),
            Period::completed(2, vec![Matchup::new(entry(1, "A", 3.0), entry(2, "B", 4.0))]),
        ];
        let report = compute_luck(&periods, &points_only()).unwrap();
        assert_eq!(report.periods, vec![2]);
        assert_eq!(report.excluded[0].reason, Exclusion::NoMatchups);
        assert!(report.season.iter().all(|s| s.periods == 1));
    }

    #[test]
    fn self_matchup_is_insufficient_and_excluded() {
        let periods = vec![
            Period::completed(1, vec![Matchup::new(entry(1, "A", 3.0), entry(1, "A", 3.0))]),
            Period::completed(2, vec![Matchup::new(entry(1, "A", 3.0), entry(2, "B", 4.0))]),
        ];
        let report = compute_luck(&periods, &points_only()).unwrap();
        assert_eq!(report.periods, vec![2]);
        assert_eq!(
            report.excluded,
            vec![ExcludedPeriod {
                period: 1,
                reason: Exclusion::InsufficientTeams { teams: 1 }
            }]
        );
    }

    #[test]
    fn no_eligible_periods_is_fatal() {
        let periods = vec![Period::in_progress(
            1,
            vec![Matchup::new(entry(1, "A", 3.0), entry(2, "B", 4.0))],
        )];
        assert_eq!(
            compute_luck(&periods, &points_only()),
            Err(LuckError::NoCompletedPeriods)
        );
        assert_eq!(
            compute_luck(&[], &points_only()),
            Err(LuckError::NoCompletedPeriods)
        );
    }

    #[test]
    fn team_in_two_matchups_is_rejected() {
        let period = Period::completed(
            4,
            vec![
                Matchup::new(entry(1, "A", 3.0), entry(2, "B", 4.0)),
                Matchup::new(entry(3, "C", 3.0), entry(2, "B", 4.0)),
            ],
        );
        assert_eq!(
            compute_luck(&[period], &points_only()),
            Err(LuckError::DuplicateTeam {
                team: TeamId(2),
                period: 4
            })
        );
    }

    #[test]
    fn repeated_period_index_is_rejected() {
        let m = || vec![Matchup::new(entry(1, "A", 3.0), entry(2, "B", 4.0))];
        let periods = vec![Period::completed(3, m()), Period::completed(3, m())];
        assert_eq!(
            compute_luck(&periods, &points_only()),
            Err(LuckError::DuplicatePeriod { period: 3 })
        );
    }

    #[test]
    fn missing_category_names_team_and_period() {
        let config = LuckConfig::new(
            CategorySet::new(vec![Category::higher("PTS"), Category::higher("REB")]).unwrap(),
        );
        let full = |id, name| {
            let totals: CategoryTotals = [("PTS", 50.0), ("REB", 20.0)].into_iter().collect();
            TeamTotals::new(Team::new(id, name), totals)
        };
        let period = Period::completed(
            7,
            vec![
                Matchup::new(full(1, "A"), full(2, "B")),
                Matchup::new(full(3, "C"), entry(4, "D", 44.0)),
            ],
        );

        assert_eq!(
            compute_luck(&[period], &config),
            Err(LuckError::MissingCategoryData {
                team: TeamId(4),
                period: 7,
                category: "REB".into(),
            })
        );
    }

    #[test]
    fn bye_excluded_by_default() {
        let period = Period::completed(1, vec![Matchup::new(entry(1, "A", 100.0), entry(2, "B", 80.0))])
            .with_byes(vec![entry(3, "C", 90.0)]);
        let report = compute_luck(&[period], &points_only()).unwrap();

        assert_eq!(report.records.len(), 2);
        assert!(report.record(TeamId(3), 1).is_none());
        assert!(approx_eq(report.record(TeamId(1), 1).unwrap().luck, 0.0));
    }

    #[test]
    fn bye_counts_in_baseline_when_configured() {
        let period = Period::completed(1, vec![Matchup::new(entry(1, "A", 100.0), entry(2, "B", 80.0))])
            .with_byes(vec![entry(3, "C", 90.0)]);
        let config = points_only().with_bye_policy(ByePolicy::Baseline);
        let report = compute_luck(&[period], &config).unwrap();

        // C gets no record, but B's expected now includes a loss to C.
        assert_eq!(report.records.len(), 2);
        assert!(report.record(TeamId(3), 1).is_none());
        let b = report.record(TeamId(2), 1).unwrap();
        assert!(approx_eq(b.expected, 0.0));
        assert!(approx_eq(b.luck, 0.0));
        let a = report.record(TeamId(1), 1).unwrap();
        assert!(approx_eq(a.expected, 1.0));
    }

    #[test]
    fn bye_rejected_when_configured() {
        let period = Period::completed(2, vec![Matchup::new(entry(1, "A", 100.0), entry(2, "B", 80.0))])
            .with_byes(vec![entry(3, "C", 90.0)]);
        let config = points_only().with_bye_policy(ByePolicy::Reject);
        assert_eq!(
            compute_luck(&[period], &config),
            Err(LuckError::UnpairedTeam {
                team: TeamId(3),
                period: 2
            })
        );
    }

    fn listed_twice_via_bye() -> Period {
        Period::completed(1, vec![Matchup::new(entry(1, "A", 100.0), entry(2, "B", 80.0))])
            .with_byes(vec![entry(2, "B", 80.0)])
    }

    #[test]
    fn team_with_matchup_and_bye_is_rejected_under_every_policy() {
        for policy in [ByePolicy::Exclude, ByePolicy::Baseline, ByePolicy::Reject] {
            let config = points_only().with_bye_policy(policy);
            assert_eq!(
                compute_luck(&[listed_twice_via_bye()], &config),
                Err(LuckError::DuplicateTeam {
                    team: TeamId(2),
                    period: 1
                }),
                "{policy:?}"
            );
        }
    }

    #[test]
    fn self_matchup_beside_real_matchup_is_rejected() {
        let period = Period::completed(
            5,
            vec![
                Matchup::new(entry(1, "A", 3.0), entry(1, "A", 3.0)),
                Matchup::new(entry(2, "B", 3.0), entry(3, "C", 4.0)),
            ],
        );
        assert_eq!(
            compute_luck(&[period], &points_only()),
            Err(LuckError::DuplicateTeam {
                team: TeamId(1),
                period: 5
            })
        );
    }

    #[test]
    fn non_finite_value_names_the_offending_team() {
        let period = Period::completed(
            3,
            vec![
                Matchup::new(entry(1, "A", 50.0), entry(2, "B", f64::INFINITY)),
                Matchup::new(entry(3, "C", 40.0), entry(4, "D", 30.0)),
            ],
        );
        assert_eq!(
            compute_luck(&[period], &points_only()),
            Err(LuckError::NonFiniteValue {
                team: TeamId(2),
                period: 3,
                category: "PTS".into(),
            })
        );
    }

    #[test]
    fn sum_aggregation_adds_period_luck() {
        let periods = vec![
            Period::completed(
                1,
                vec![
                    Matchup::new(entry(1, "A", 100.0), entry(3, "C", 90.0)),
                    Matchup::new(entry(2, "B", 80.0), entry(4, "D", 70.0)),
                ],
            ),
            Period::completed(
                2,
                vec![
                    Matchup::new(entry(1, "A", 100.0), entry(2, "B", 90.0)),
                    Matchup::new(entry(3, "C", 80.0), entry(4, "D", 70.0)),
                ],
            ),
        ];
        let mean = compute_luck(&periods, &points_only()).unwrap();
        let sum = compute_luck(&periods, &points_only().with_aggregation(Aggregation::Sum)).unwrap();

        let luck_of = |report: &LuckReport, id| {
            report
                .season
                .iter()
                .find(|s| s.team.id == TeamId(id))
                .map(|s| s.luck)
                .unwrap()
        };
        // C: -2/3 in period 1, +2/3 in period 2 (beats D, expected 1/3).
        assert!(approx_eq(luck_of(&sum, 3), 0.0));
        // B: +2/3 then -2/3.
        assert!(approx_eq(luck_of(&mean, 2), 0.0));
        assert!(approx_eq(luck_of(&sum, 2), 0.0));
        assert!(approx_eq(luck_of(&sum, 1), 0.0));
    }

    #[test]
    fn season_ranking_is_descending_with_id_tie_break() {
        let period = Period::completed(
            1,
            vec![
                Matchup::new(entry(1, "A", 100.0), entry(3, "C", 90.0)),
                Matchup::new(entry(2, "B", 80.0), entry(4, "D", 70.0)),
            ],
        );
        let report = compute_luck(&[period], &points_only()).unwrap();
        let order: Vec<u32> = report.season.iter().map(|s| s.team.id.0).collect();
        // B +2/3, A 0, D 0, C -2/3.
        assert_eq!(order, vec![2, 1, 4, 3]);
    }

    #[test]
    fn most_unlucky_prefers_earliest_period() {
        let records = vec![record(1, 1, -0.3), record(2, 2, -0.5), record(2, 1, -0.5)];
        let worst = most_unlucky(&records).unwrap();
        assert_eq!(worst.team.id, TeamId(2));
        assert_eq!(worst.period, 1);
        assert!(approx_eq(worst.luck, -0.5));
    }

    #[test]
    fn most_unlucky_same_period_prefers_lowest_team_id() {
        let records = vec![record(9, 3, -0.25), record(4, 3, -0.25), record(6, 3, 0.1)];
        assert_eq!(most_unlucky(&records).unwrap().team.id, TeamId(4));
        assert_eq!(most_lucky(&records).unwrap().team.id, TeamId(6));
    }

    #[test]
    fn extremes_of_empty_records() {
        assert!(most_unlucky(&[]).is_none());
        assert!(most_lucky(&[]).is_none());
    }
}
