// Integration tests: ESPN league response -> periods -> luck report.

use std::collections::HashMap;

use matchup_luck_core::{compute_luck, Direction, Exclusion, LuckConfig, LuckError, TeamId};
use matchup_luck_espn::LeagueSnapshot;
use serde_json::{json, Value};

// ===========================================================================
// Fixture helpers
// ===========================================================================

/// A side of a schedule entry with PTS (0), REB (6) and TO (11) scores.
fn side(team_id: u32, pts: f64, reb: f64, to: f64) -> Value {
    json!({
        "teamId": team_id,
        "cumulativeScore": {
            "scoreByStat": {
                "0":  { "score": pts, "result": "WIN" },
                "6":  { "score": reb, "result": "LOSS" },
                "11": { "score": to,  "result": "TIE" },
                "40": { "score": 900.0 }
            }
        }
    })
}

fn league(schedule: Vec<Value>) -> Value {
    json!({
        "settings": {
            "name": "Hardwood Degenerates",
            "scoringSettings": {
                "scoringItems": [
                    { "statId": 0 },
                    { "statId": 6 },
                    { "statId": 11, "isReverseItem": true }
                ]
            }
        },
        "teams": [
            { "id": 1, "abbrev": "ANT" },
            { "id": 2, "abbrev": "BUZZ" },
            { "id": 3, "abbrev": "CAT" },
            { "id": 4, "abbrev": "DUKE" }
        ],
        "schedule": schedule
    })
}

fn entry(period: u32, winner: &str, home: Value, away: Value) -> Value {
    json!({ "matchupPeriodId": period, "winner": winner, "home": home, "away": away })
}

fn two_weeks() -> Value {
    league(vec![
        entry(1, "HOME", side(1, 500.0, 200.0, 40.0), side(2, 450.0, 180.0, 50.0)),
        entry(1, "AWAY", side(3, 300.0, 150.0, 60.0), side(4, 480.0, 190.0, 45.0)),
        entry(2, "HOME", side(1, 510.0, 210.0, 41.0), side(3, 320.0, 160.0, 58.0)),
        entry(2, "UNDECIDED", side(2, 400.0, 170.0, 52.0), side(4, 420.0, 175.0, 48.0)),
    ])
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn snapshot_reads_name_teams_and_active_stats() {
    let snapshot = LeagueSnapshot::from_json(&two_weeks()).unwrap();

    assert_eq!(snapshot.name, "Hardwood Degenerates");
    assert_eq!(snapshot.teams.len(), 4);
    assert_eq!(snapshot.teams[&2], "BUZZ");

    let keys: Vec<(&str, Direction)> = snapshot
        .stats
        .iter()
        .map(|s| (s.category.id.as_str(), s.category.direction))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("PTS", Direction::HigherIsBetter),
            ("REB", Direction::HigherIsBetter),
            ("TO", Direction::LowerIsBetter),
        ]
    );
}

#[test]
fn periods_track_completion_and_keep_only_active_stats() {
    let snapshot = LeagueSnapshot::from_json(&two_weeks()).unwrap();
    let periods = snapshot.periods();

    assert_eq!(periods.len(), 2);
    assert!(periods[0].complete);
    assert_eq!(periods[0].matchups.len(), 2);
    assert!(!periods[1].complete, "one undecided matchup leaves the week open");

    let ant = &periods[0].matchups[0].home;
    assert_eq!(ant.team.name, "ANT");
    assert_eq!(ant.totals.len(), 3, "MIN (stat 40) is not a scoring stat");
    assert_eq!(ant.totals.get(&"TO".into()), Some(40.0));
}

#[test]
fn end_to_end_luck_from_response() {
    let snapshot = LeagueSnapshot::from_json(&two_weeks()).unwrap();
    let config = LuckConfig::new(snapshot.category_set(&HashMap::new()).unwrap());
    let report = compute_luck(&snapshot.periods(), &config).unwrap();

    assert_eq!(report.periods, vec![1]);
    assert_eq!(report.excluded[0].period, 2);
    assert_eq!(report.excluded[0].reason, Exclusion::Incomplete);

    // Week 1: ANT sweeps everyone; CAT loses everything to everyone.
    let ant = report.record(TeamId(1), 1).unwrap();
    assert_eq!((ant.actual, ant.expected), (1.0, 1.0));
    let cat = report.record(TeamId(3), 1).unwrap();
    assert_eq!((cat.actual, cat.expected), (0.0, 0.0));

    // BUZZ loses 0-3 to ANT but would have swept CAT.
    let buzz = report.record(TeamId(2), 1).unwrap();
    assert_eq!(buzz.actual, 0.0);
    assert!(buzz.luck < 0.0);
    assert_eq!(report.most_unlucky.team.name, "BUZZ");
}

#[test]
fn direction_override_flips_turnovers() {
    let snapshot = LeagueSnapshot::from_json(&two_weeks()).unwrap();
    let overrides = HashMap::from([("TO".to_string(), Direction::HigherIsBetter)]);
    let set = snapshot.category_set(&overrides).unwrap();

    assert_eq!(
        set.get(&"TO".into()).map(|c| c.direction),
        Some(Direction::HigherIsBetter)
    );
}

#[test]
fn unknown_override_keys_are_reported_and_ignored() {
    let snapshot = LeagueSnapshot::from_json(&two_weeks()).unwrap();
    let overrides = HashMap::from([
        ("TOV".to_string(), Direction::HigherIsBetter),
        ("TO".to_string(), Direction::LowerIsBetter),
        ("BLKS".to_string(), Direction::LowerIsBetter),
    ]);

    assert_eq!(snapshot.unmatched_overrides(&overrides), vec!["BLKS", "TOV"]);

    let set = snapshot.category_set(&overrides).unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.get(&"TOV".into()).is_none());
    assert_eq!(
        set.get(&"TO".into()).map(|c| c.direction),
        Some(Direction::LowerIsBetter)
    );
}

#[test]
fn league_without_scoring_items_has_no_category_set() {
    let snapshot = LeagueSnapshot::from_json(&json!({ "teams": [] })).unwrap();
    assert_eq!(
        snapshot.category_set(&HashMap::new()),
        Err(LuckError::EmptyCategorySet)
    );
}

#[test]
fn bye_entry_becomes_a_bye_team() {
    let raw = league(vec![
        entry(1, "HOME", side(1, 500.0, 200.0, 40.0), side(2, 450.0, 180.0, 50.0)),
        json!({ "matchupPeriodId": 1, "winner": "HOME", "home": side(3, 300.0, 150.0, 60.0) }),
    ]);
    let periods = LeagueSnapshot::from_json(&raw).unwrap().periods();

    assert_eq!(periods.len(), 1);
    assert!(periods[0].complete);
    assert_eq!(periods[0].matchups.len(), 1);
    assert_eq!(periods[0].byes.len(), 1);
    assert_eq!(periods[0].byes[0].team.id, TeamId(3));
}

#[test]
fn unknown_team_entries_are_skipped() {
    let raw = league(vec![
        entry(1, "HOME", side(1, 500.0, 200.0, 40.0), side(2, 450.0, 180.0, 50.0)),
        entry(1, "HOME", side(77, 1.0, 1.0, 1.0), side(3, 2.0, 2.0, 2.0)),
    ]);
    let periods = LeagueSnapshot::from_json(&raw).unwrap().periods();
    assert_eq!(periods[0].matchups.len(), 1);
}

#[test]
fn missing_stat_entry_surfaces_as_missing_category() {
    let mut short = side(2, 450.0, 180.0, 50.0);
    short["cumulativeScore"]["scoreByStat"]
        .as_object_mut()
        .unwrap()
        .remove("6");
    let raw = league(vec![entry(1, "HOME", side(1, 500.0, 200.0, 40.0), short)]);

    let snapshot = LeagueSnapshot::from_json(&raw).unwrap();
    let config = LuckConfig::new(snapshot.category_set(&HashMap::new()).unwrap());
    let err = compute_luck(&snapshot.periods(), &config).unwrap_err();

    assert_eq!(
        err,
        LuckError::MissingCategoryData {
            team: TeamId(2),
            period: 1,
            category: "REB".into(),
        }
    );
}
