// ESPN fantasy basketball stat identifiers.

use matchup_luck_core::Direction;

/// ESPN stat id → display abbreviation, indexed by stat id.
///
/// Some abbreviations repeat (per-game variants of counting stats); callers
/// that need unique keys must disambiguate.
const STAT_ABBREVIATIONS: [&str; 44] = [
    "PTS",  // 0  points
    "BLK",  // 1  blocks
    "STL",  // 2  steals
    "AST",  // 3  assists
    "OREB", // 4  offensive rebounds
    "DREB", // 5  defensive rebounds
    "REB",  // 6  rebounds
    "EJ",   // 7  ejections
    "FF",   // 8  flagrant fouls
    "PF",   // 9  personal fouls
    "TF",   // 10 technical fouls
    "TO",   // 11 turnovers
    "DQ",   // 12 disqualifications
    "FGM",  // 13
    "FGA",  // 14
    "FTM",  // 15
    "FTA",  // 16
    "3PM",  // 17
    "3PA",  // 18
    "FG%",  // 19
    "FT%",  // 20
    "3P%",  // 21
    "AFG%", // 22 adjusted field goal percentage
    "FGMI", // 23 field goals missed
    "FTMI", // 24 free throws missed
    "3PMI", // 25 three pointers missed
    "AST",  // 26 per game
    "BLK",  // 27 per game
    "MIN",  // 28 per game
    "PTS",  // 29 per game
    "REB",  // 30 per game
    "STL",  // 31 per game
    "TO",   // 32 per game
    "3PM",  // 33 per game
    "PPM",  // 34 points per minute
    "A/TO", // 35 assist to turnover ratio
    "STR",  // 36 steal to turnover ratio
    "DD",   // 37 double doubles
    "TD",   // 38 triple doubles
    "QD",   // 39 quadruple doubles
    "MIN",  // 40
    "GS",   // 41 games started
    "GP",   // 42 games played
    "TW",   // 43 team wins
];

/// Stats where the smaller total wins the category. Used only when the
/// league settings don't carry an explicit `isReverseItem` flag.
const LOWER_IS_BETTER: [u16; 10] = [7, 8, 9, 10, 11, 12, 23, 24, 25, 32];

pub fn abbreviation(stat_id: u16) -> Option<&'static str> {
    STAT_ABBREVIATIONS.get(stat_id as usize).copied()
}

pub fn default_direction(stat_id: u16) -> Direction {
    if LOWER_IS_BETTER.contains(&stat_id) {
        Direction::LowerIsBetter
    } else {
        Direction::HigherIsBetter
    }
}
