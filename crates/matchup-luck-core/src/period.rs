// Teams, matchups and scoring periods as handed to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::CategoryTotals;

/// Stable team identifier. Ordering is used for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: TeamId(id),
            name: name.into(),
        }
    }
}

/// A team together with its category totals for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamTotals {
    pub team: Team,
    pub totals: CategoryTotals,
}

impl TeamTotals {
    pub fn new(team: Team, totals: CategoryTotals) -> Self {
        Self { team, totals }
    }
}

/// The actual scheduled pairing for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub home: TeamTotals,
    pub away: TeamTotals,
}

impl Matchup {
    pub fn new(home: TeamTotals, away: TeamTotals) -> Self {
        Self { home, away }
    }
}

/// One scoring window ("week").
///
/// `byes` holds teams that had no opponent this period. Whether they take
/// part in the round-robin baseline is decided by
/// [`ByePolicy`](crate::engine::ByePolicy).
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub index: u32,
    pub complete: bool,
    pub matchups: Vec<Matchup>,
    pub byes: Vec<TeamTotals>,
}

impl Period {
    /// A finished period, eligible for luck computation.
    pub fn completed(index: u32, matchups: Vec<Matchup>) -> Self {
        Self {
            index,
            complete: true,
            matchups,
            byes: Vec::new(),
        }
    }

    /// A period that is still being played.
    pub fn in_progress(index: u32, matchups: Vec<Matchup>) -> Self {
        Self {
            index,
            complete: false,
            matchups,
            byes: Vec::new(),
        }
    }

    pub fn with_byes(mut self, byes: Vec<TeamTotals>) -> Self {
        self.byes = byes;
        self
    }
}
