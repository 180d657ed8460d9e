// Error types for comparison and luck computation.

use std::fmt;
use thiserror::Error;

use crate::category::CategoryId;
use crate::period::TeamId;

/// Which input of a comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ours,
    Theirs,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Ours => f.write_str("first"),
            Side::Theirs => f.write_str("second"),
        }
    }
}

/// Failure of a single head-to-head comparison. Carries no team or period;
/// the engine attaches those when it converts to [`LuckError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("{side} totals are missing category {category}")]
    MissingCategory { side: Side, category: CategoryId },

    #[error("{side} totals have a non-finite value for category {category}")]
    NonFinite { side: Side, category: CategoryId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LuckError {
    #[error("team {team} has no value for category {category} in period {period}")]
    MissingCategoryData {
        team: TeamId,
        period: u32,
        category: CategoryId,
    },

    #[error("team {team} has a non-finite value for category {category} in period {period}")]
    NonFiniteValue {
        team: TeamId,
        period: u32,
        category: CategoryId,
    },

    #[error("period {period} has {teams} team(s); at least 2 are needed")]
    InsufficientTeams { period: u32, teams: usize },

    #[error("no completed periods with enough teams to compute luck")]
    NoCompletedPeriods,

    #[error("category set is empty")]
    EmptyCategorySet,

    #[error("category {category} is listed more than once")]
    DuplicateCategory { category: CategoryId },

    #[error("team {team} appears more than once in period {period}")]
    DuplicateTeam { team: TeamId, period: u32 },

    #[error("period {period} is listed more than once")]
    DuplicatePeriod { period: u32 },

    #[error("team {team} has no opponent in period {period} and byes are rejected")]
    UnpairedTeam { team: TeamId, period: u32 },
}

impl LuckError {
    /// Attach team and period context to a comparison failure.
    pub(crate) fn from_compare(err: CompareError, ours: TeamId, theirs: TeamId, period: u32) -> Self {
        let team_for = |side: Side| match side {
            Side::Ours => ours,
            Side::Theirs => theirs,
        };
        match err {
            CompareError::MissingCategory { side, category } => LuckError::MissingCategoryData {
                team: team_for(side),
                period,
                category,
            },
            CompareError::NonFinite { side, category } => LuckError::NonFiniteValue {
                team: team_for(side),
                period,
                category,
            },
        }
    }
}
