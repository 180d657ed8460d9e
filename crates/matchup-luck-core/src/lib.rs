// Luck computation engine: per-category head-to-head comparison, the
// round-robin expected result, and season aggregation.
//
// Pure computation only. Fetching, caching and rendering live in the
// `matchup-luck-espn` and `matchup-luck-cli` crates.

pub mod category;
pub mod compare;
pub mod engine;
pub mod error;
pub mod period;

pub use category::{Category, CategoryId, CategorySet, CategoryTotals, Direction};
pub use compare::{compare, tally, CategoryOutcome, CategoryTally};
pub use engine::{
    compute_luck, most_lucky, most_unlucky, Aggregation, ByePolicy, ExcludedPeriod, Exclusion,
    ExtremeResult, LuckConfig, LuckRecord, LuckReport, SeasonLuck,
};
pub use error::{CompareError, LuckError, Side};
pub use period::{Matchup, Period, Team, TeamId, TeamTotals};
