// Head-to-head category comparison between two teams' totals.

use crate::category::{Category, CategorySet, CategoryTotals};
use crate::error::{CompareError, Side};

/// Result of one category from the first team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutcome {
    Win,
    Tie,
    Loss,
}

/// Win/tie/loss counts across a category set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTally {
    pub wins: usize,
    pub ties: usize,
    pub losses: usize,
}

impl CategoryTally {
    pub fn total(&self) -> usize {
        self.wins + self.ties + self.losses
    }

    /// Wins count two, ties one.
    pub fn half_points(&self) -> usize {
        2 * self.wins + self.ties
    }

    /// `(wins + 0.5 * ties) / total`, or 0.0 for an empty tally.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / total as f64
    }

    fn record(&mut self, outcome: CategoryOutcome) {
        match outcome {
            CategoryOutcome::Win => self.wins += 1,
            CategoryOutcome::Tie => self.ties += 1,
            CategoryOutcome::Loss => self.losses += 1,
        }
    }
}

/// Decide one category. Exact equality is a tie.
pub fn judge(category: &Category, ours: f64, theirs: f64) -> CategoryOutcome {
    if ours == theirs {
        CategoryOutcome::Tie
    } else if category.direction.beats(ours, theirs) {
        CategoryOutcome::Win
    } else {
        CategoryOutcome::Loss
    }
}

/// Count wins, ties and losses for `ours` against `theirs` over every
/// category in `categories`.
pub fn tally(
    ours: &CategoryTotals,
    theirs: &CategoryTotals,
    categories: &CategorySet,
) -> Result<CategoryTally, CompareError> {
    let mut tally = CategoryTally::default();
    for category in categories {
        let a = value_of(ours, Side::Ours, category)?;
        let b = value_of(theirs, Side::Theirs, category)?;
        tally.record(judge(category, a, b));
    }
    Ok(tally)
}

/// Fraction of categories won by `ours` against `theirs`, with ties counted
/// as half a win. Always in `[0, 1]`.
pub fn compare(
    ours: &CategoryTotals,
    theirs: &CategoryTotals,
    categories: &CategorySet,
) -> Result<f64, CompareError> {
    tally(ours, theirs, categories).map(|t| t.fraction())
}

fn value_of(totals: &CategoryTotals, side: Side, category: &Category) -> Result<f64, CompareError> {
    let value = totals
        .get(&category.id)
        .ok_or_else(|| CompareError::MissingCategory {
            side,
            category: category.id.clone(),
        })?;
    if !value.is_finite() {
        return Err(CompareError::NonFinite {
            side,
            category: category.id.clone(),
        });
    }
    Ok(value)
}
