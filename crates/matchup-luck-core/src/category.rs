// Scoring categories, their direction, and per-team category totals.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::LuckError;

// ---------------------------------------------------------------------------
// Category identity and direction
// ---------------------------------------------------------------------------

/// Identifier of one scored statistic (e.g. `PTS`, `FG%`, `TO`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which side of a numeric comparison wins a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "higher", alias = "higher_is_better")]
    HigherIsBetter,
    #[serde(rename = "lower", alias = "lower_is_better")]
    LowerIsBetter,
}

impl Direction {
    /// True when `ours` beats `theirs`. Equal values never beat each other.
    pub fn beats(self, ours: f64, theirs: f64) -> bool {
        match self {
            Direction::HigherIsBetter => ours > theirs,
            Direction::LowerIsBetter => ours < theirs,
        }
    }
}

/// A scored category plus its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub direction: Direction,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            direction,
        }
    }

    /// Shorthand for a higher-is-better category.
    pub fn higher(id: impl Into<CategoryId>) -> Self {
        Self::new(id, Direction::HigherIsBetter)
    }

    /// Shorthand for a lower-is-better category (turnovers and the like).
    pub fn lower(id: impl Into<CategoryId>) -> Self {
        Self::new(id, Direction::LowerIsBetter)
    }
}

// ---------------------------------------------------------------------------
// Category set
// ---------------------------------------------------------------------------

/// The non-empty, duplicate-free set of categories scored in a league.
///
/// Insertion order is preserved for display purposes only; comparison results
/// never depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Result<Self, LuckError> {
        if categories.is_empty() {
            return Err(LuckError::EmptyCategorySet);
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(&category.id) {
                return Err(LuckError::DuplicateCategory {
                    category: category.id.clone(),
                });
            }
        }
        Ok(Self { categories })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

// ---------------------------------------------------------------------------
// Category totals
// ---------------------------------------------------------------------------

/// One team's category values for one period. Immutable once collected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    values: HashMap<CategoryId, f64>,
}

impl CategoryTotals {
    pub fn get(&self, id: &CategoryId) -> Option<f64> {
        self.values.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<CategoryId>> FromIterator<(K, f64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
