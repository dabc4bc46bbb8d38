// Referral count -> (category, level) lookup

use super::{levels_by_range, CatalogIntegrityError, Category, CategorySummary, Level, LevelRef};
use serde::{Deserialize, Serialize};

/// Level matched for a referral count, with its parent category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub category: CategorySummary,
    pub level: Level,
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    min: u64,
    max: u64,
    category: usize,
    level: usize,
}

/// Range starts of every level in ascending order, searched with a binary
/// search. `reach[i]` is the highest range end among entries `0..=i`, which
/// tells in O(1) whether an earlier level also covers a count.
#[derive(Debug, Clone, Default)]
pub struct TierIndex {
    entries: Vec<IndexEntry>,
    reach: Vec<u64>,
}

impl TierIndex {
    pub fn build(categories: &[Category]) -> Self {
        let entries: Vec<IndexEntry> = levels_by_range(categories)
            .into_iter()
            .map(|(c, l)| {
                let requirements = &categories[c].levels[l].requirements;
                IndexEntry {
                    min: requirements.min_referrals,
                    max: requirements.max_referrals,
                    category: c,
                    level: l,
                }
            })
            .collect();

        let mut reach = Vec::with_capacity(entries.len());
        let mut highest = 0;
        for entry in &entries {
            highest = highest.max(entry.max);
            reach.push(highest);
        }

        Self { entries, reach }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (category index, level index) of the single level covering `referrals`.
    /// `categories` must be the slice the index was built from.
    pub fn locate(
        &self,
        categories: &[Category],
        referrals: u64,
    ) -> Result<(usize, usize), CatalogIntegrityError> {
        // entries[..upper] all start at or below `referrals`
        let upper = self.entries.partition_point(|entry| entry.min <= referrals);
        if upper == 0 {
            return Err(CatalogIntegrityError::NoMatch { referrals });
        }

        let candidate = self.entries[upper - 1];
        let earlier_reaches = upper >= 2 && self.reach[upper - 2] >= referrals;
        if candidate.max >= referrals && !earlier_reaches {
            return Ok((candidate.category, candidate.level));
        }

        // Broken catalog: find out exactly what matched
        let mut matches = self.entries[..upper]
            .iter()
            .filter(|entry| entry.max >= referrals);
        match (matches.next(), matches.next()) {
            (None, _) => Err(CatalogIntegrityError::NoMatch { referrals }),
            (Some(only), None) => Ok((only.category, only.level)),
            (Some(first), Some(second)) => Err(CatalogIntegrityError::Ambiguous {
                referrals,
                first: level_ref(categories, first),
                second: level_ref(categories, second),
            }),
        }
    }
}

fn level_ref(categories: &[Category], entry: &IndexEntry) -> LevelRef {
    let category = &categories[entry.category];
    LevelRef::new(category, &category.levels[entry.level])
}
