// Catalog invariant checks
//
// Every check runs on every call so an admin gets the full list of problems
// in one pass. Pure and deterministic: same input, same report.

use super::{levels_by_range, Category, Level, LevelRef};
use crate::config::{MAX_PERCENT, MIN_PERCENT, UNBOUNDED_REFERRALS};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

/// Which invariant a violation breaks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Invariant {
    EmptyCatalog,
    DuplicateCategoryId,
    DuplicateLevelId,
    InvertedRange,
    PercentOutOfRange,
    InvalidReward,
    StartsAtZero,
    Gap,
    Overlap,
    UnboundedLast,
    MonotonicCommission,
    LevelShareWithinTotal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    EmptyCatalog,
    DuplicateCategoryId {
        id: String,
    },
    DuplicateLevelId {
        category_id: String,
        level_id: String,
    },
    InvertedRange {
        level: LevelRef,
        min: u64,
        max: u64,
    },
    PercentOutOfRange {
        level: LevelRef,
        field: &'static str,
        value: f64,
    },
    InvalidReward {
        level: LevelRef,
        value: f64,
    },
    DoesNotStartAtZero {
        level: LevelRef,
        min: u64,
    },
    Gap {
        previous: LevelRef,
        next: LevelRef,
        previous_max: u64,
        next_min: u64,
        expected_min: u64,
    },
    Overlap {
        previous: LevelRef,
        next: LevelRef,
        previous_max: u64,
        next_min: u64,
        expected_min: u64,
    },
    NotUnbounded {
        level: LevelRef,
        max: u64,
    },
    DecreasingCommission {
        previous: LevelRef,
        next: LevelRef,
        previous_rev_total: f64,
        next_rev_total: f64,
    },
    LevelShareExceedsTotal {
        level: LevelRef,
        rev_total: f64,
        rev_level1: f64,
    },
}

impl Violation {
    pub fn invariant(&self) -> Invariant {
        match self {
            Self::EmptyCatalog => Invariant::EmptyCatalog,
            Self::DuplicateCategoryId { .. } => Invariant::DuplicateCategoryId,
            Self::DuplicateLevelId { .. } => Invariant::DuplicateLevelId,
            Self::InvertedRange { .. } => Invariant::InvertedRange,
            Self::PercentOutOfRange { .. } => Invariant::PercentOutOfRange,
            Self::InvalidReward { .. } => Invariant::InvalidReward,
            Self::DoesNotStartAtZero { .. } => Invariant::StartsAtZero,
            Self::Gap { .. } => Invariant::Gap,
            Self::Overlap { .. } => Invariant::Overlap,
            Self::NotUnbounded { .. } => Invariant::UnboundedLast,
            Self::DecreasingCommission { .. } => Invariant::MonotonicCommission,
            Self::LevelShareExceedsTotal { .. } => Invariant::LevelShareWithinTotal,
        }
    }

    /// Levels implicated by this violation, in catalog sort order
    pub fn levels(&self) -> Vec<&LevelRef> {
        match self {
            Self::EmptyCatalog | Self::DuplicateCategoryId { .. } | Self::DuplicateLevelId { .. } => {
                Vec::new()
            }
            Self::InvertedRange { level, .. }
            | Self::PercentOutOfRange { level, .. }
            | Self::InvalidReward { level, .. }
            | Self::DoesNotStartAtZero { level, .. }
            | Self::NotUnbounded { level, .. }
            | Self::LevelShareExceedsTotal { level, .. } => vec![level],
            Self::Gap { previous, next, .. }
            | Self::Overlap { previous, next, .. }
            | Self::DecreasingCommission { previous, next, .. } => vec![previous, next],
        }
    }
}

struct Bound(u64);

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == UNBOUNDED_REFERRALS {
            write!(f, "unbounded")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "catalog has no levels"),
            Self::DuplicateCategoryId { id } => write!(f, "duplicate category id '{}'", id),
            Self::DuplicateLevelId {
                category_id,
                level_id,
            } => write!(
                f,
                "duplicate level id '{}' in category '{}'",
                level_id, category_id
            ),
            Self::InvertedRange { level, min, max } => write!(
                f,
                "{} has minReferrals={} greater than maxReferrals={}",
                level, min, max
            ),
            Self::PercentOutOfRange {
                level,
                field,
                value,
            } => write!(
                f,
                "{} has {}={} outside [{}, {}]",
                level, field, value, MIN_PERCENT, MAX_PERCENT
            ),
            Self::InvalidReward { level, value } => write!(
                f,
                "{} has levelUpReward={}: expected a non-negative amount",
                level, value
            ),
            Self::DoesNotStartAtZero { level, min } => write!(
                f,
                "first level {} starts at min={}: expected min=0",
                level, min
            ),
            Self::Gap {
                previous,
                next,
                previous_max,
                next_min,
                expected_min,
            } => write!(
                f,
                "gap between {} (max={}) and {} (min={}): expected min={}",
                previous,
                Bound(*previous_max),
                next,
                next_min,
                expected_min
            ),
            Self::Overlap {
                previous,
                next,
                previous_max,
                next_min,
                expected_min,
            } => write!(
                f,
                "overlap between {} (max={}) and {} (min={}): expected min={}",
                previous,
                Bound(*previous_max),
                next,
                next_min,
                Bound(*expected_min)
            ),
            Self::NotUnbounded { level, max } => write!(
                f,
                "last level {} ends at max={}: expected unbounded",
                level, max
            ),
            Self::DecreasingCommission {
                previous,
                next,
                previous_rev_total,
                next_rev_total,
            } => write!(
                f,
                "revTotal decreases from {} ({:.2}) to {} ({:.2})",
                previous, previous_rev_total, next, next_rev_total
            ),
            Self::LevelShareExceedsTotal {
                level,
                rev_total,
                rev_level1,
            } => write!(
                f,
                "{} has revLevel1={:.2} greater than revTotal={:.2}",
                level, rev_level1, rev_total
            ),
        }
    }
}

/// Every violation found in a candidate catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn contains(&self, invariant: Invariant) -> bool {
        self.violations.iter().any(|v| v.invariant() == invariant)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

pub type ValidationResult = Result<(), ValidationReport>;

/// Check a candidate catalog against every tier invariant
pub fn validate(categories: &[Category]) -> ValidationResult {
    let mut violations = Vec::new();

    // 1. per-level checks, in catalog order
    check_identifiers(categories, &mut violations);
    for category in categories {
        for level in &category.levels {
            check_level(category, level, &mut violations);
        }
    }

    let sorted: Vec<(&Category, &Level)> = levels_by_range(categories)
        .into_iter()
        .map(|(c, l)| (&categories[c], &categories[c].levels[l]))
        .collect();

    // 2. coverage starts at zero
    match sorted.first() {
        None => violations.push(Violation::EmptyCatalog),
        Some((category, level)) if level.min_referrals() != 0 => {
            violations.push(Violation::DoesNotStartAtZero {
                level: LevelRef::new(category, level),
                min: level.min_referrals(),
            })
        }
        Some(_) => {}
    }

    // 3. contiguous ranges, each level against the furthest-reaching level
    // sorted before it
    if let Some(&(first_cat, first)) = sorted.first() {
        let mut reach = (first_cat, first);
        for &(next_cat, next) in &sorted[1..] {
            let (prev_cat, prev) = reach;
            let previous_max = prev.max_referrals();
            let next_min = next.min_referrals();
            let expected_min = previous_max.saturating_add(1);

            // An unbounded level followed by anything is an overlap
            let overlaps = previous_max == UNBOUNDED_REFERRALS || next_min < expected_min;
            if overlaps {
                violations.push(Violation::Overlap {
                    previous: LevelRef::new(prev_cat, prev),
                    next: LevelRef::new(next_cat, next),
                    previous_max,
                    next_min,
                    expected_min,
                });
            } else if next_min > expected_min {
                violations.push(Violation::Gap {
                    previous: LevelRef::new(prev_cat, prev),
                    next: LevelRef::new(next_cat, next),
                    previous_max,
                    next_min,
                    expected_min,
                });
            }

            if next.max_referrals() > previous_max {
                reach = (next_cat, next);
            }
        }
    }

    // 4. open-ended last level
    if let Some((category, level)) = sorted.last() {
        if !level.requirements.is_unbounded() {
            violations.push(Violation::NotUnbounded {
                level: LevelRef::new(category, level),
                max: level.max_referrals(),
            });
        }
    }

    // 5. commission ordering
    for pair in sorted.windows(2) {
        let (prev_cat, prev) = pair[0];
        let (next_cat, next) = pair[1];
        if next.benefits.rev_total < prev.benefits.rev_total {
            violations.push(Violation::DecreasingCommission {
                previous: LevelRef::new(prev_cat, prev),
                next: LevelRef::new(next_cat, next),
                previous_rev_total: prev.benefits.rev_total,
                next_rev_total: next.benefits.rev_total,
            });
        }
    }
    for (category, level) in &sorted {
        if level.benefits.rev_level1 > level.benefits.rev_total {
            violations.push(Violation::LevelShareExceedsTotal {
                level: LevelRef::new(category, level),
                rev_total: level.benefits.rev_total,
                rev_level1: level.benefits.rev_level1,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { violations })
    }
}

fn check_identifiers(categories: &[Category], violations: &mut Vec<Violation>) {
    let mut category_ids = HashSet::new();
    for category in categories {
        if !category_ids.insert(category.id.as_str()) {
            violations.push(Violation::DuplicateCategoryId {
                id: category.id.clone(),
            });
        }

        let mut level_ids = HashSet::new();
        for level in &category.levels {
            if !level_ids.insert(level.id.as_str()) {
                violations.push(Violation::DuplicateLevelId {
                    category_id: category.id.clone(),
                    level_id: level.id.clone(),
                });
            }
        }
    }
}

fn check_level(category: &Category, level: &Level, violations: &mut Vec<Violation>) {
    if level.min_referrals() > level.max_referrals() {
        violations.push(Violation::InvertedRange {
            level: LevelRef::new(category, level),
            min: level.min_referrals(),
            max: level.max_referrals(),
        });
    }

    let benefits = &level.benefits;
    let percents = [
        ("revTotal", benefits.rev_total),
        ("revLevel1", benefits.rev_level1),
        ("revLevels2to5", benefits.rev_levels2to5),
    ];
    for (field, value) in percents {
        // NaN fails `contains` as well
        if !(MIN_PERCENT..=MAX_PERCENT).contains(&value) {
            violations.push(Violation::PercentOutOfRange {
                level: LevelRef::new(category, level),
                field,
                value,
            });
        }
    }

    if !benefits.level_up_reward.is_finite() || benefits.level_up_reward < 0.0 {
        violations.push(Violation::InvalidReward {
            level: LevelRef::new(category, level),
            value: benefits.level_up_reward,
        });
    }
}
