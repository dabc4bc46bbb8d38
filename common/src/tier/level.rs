// Level data structures

use crate::config::{DIRECT_DEPTH, MAX_DOWNLINE_DEPTH, UNBOUNDED_REFERRALS};
use serde::{Deserialize, Serialize};

/// Referral-count bracket of a level, both bounds inclusive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub min_referrals: u64,
    /// `UNBOUNDED_REFERRALS` when the level has no upper bound
    pub max_referrals: u64,
}

impl Requirements {
    pub fn new(min_referrals: u64, max_referrals: u64) -> Self {
        Self {
            min_referrals,
            max_referrals,
        }
    }

    pub fn unbounded(min_referrals: u64) -> Self {
        Self::new(min_referrals, UNBOUNDED_REFERRALS)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_referrals == UNBOUNDED_REFERRALS
    }

    pub fn contains(&self, referrals: u64) -> bool {
        self.min_referrals <= referrals && referrals <= self.max_referrals
    }
}

/// Commission percentages paid by a level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Benefits {
    /// Total revenue share across the whole downline
    #[serde(rename = "revTotal")]
    pub rev_total: f64,
    /// Share on GGR of direct referrals
    #[serde(rename = "revLevel1")]
    pub rev_level1: f64,
    /// Share on GGR of each downline depth from 2 to 5
    #[serde(rename = "revLevels2to5")]
    pub rev_levels2to5: f64,
    /// One-off reward when the level is reached
    #[serde(rename = "levelUpReward", default)]
    pub level_up_reward: f64,
}

impl Benefits {
    pub fn new(rev_total: f64, rev_level1: f64, rev_levels2to5: f64) -> Self {
        Self {
            rev_total,
            rev_level1,
            rev_levels2to5,
            level_up_reward: 0.0,
        }
    }

    pub fn with_level_up_reward(mut self, reward: f64) -> Self {
        self.level_up_reward = reward;
        self
    }

    /// Percentage paid on GGR generated at `depth` of the downline
    pub fn rate_for_depth(&self, depth: u8) -> Option<f64> {
        match depth {
            DIRECT_DEPTH => Some(self.rev_level1),
            d if d > DIRECT_DEPTH && d <= MAX_DOWNLINE_DEPTH => Some(self.rev_levels2to5),
            _ => None,
        }
    }

    /// RevShare commission owed on `ggr` generated at `depth`
    pub fn commission(&self, depth: u8, ggr: f64) -> Option<f64> {
        self.rate_for_depth(depth).map(|rate| ggr * rate / 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub requirements: Requirements,
    pub benefits: Benefits,
}

impl Level {
    pub fn new<I: Into<String>, N: Into<String>>(
        id: I,
        name: N,
        requirements: Requirements,
        benefits: Benefits,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            requirements,
            benefits,
        }
    }

    pub fn min_referrals(&self) -> u64 {
        self.requirements.min_referrals
    }

    pub fn max_referrals(&self) -> u64 {
        self.requirements.max_referrals
    }
}
