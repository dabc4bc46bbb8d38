pub const VERSION: &str = env!("BUILD_VERSION");

// Upper bound of the last level: "no maximum"
pub const UNBOUNDED_REFERRALS: u64 = u64::MAX;

// Percentages are expressed in [0, 100]
pub const MIN_PERCENT: f64 = 0.0;
pub const MAX_PERCENT: f64 = 100.0;

// Downline depths paid by a level: depth 1 gets `revLevel1`,
// depths 2 through 5 each get `revLevels2to5`
pub const DIRECT_DEPTH: u8 = 1;
pub const MAX_DOWNLINE_DEPTH: u8 = 5;

// Prefix used when generating identifiers for new levels
pub const LEVEL_ID_PREFIX: &str = "level-";
