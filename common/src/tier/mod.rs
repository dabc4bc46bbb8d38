// Affiliate tier catalog
//
// Categories hold levels; every level covers an inclusive referral-count
// range. Sorted by range start, the levels of all categories must tile
// [0, UNBOUNDED_REFERRALS] exactly, and the total commission must never
// drop while moving up.

mod catalog;
mod category;
mod default;
mod error;
mod level;
mod resolver;
mod validator;

pub mod edit;
pub mod form;

pub use catalog::*;
pub use category::*;
pub use default::*;
pub use edit::*;
pub use error::*;
pub use form::*;
pub use level::*;
pub use resolver::*;
pub use validator::*;

/// (category index, level index) pairs of every level in the catalog,
/// sorted by `(minReferrals, maxReferrals)`
pub(crate) fn levels_by_range(categories: &[Category]) -> Vec<(usize, usize)> {
    let mut positions: Vec<(usize, usize)> = categories
        .iter()
        .enumerate()
        .flat_map(|(c, category)| (0..category.levels.len()).map(move |l| (c, l)))
        .collect();

    // stable: ties keep catalog order
    positions.sort_by_key(|&(c, l)| {
        let requirements = &categories[c].levels[l].requirements;
        (requirements.min_referrals, requirements.max_referrals)
    });
    positions
}
