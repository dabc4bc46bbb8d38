//! Fature affiliate tiers
//!
//! Category / level catalog used to turn an affiliate's referral count into
//! a commission tier, with the invariants that keep that lookup total and
//! unambiguous.

#![allow(clippy::module_inception)]

pub mod api;
pub mod config;
pub mod tier;
