#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Candidate building and weighted archetype selection.
//!
//! The candidate builder narrows the archetype set to what the stage, the
//! cooldowns and the population caps allow right now; the weighted selector
//! then layers roster, ratio, quota, plan, anti-streak and elite modifiers
//! over base weights and performs one cumulative draw.

mod candidates;
mod roster;
mod selector;

pub use candidates::{
    build_candidates, is_eligible, CandidateContext, CandidateFilter, CooldownMap,
};
pub use roster::{EliteLimiter, EncounterPlan, Roster};
pub use selector::{Selection, SelectionContext, SelectionReason, WeightedSelector};
