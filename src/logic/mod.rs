//! Tournament business logic: bracket building, results, propagation and promotion.

mod group_stage;
mod knockout;
mod lifecycle;
mod promotion;
mod propagation;
mod results;
pub mod template;

pub use group_stage::{
    auto_generate_groups, available_teams, build_group_bracket, shuffle_seats, GROUP_SIZE,
};
pub use knockout::{build_knockout_bracket, known_qualifiers};
pub use lifecycle::{get_rules, update_rules};
pub use promotion::{promote_qualifier, Placement};
pub use propagation::{propagate, Propagation, SlotWrite};
pub use results::{record_result, ResultReport};
pub use template::{qualifier_rank, route_for, seed_slot, Outcome, Rank, Route, Template};
