//! Bracket templates: the static tables that say where every result goes.
//!
//! Two templates exist. The GSL mini-bracket (M1, M2, Winners, Losers, Decider) produces a
//! rank-1 and rank-2 qualifier per group. The knockout bracket (SF1, SF2, Bronze, Final) is
//! seeded from those qualifiers with [`seed_slot`]. Propagation and promotion only consult
//! these tables; no other module compares labels.

use crate::models::{MatchLabel, Pool, Slot};
use serde::{Deserialize, Serialize};

/// Which side of a result is being forwarded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
}

/// Final placement of a group qualifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    First,
    Second,
}

impl Rank {
    pub fn from_number(n: u8) -> Option<Rank> {
        match n {
            1 => Some(Rank::First),
            2 => Some(Rank::Second),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Rank::First => 1,
            Rank::Second => 2,
        }
    }
}

/// `(source, outcome) -> (target, slot)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Route {
    pub source: MatchLabel,
    pub outcome: Outcome,
    pub target: MatchLabel,
    pub slot: Slot,
}

const fn route(source: MatchLabel, outcome: Outcome, target: MatchLabel, slot: Slot) -> Route {
    Route {
        source,
        outcome,
        target,
        slot,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    GslMini,
    Knockout,
}

const GSL_ROUTES: &[Route] = &[
    route(MatchLabel::M1, Outcome::Win, MatchLabel::Winners, Slot::A),
    route(MatchLabel::M2, Outcome::Win, MatchLabel::Winners, Slot::B),
    route(MatchLabel::M1, Outcome::Lose, MatchLabel::Losers, Slot::A),
    route(MatchLabel::M2, Outcome::Lose, MatchLabel::Losers, Slot::B),
    route(MatchLabel::Winners, Outcome::Lose, MatchLabel::Decider, Slot::A),
    route(MatchLabel::Losers, Outcome::Win, MatchLabel::Decider, Slot::B),
];

const KNOCKOUT_ROUTES: &[Route] = &[
    route(MatchLabel::Sf1, Outcome::Win, MatchLabel::Final, Slot::A),
    route(MatchLabel::Sf2, Outcome::Win, MatchLabel::Final, Slot::B),
    route(MatchLabel::Sf1, Outcome::Lose, MatchLabel::Bronze, Slot::A),
    route(MatchLabel::Sf2, Outcome::Lose, MatchLabel::Bronze, Slot::B),
];

/// Group-terminal winners: the label whose winner leaves the group with a rank.
const GSL_QUALIFIERS: &[(MatchLabel, Rank)] = &[
    (MatchLabel::Winners, Rank::First),
    (MatchLabel::Decider, Rank::Second),
];

impl Template {
    pub fn of(label: MatchLabel) -> Template {
        if label.is_knockout() {
            Template::Knockout
        } else {
            Template::GslMini
        }
    }

    pub fn routes(self) -> &'static [Route] {
        match self {
            Template::GslMini => GSL_ROUTES,
            Template::Knockout => KNOCKOUT_ROUTES,
        }
    }

    /// Labels in insertion order: every forward target comes before its sources.
    pub fn build_order(self) -> &'static [MatchLabel] {
        use MatchLabel::*;
        match self {
            Template::GslMini => &[Decider, Winners, Losers, M1, M2],
            Template::Knockout => &[Final, Bronze, Sf1, Sf2],
        }
    }
}

/// Deterministic route for a result, if the template has one.
pub fn route_for(source: MatchLabel, outcome: Outcome) -> Option<Route> {
    Template::of(source)
        .routes()
        .iter()
        .copied()
        .find(|r| r.source == source && r.outcome == outcome)
}

/// Rank earned by the winner of `label`, if it is group-terminal.
pub fn qualifier_rank(label: MatchLabel) -> Option<Rank> {
    GSL_QUALIFIERS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, rank)| *rank)
}

/// Canonical cross-seeding: pool × rank → semifinal slot.
///
/// Rank 1 of a pool meets rank 2 of the other pool, so same-pool qualifiers only meet in
/// the final or the bronze match.
pub fn seed_slot(pool: Pool, rank: Rank) -> (MatchLabel, Slot) {
    match (pool, rank) {
        (Pool::A, Rank::First) => (MatchLabel::Sf1, Slot::A),
        (Pool::B, Rank::Second) => (MatchLabel::Sf1, Slot::B),
        (Pool::B, Rank::First) => (MatchLabel::Sf2, Slot::A),
        (Pool::A, Rank::Second) => (MatchLabel::Sf2, Slot::B),
    }
}
