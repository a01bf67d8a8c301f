//! Team and Pool data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a team (used in match slots and lookups).
pub type TeamId = Uuid;

/// Cohort a team (and its group) belongs to. Drives knockout cross-seeding.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Pool {
    A,
    B,
}

impl Pool {
    pub const ALL: [Pool; 2] = [Pool::A, Pool::B];

    /// The pool a team of this pool is cross-seeded against.
    pub fn other(self) -> Pool {
        match self {
            Pool::A => Pool::B,
            Pool::B => Pool::A,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::A => write!(f, "A"),
            Pool::B => write!(f, "B"),
        }
    }
}

impl FromStr for Pool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Pool::A),
            "B" => Ok(Pool::B),
            other => Err(format!("unknown pool '{other}'")),
        }
    }
}

/// A two-player team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub pool: Pool,
    pub player_1: String,
    pub player_2: String,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a team. The display name defaults to "P1 & P2" when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        pool: Pool,
        player_1: impl Into<String>,
        player_2: impl Into<String>,
    ) -> Self {
        let player_1: String = player_1.into();
        let player_2: String = player_2.into();
        let name: String = name.into();
        let (player_1, player_2) = (player_1.trim().to_string(), player_2.trim().to_string());
        let mut name = name.trim().to_string();
        if name.is_empty() {
            name = format!("{player_1} & {player_2}");
        }
        Self {
            id: Uuid::new_v4(),
            name,
            pool,
            player_1,
            player_2,
            created_at: Utc::now(),
        }
    }
}
