use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::temporal::{self, Timestamp};

/// One player's financial activity within a single session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[serde(rename = "buyin")]
    pub buy_in: Money,
    #[serde(default)]
    pub rebuys: Vec<Money>,
    /// Unset until the session is settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_stack: Option<Money>,
}

impl Participation {
    pub fn new(buy_in: Money) -> Self {
        Self {
            buy_in,
            rebuys: Vec::new(),
            final_stack: None,
        }
    }

    /// Buy-in plus every rebuy.
    pub fn total_contribution(&self) -> Money {
        self.buy_in + self.rebuys.iter().sum::<Money>()
    }

    /// Final stack minus total contribution, once the stack is known.
    pub fn profit(&self) -> Option<Money> {
        self.final_stack.map(|stack| stack - self.total_contribution())
    }
}

/// One sitting of a game, bounded by start and finalize.
///
/// A session with an `end_time` is sealed: every participant has a final
/// stack and the stacks balance against the contributions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub start_time: Timestamp,
    #[serde(with = "temporal::optional", default)]
    pub end_time: Option<Timestamp>,
    #[serde(rename = "players", default)]
    pub participants: BTreeMap<String, Participation>,
}

impl Session {
    pub fn new(start_time: Timestamp) -> Self {
        Self {
            start_time,
            end_time: None,
            participants: BTreeMap::new(),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Session length in hours, identical for every participant.
    pub fn duration_hours(&self) -> Option<f64> {
        self.end_time.map(|end| self.start_time.hours_until(&end))
    }

    pub fn total_contributions(&self) -> Money {
        self.participants.values().map(Participation::total_contribution).sum()
    }

    /// Sum of final stacks, or `None` while any stack is unset.
    pub fn total_stacks(&self) -> Option<Money> {
        self.participants.values().map(|p| p.final_stack).sum()
    }

    /// Stacks minus contributions. Zero for every correctly settled session.
    pub fn balance(&self) -> Option<Money> {
        self.total_stacks().map(|stacks| stacks - self.total_contributions())
    }
}
