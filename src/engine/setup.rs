//! Initial base placement
//!
//! Parties take turns placing one base each, in turn order, until every
//! party has met its scenario quota or run out of legal cities. The machine
//! never loops on its own: the engine asks for the next step each time it is
//! advanced and reports each placement back.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::Board;
use crate::core::types::{CityId, PartyId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    /// Ask `party` to pick one of `cities`
    Request { party: PartyId, cities: Vec<CityId> },
    Complete,
}

/// Round-robin over the parties still owing bases
#[derive(Debug, Clone)]
pub struct SetupMachine {
    order: Vec<PartyId>,
    remaining: BTreeMap<PartyId, u32>,
    exhausted: BTreeSet<PartyId>,
    cursor: usize,
}

impl SetupMachine {
    /// Parties with no quota are skipped with a warning
    pub fn new(order: &[PartyId], quotas: &BTreeMap<PartyId, u32>) -> Self {
        let mut remaining = BTreeMap::new();
        let mut exhausted = BTreeSet::new();
        for party in order {
            match quotas.get(party) {
                Some(quota) => {
                    remaining.insert(*party, *quota);
                }
                None => {
                    tracing::warn!("no initial base quota for {}, skipping its setup", party);
                    exhausted.insert(*party);
                }
            }
        }

        Self {
            order: order.to_vec(),
            remaining,
            exhausted,
            cursor: 0,
        }
    }

    /// Bases `party` still has to place
    pub fn remaining(&self, party: PartyId) -> u32 {
        self.remaining.get(&party).copied().unwrap_or(0)
    }

    pub fn is_exhausted(&self, party: PartyId) -> bool {
        self.exhausted.contains(&party)
    }

    /// Next party to ask, or `Complete` once nobody owes a placement
    ///
    /// A party with no legal city left is marked exhausted here and its
    /// remaining quota is dropped.
    pub fn next_step(&mut self, board: &Board) -> SetupStep {
        let len = self.order.len();
        for offset in 0..len {
            let index = (self.cursor + offset) % len;
            let party = self.order[index];
            if self.exhausted.contains(&party) {
                continue;
            }
            if self.remaining(party) == 0 {
                self.exhausted.insert(party);
                continue;
            }

            let cities: Vec<CityId> = board.valid_base_placement_cities(party).into_iter().collect();
            if cities.is_empty() {
                tracing::warn!(
                    "{} has no valid city for its remaining {} base(s), skipping",
                    party,
                    self.remaining(party)
                );
                self.exhausted.insert(party);
                continue;
            }

            self.cursor = index;
            return SetupStep::Request { party, cities };
        }
        SetupStep::Complete
    }

    /// Count one placement and pass the turn to the next party
    pub fn record_placement(&mut self, party: PartyId) {
        if let Some(left) = self.remaining.get_mut(&party) {
            *left = left.saturating_sub(1);
        }
        if let Some(index) = self.order.iter().position(|p| *p == party) {
            self.cursor = (index + 1) % self.order.len().max(1);
        }
    }
}
