//! City state - party bases held in each city
//!
//! Units and threat markers in a city are not stored here; they are read
//! from the entity pools so there is a single record of where they are.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{CityId, PartyId};
use crate::knowledge::CityTemplate;

/// Mutable per-city state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityState {
    pub id: CityId,
    pub max_party_bases: u32,
    party_bases: BTreeMap<PartyId, u32>,
}

impl CityState {
    pub fn new(id: CityId, max_party_bases: u32) -> Self {
        Self {
            id,
            max_party_bases,
            party_bases: BTreeMap::new(),
        }
    }

    pub fn from_template(template: &CityTemplate) -> Self {
        Self::new(template.id.clone(), template.max_party_bases)
    }

    pub fn bases_of(&self, party: PartyId) -> u32 {
        self.party_bases.get(&party).copied().unwrap_or(0)
    }

    pub fn total_bases(&self) -> u32 {
        self.party_bases.values().sum()
    }

    pub fn is_full(&self) -> bool {
        self.total_bases() >= self.max_party_bases
    }

    /// Parties with at least one base, in party order
    pub fn parties_present(&self) -> Vec<PartyId> {
        self.party_bases
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(party, _)| *party)
            .collect()
    }

    /// Non-zero base counts
    pub fn bases(&self) -> BTreeMap<PartyId, u32> {
        self.party_bases
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(party, count)| (*party, *count))
            .collect()
    }

    /// Add one base, returns false when the city is full
    pub fn add_base(&mut self, party: PartyId) -> bool {
        if self.is_full() {
            return false;
        }
        *self.party_bases.entry(party).or_insert(0) += 1;
        true
    }

    /// Remove one base, returns false when the party has none here
    pub fn remove_base(&mut self, party: PartyId) -> bool {
        match self.party_bases.get_mut(&party) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}
