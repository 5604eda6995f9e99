//! Board state - cities, parties and the entity pools beneath them
//!
//! The board is only written through the placement rules (`placement.rs`)
//! and the engine's phase handlers; everything else gets read access.

pub mod city;
pub mod party;
pub mod placement;
pub mod pool;
pub mod snapshot;

pub use city::CityState;
pub use party::PartyState;
pub use placement::{DuplicateRule, InteractionTable, PlacementOutcome, ThreatInteraction};
pub use pool::{EntityPool, Instance, PoolKind};
pub use snapshot::{BoardSnapshot, CitySummary, PartySummary};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::core::error::{EngineError, Result};
use crate::core::types::{CityId, PartyId, Round};
use crate::knowledge::Knowledge;

/// Round-independent tracks seeded by the scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trackers {
    pub foreign_affairs_track: String,
    /// Steps advanced on the foreign affairs track during play
    pub foreign_affairs_progress: u32,
    pub economy_track: i32,
}

/// Chancellor and governing coalition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Government {
    pub chancellor: Option<PartyId>,
    pub parties: BTreeSet<PartyId>,
}

/// Aggregate board state for one match
#[derive(Debug, Clone)]
pub struct Board {
    knowledge: Arc<Knowledge>,
    pub round: Round,
    pub trackers: Trackers,
    pub government: Government,
    pub president: Option<String>,
    cities: BTreeMap<CityId, CityState>,
    parties: BTreeMap<PartyId, PartyState>,
    units: EntityPool,
    threats: EntityPool,
    interactions: InteractionTable,
}

impl Board {
    /// Build the board and create every unit and threat instance
    pub fn new(knowledge: Arc<Knowledge>, interactions: InteractionTable, parties: &[PartyId]) -> Result<Self> {
        let cities = knowledge
            .cities
            .values()
            .map(|t| (t.id.clone(), CityState::from_template(t)))
            .collect();
        let parties = parties.iter().map(|p| (*p, PartyState::new(*p))).collect();

        let mut units = EntityPool::new(PoolKind::Unit);
        units.initialize(&knowledge.unit_counts())?;
        let mut threats = EntityPool::new(PoolKind::Threat);
        threats.initialize(&knowledge.threat_counts())?;

        Ok(Self {
            knowledge,
            round: 1,
            trackers: Trackers::default(),
            government: Government::default(),
            president: None,
            cities,
            parties,
            units,
            threats,
            interactions,
        })
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn interactions(&self) -> &InteractionTable {
        &self.interactions
    }

    pub fn city(&self, id: &CityId) -> Option<&CityState> {
        self.cities.get(id)
    }

    pub fn cities(&self) -> impl Iterator<Item = &CityState> {
        self.cities.values()
    }

    pub fn city_ids(&self) -> Vec<CityId> {
        self.cities.keys().cloned().collect()
    }

    pub fn party(&self, id: PartyId) -> Option<&PartyState> {
        self.parties.get(&id)
    }

    pub fn parties(&self) -> impl Iterator<Item = &PartyState> {
        self.parties.values()
    }

    pub(crate) fn party_mut(&mut self, id: PartyId) -> Option<&mut PartyState> {
        self.parties.get_mut(&id)
    }

    pub fn units(&self) -> &EntityPool {
        &self.units
    }

    pub fn threats(&self) -> &EntityPool {
        &self.threats
    }

    /// Verify pool indexes and city capacities
    pub fn check_integrity(&self) -> Result<()> {
        self.units.check_integrity()?;
        self.threats.check_integrity()?;
        for city in self.cities.values() {
            if city.total_bases() > city.max_party_bases {
                return Err(EngineError::CorruptState(format!(
                    "{} holds {} bases over capacity {}",
                    city.id,
                    city.total_bases(),
                    city.max_party_bases
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Faction, Location, TemplateId};

    #[test]
    fn test_new_board_seeds_cities_parties_and_pools() {
        let knowledge = Knowledge::new()
            .with_city("Berlin", 3)
            .with_city("Munich", 2)
            .with_unit("reichswehr", Faction::Government, 3, 2)
            .with_threat("scarcity", 4, 1, None);
        let board = Board::new(
            Arc::new(knowledge),
            InteractionTable::default(),
            &[PartyId::Spd, PartyId::Kpd],
        )
        .unwrap();

        assert_eq!(board.city_ids().len(), 2);
        assert!(board.party(PartyId::Spd).is_some());
        assert!(board.party(PartyId::Dnvp).is_none());
        assert_eq!(board.units().len(), 2);
        assert_eq!(
            board.threats().count_at(&Location::AvailablePool, &TemplateId::new("scarcity")),
            4
        );
        assert!(board.check_integrity().is_ok());
    }
}
