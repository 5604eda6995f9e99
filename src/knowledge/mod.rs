//! Read-only knowledge base
//!
//! Immutable templates for parties, cities, units and threat markers, keyed
//! by string id. Loaded once at startup and shared by reference afterwards.

mod loader;

pub use loader::{load_knowledge_dir, KnowledgeLoader};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{CityId, Faction, PartyId, TemplateId};

/// Static party definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyTemplate {
    pub id: PartyId,
    pub party_color: String,
}

/// Static city definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTemplate {
    pub id: CityId,
    /// Total bases, across all parties, the city can hold
    pub max_party_bases: u32,
    pub city_dice_roll: u32,
}

/// Static unit definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: TemplateId,
    pub strength: u32,
    pub faction: Faction,
    /// Number of physical copies in the game
    pub max_count: u32,
}

/// Static threat marker definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatTemplate {
    pub id: TemplateId,
    /// Number of physical copies in the game
    pub max_count: u32,
    /// How many copies one city may hold
    #[serde(default = "default_max_per_city")]
    pub max_per_city: u32,
    /// How many copies the DR box may hold (unbounded when absent)
    #[serde(default)]
    pub dr_box_cap: Option<u32>,
}

fn default_max_per_city() -> u32 {
    1
}

/// All static game data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Knowledge {
    pub parties: BTreeMap<PartyId, PartyTemplate>,
    pub cities: BTreeMap<CityId, CityTemplate>,
    pub units: BTreeMap<TemplateId, UnitTemplate>,
    pub threats: BTreeMap<TemplateId, ThreatTemplate>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, id: &str, max_party_bases: u32) -> Self {
        let id = CityId::new(id);
        self.cities.insert(
            id.clone(),
            CityTemplate {
                id,
                max_party_bases,
                city_dice_roll: 0,
            },
        );
        self
    }

    pub fn with_unit(mut self, id: &str, faction: Faction, strength: u32, max_count: u32) -> Self {
        let id = TemplateId::new(id);
        self.units.insert(
            id.clone(),
            UnitTemplate {
                id,
                strength,
                faction,
                max_count,
            },
        );
        self
    }

    pub fn with_threat(mut self, id: &str, max_count: u32, max_per_city: u32, dr_box_cap: Option<u32>) -> Self {
        let id = TemplateId::new(id);
        self.threats.insert(
            id.clone(),
            ThreatTemplate {
                id,
                max_count,
                max_per_city,
                dr_box_cap,
            },
        );
        self
    }

    pub fn city(&self, id: &CityId) -> Option<&CityTemplate> {
        self.cities.get(id)
    }

    pub fn unit(&self, id: &TemplateId) -> Option<&UnitTemplate> {
        self.units.get(id)
    }

    pub fn threat(&self, id: &TemplateId) -> Option<&ThreatTemplate> {
        self.threats.get(id)
    }

    /// `(template, max_count)` pairs for seeding the unit pool
    pub fn unit_counts(&self) -> Vec<(TemplateId, u32)> {
        self.units.values().map(|u| (u.id.clone(), u.max_count)).collect()
    }

    /// `(template, max_count)` pairs for seeding the threat pool
    pub fn threat_counts(&self) -> Vec<(TemplateId, u32)> {
        self.threats.values().map(|t| (t.id.clone(), t.max_count)).collect()
    }
}
