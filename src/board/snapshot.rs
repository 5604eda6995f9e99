//! Read-only projections of the board for observers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::{Board, Government, Trackers};
use crate::core::types::{CityId, Location, PartyId, Round, TemplateId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySummary {
    pub party: PartyId,
    pub current_vp: i32,
    pub reserved_ap: u32,
    pub parliament_seats: u32,
    pub timeline_cards: usize,
    pub party_cards: usize,
    pub unit_supply: Vec<TemplateId>,
    pub agenda: Option<String>,
    pub controlled_minor_parties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub city: CityId,
    pub max_party_bases: u32,
    pub party_bases: BTreeMap<PartyId, u32>,
    pub units: Vec<TemplateId>,
    pub threats: Vec<TemplateId>,
}

/// Everything an observer needs to render the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub round: Round,
    pub trackers: Trackers,
    pub government: Government,
    pub president: Option<String>,
    pub parties: Vec<PartySummary>,
    pub cities: Vec<CitySummary>,
    pub dr_box: Vec<TemplateId>,
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        let parties = self
            .parties()
            .map(|p| PartySummary {
                party: p.party_id,
                current_vp: p.current_vp,
                reserved_ap: p.reserved_ap,
                parliament_seats: p.parliament_seats,
                timeline_cards: p.hand_timeline.len(),
                party_cards: p.hand_party.len(),
                unit_supply: p.unit_supply.clone(),
                agenda: p.agenda.clone(),
                controlled_minor_parties: p.controlled_minor_parties.clone(),
            })
            .collect();

        let cities = self
            .cities()
            .map(|c| {
                let location = Location::City(c.id.clone());
                CitySummary {
                    city: c.id.clone(),
                    max_party_bases: c.max_party_bases,
                    party_bases: c.bases(),
                    units: self.units().templates_at(&location),
                    threats: self.threats().templates_at(&location),
                }
            })
            .collect();

        BoardSnapshot {
            round: self.round,
            trackers: self.trackers.clone(),
            government: self.government.clone(),
            president: self.president.clone(),
            parties,
            cities,
            dr_box: self.threats().templates_at(&Location::DrBox),
        }
    }
}

impl BoardSnapshot {
    pub fn city(&self, id: &CityId) -> Option<&CitySummary> {
        self.cities.iter().find(|c| c.city == *id)
    }

    pub fn party(&self, id: PartyId) -> Option<&PartySummary> {
        self.parties.iter().find(|p| p.party == id)
    }
}
