//! Scenario descriptor - the starting position of a match
//!
//! Applying a scenario seeds trackers, government, seats, hands, supply and
//! the initial threat markers. Ids the board does not know are skipped with a
//! warning rather than failing the whole load. Initial party bases are not
//! placed here; their quotas drive the setup phase.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::board::{Board, PlacementOutcome};
use crate::core::error::Result;
use crate::core::types::{CityId, Location, PartyId, Round, TemplateId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingTrackers {
    pub round: Round,
    pub foreign_affairs_track: String,
    pub economy_track: i32,
}

impl Default for StartingTrackers {
    fn default() -> Self {
        Self {
            round: 1,
            foreign_affairs_track: String::new(),
            economy_track: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingGovernment {
    pub chancellor: Option<PartyId>,
    pub parties: BTreeSet<PartyId>,
}

/// Place `count` markers in randomly drawn cities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomThreatBatch {
    pub threat_id: TemplateId,
    pub count: u32,
    /// Draw each city at most once for this batch
    #[serde(default)]
    pub unique_cities: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialThreats {
    pub dr_box: Vec<TemplateId>,
    pub specific_cities: BTreeMap<CityId, Vec<TemplateId>>,
    pub random_cities: Vec<RandomThreatBatch>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPartySetup {
    /// Bases the party places during setup
    pub city_bases: u32,
    pub parliament_seats: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub starting_trackers: StartingTrackers,
    #[serde(default)]
    pub starting_president: Option<String>,
    #[serde(default)]
    pub starting_government: StartingGovernment,
    /// Minor party id to controlling party
    #[serde(default)]
    pub starting_minor_parties: BTreeMap<String, PartyId>,
    #[serde(default)]
    pub initial_threats: InitialThreats,
    #[serde(default)]
    pub initial_party_setup: BTreeMap<PartyId, InitialPartySetup>,
    #[serde(default)]
    pub starting_hands: BTreeMap<PartyId, Vec<String>>,
    #[serde(default)]
    pub starting_supply: BTreeMap<PartyId, Vec<TemplateId>>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let scenario = Self::from_json(&content)?;
        tracing::info!("loaded scenario '{}' from {}", scenario.id, path.display());
        Ok(scenario)
    }

    /// Initial base quota per party; parties without setup data are absent
    pub fn base_quotas(&self) -> BTreeMap<PartyId, u32> {
        self.initial_party_setup
            .iter()
            .map(|(party, setup)| (*party, setup.city_bases))
            .collect()
    }

    /// Seed the board and return every threat marker that landed
    pub fn apply<R: Rng>(&self, board: &mut Board, rng: &mut R) -> Result<Vec<(TemplateId, Location)>> {
        board.round = self.starting_trackers.round;
        board.trackers.foreign_affairs_track = self.starting_trackers.foreign_affairs_track.clone();
        board.trackers.economy_track = self.starting_trackers.economy_track;
        board.president = self.starting_president.clone();
        self.apply_government(board);
        self.apply_parties(board);
        self.apply_threats(board, rng)
    }

    fn apply_government(&self, board: &mut Board) {
        let gov = &self.starting_government;
        board.government.chancellor = match gov.chancellor {
            Some(party) if board.party(party).is_none() => {
                tracing::warn!("chancellor party {} is not in this match", party);
                None
            }
            other => other,
        };
        board.government.parties = gov
            .parties
            .iter()
            .copied()
            .filter(|p| {
                let known = board.party(*p).is_some();
                if !known {
                    tracing::warn!("governing party {} is not in this match", p);
                }
                known
            })
            .collect();
    }

    fn apply_parties(&self, board: &mut Board) {
        for (minor, controller) in &self.starting_minor_parties {
            match board.party_mut(*controller) {
                Some(state) => state.controlled_minor_parties.push(minor.clone()),
                None => tracing::warn!("minor party {} assigned to absent {}", minor, controller),
            }
        }

        for (party, setup) in &self.initial_party_setup {
            match board.party_mut(*party) {
                Some(state) => state.parliament_seats = setup.parliament_seats,
                None => tracing::warn!("setup data for absent party {}", party),
            }
        }

        for (party, cards) in &self.starting_hands {
            if let Some(state) = board.party_mut(*party) {
                state.hand_party = cards.clone();
            }
        }

        for (party, supply) in &self.starting_supply {
            let known: Vec<TemplateId> = supply
                .iter()
                .filter(|t| {
                    let ok = board.knowledge().unit(t).is_some();
                    if !ok {
                        tracing::warn!("unknown unit template {} in {} supply", t, party);
                    }
                    ok
                })
                .cloned()
                .collect();
            if let Some(state) = board.party_mut(*party) {
                state.unit_supply = known;
            }
        }
    }

    fn apply_threats<R: Rng>(&self, board: &mut Board, rng: &mut R) -> Result<Vec<(TemplateId, Location)>> {
        let threats = &self.initial_threats;
        let mut placed = Vec::new();

        for template in &threats.dr_box {
            place_initial(board, &Location::DrBox, template, &mut placed)?;
        }

        for (city, templates) in &threats.specific_cities {
            if board.city(city).is_none() {
                tracing::warn!("initial threats for unknown city {}", city);
                continue;
            }
            let location = Location::City(city.clone());
            for template in templates {
                place_initial(board, &location, template, &mut placed)?;
            }
        }

        for batch in &threats.random_cities {
            let mut candidates = board.city_ids();
            for _ in 0..batch.count {
                if candidates.is_empty() {
                    tracing::warn!("ran out of cities for random {} batch", batch.threat_id);
                    break;
                }
                let idx = rng.gen_range(0..candidates.len());
                let city = if batch.unique_cities {
                    candidates.swap_remove(idx)
                } else {
                    candidates[idx].clone()
                };
                place_initial(board, &Location::City(city), &batch.threat_id, &mut placed)?;
            }
        }

        Ok(placed)
    }
}

fn place_initial(
    board: &mut Board,
    location: &Location,
    template: &TemplateId,
    placed: &mut Vec<(TemplateId, Location)>,
) -> Result<()> {
    if board.knowledge().threat(template).is_none() {
        tracing::warn!("unknown threat template {}, skipping", template);
        return Ok(());
    }
    match board.place_threat(location, template)? {
        PlacementOutcome::Placed(_) => placed.push((template.clone(), location.clone())),
        PlacementOutcome::Redirected(_) => placed.push((template.clone(), Location::DrBox)),
        outcome => tracing::debug!("initial {} at {}: {:?}", template, location, outcome),
    }
    Ok(())
}
