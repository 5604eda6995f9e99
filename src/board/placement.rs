//! Placement rules - capacity limits and antagonistic threat pairs
//!
//! Every change to where threats, units and party bases sit goes through
//! here. Antagonistic threat types are described by one table instead of
//! per-call-site branches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::board::Board;
use crate::core::error::{EngineError, Result};
use crate::core::types::{CityId, InstanceId, Location, PartyId, TemplateId};

/// What happens when a city already holds its cap of a paired threat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRule {
    /// Placement is refused
    Reject,
    /// The marker goes to the DR box instead
    RedirectToDrBox,
}

/// One direction of an antagonistic threat pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatInteraction {
    pub template: TemplateId,
    pub counterpart: TemplateId,
    pub on_duplicate: DuplicateRule,
}

/// Lookup table of antagonistic threat pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionTable {
    entries: Vec<ThreatInteraction>,
}

impl InteractionTable {
    pub fn new(entries: Vec<ThreatInteraction>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, template: &TemplateId) -> Option<&ThreatInteraction> {
        self.entries.iter().find(|e| e.template == *template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a threat or unit placement request
///
/// None of these are errors; callers branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The instance now sits at the requested location
    Placed(InstanceId),
    /// The city was at cap and the marker went to the DR box instead
    Redirected(InstanceId),
    /// A counterpart was removed and the request itself was not fulfilled
    Cancelled { removed: InstanceId },
    /// Location already holds its cap; board unchanged
    AtCapacity,
    /// No available instance of the template; board unchanged
    PoolExhausted,
}

impl PlacementOutcome {
    /// Instance placed at the requested location, if any
    pub fn placed(&self) -> Option<InstanceId> {
        match self {
            PlacementOutcome::Placed(id) => Some(*id),
            _ => None,
        }
    }

    pub fn changed_board(&self) -> bool {
        !matches!(self, PlacementOutcome::AtCapacity | PlacementOutcome::PoolExhausted)
    }
}

impl Board {
    // === THREATS ===

    /// Place a threat marker in a city or the DR box
    pub fn place_threat(&mut self, location: &Location, template: &TemplateId) -> Result<PlacementOutcome> {
        let Some(threat) = self.knowledge.threat(template) else {
            return Err(EngineError::UnknownTemplate(template.clone()));
        };
        let max_per_city = threat.max_per_city as usize;

        let outcome = match location {
            Location::AvailablePool => {
                return Err(EngineError::InvalidLocation {
                    kind: "threat placement",
                    location: location.clone(),
                })
            }
            Location::DrBox => self.place_in_dr_box(template)?,
            Location::City(city) => {
                if !self.cities.contains_key(city) {
                    return Err(EngineError::UnknownCity(city.clone()));
                }

                let interaction = self.interactions.lookup(template).cloned();
                let counterpart = interaction
                    .as_ref()
                    .and_then(|i| self.threats.instances_at(location, Some(&i.counterpart)).first().copied());

                if let Some(victim) = counterpart {
                    self.threats.move_to(victim, Location::AvailablePool)?;
                    PlacementOutcome::Cancelled { removed: victim }
                } else if self.threats.count_at(location, template) >= max_per_city {
                    match interaction.map(|i| i.on_duplicate) {
                        Some(DuplicateRule::RedirectToDrBox) => match self.place_in_dr_box(template)? {
                            PlacementOutcome::Placed(id) => PlacementOutcome::Redirected(id),
                            other => other,
                        },
                        _ => PlacementOutcome::AtCapacity,
                    }
                } else {
                    self.pull_threat(template, location.clone())?
                }
            }
        };

        tracing::debug!("place threat {} at {}: {:?}", template, location, outcome);
        Ok(outcome)
    }

    fn place_in_dr_box(&mut self, template: &TemplateId) -> Result<PlacementOutcome> {
        let cap = self.knowledge.threat(template).and_then(|t| t.dr_box_cap);
        if let Some(cap) = cap {
            if self.threats.count_at(&Location::DrBox, template) >= cap as usize {
                return Ok(PlacementOutcome::AtCapacity);
            }
        }
        self.pull_threat(template, Location::DrBox)
    }

    fn pull_threat(&mut self, template: &TemplateId, location: Location) -> Result<PlacementOutcome> {
        match self.threats.find_available(template) {
            Some(id) => {
                self.threats.move_to(id, location)?;
                Ok(PlacementOutcome::Placed(id))
            }
            None => Ok(PlacementOutcome::PoolExhausted),
        }
    }

    /// Return one threat of a template from a location to the pool
    pub fn remove_threat(&mut self, location: &Location, template: &TemplateId) -> Result<Option<InstanceId>> {
        let Some(id) = self.threats.instances_at(location, Some(template)).first().copied() else {
            return Ok(None);
        };
        self.threats.move_to(id, Location::AvailablePool)?;
        Ok(Some(id))
    }

    // === UNITS ===

    /// Deploy an available unit into a city
    pub fn place_unit(&mut self, city: &CityId, template: &TemplateId) -> Result<PlacementOutcome> {
        if !self.cities.contains_key(city) {
            return Err(EngineError::UnknownCity(city.clone()));
        }
        if self.knowledge.unit(template).is_none() {
            return Err(EngineError::UnknownTemplate(template.clone()));
        }

        match self.units.find_available(template) {
            Some(id) => {
                self.units.move_to(id, Location::City(city.clone()))?;
                Ok(PlacementOutcome::Placed(id))
            }
            None => Ok(PlacementOutcome::PoolExhausted),
        }
    }

    /// Send a unit back to the available pool
    pub fn return_unit(&mut self, id: InstanceId) -> Result<()> {
        self.units.move_to(id, Location::AvailablePool)
    }

    // === PARTY BASES ===

    /// Add a base for a party, if the city is below capacity
    pub fn place_party_base(&mut self, party: PartyId, city: &CityId) -> bool {
        match self.cities.get_mut(city) {
            Some(state) => state.add_base(party),
            None => {
                tracing::warn!("base placement in unknown city {}", city);
                false
            }
        }
    }

    /// Remove a base, if the party has one in the city
    pub fn remove_party_base(&mut self, party: PartyId, city: &CityId) -> bool {
        self.cities.get_mut(city).is_some_and(|state| state.remove_base(party))
    }

    /// Cities where the party has no base yet and there is room for one
    pub fn valid_base_placement_cities(&self, party: PartyId) -> BTreeSet<CityId> {
        self.cities
            .values()
            .filter(|c| c.bases_of(party) == 0 && !c.is_full())
            .map(|c| c.id.clone())
            .collect()
    }
}
