//! Entity pool - every physical unit or threat marker in the game
//!
//! Instances are created once, `max_count` per template, and then only move
//! between locations. `Instance::location` is the authoritative record; the
//! per-location sets are derived from it and kept in lockstep by `move_to`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::{EngineError, Result};
use crate::core::types::{InstanceId, Location, TemplateId};

/// What a pool holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolKind {
    Unit,
    Threat,
}

impl PoolKind {
    pub fn name(&self) -> &'static str {
        match self {
            PoolKind::Unit => "unit",
            PoolKind::Threat => "threat",
        }
    }

    /// Only threat markers may sit in the DR box
    pub fn accepts(&self, location: &Location) -> bool {
        !matches!((self, location), (PoolKind::Unit, Location::DrBox))
    }
}

/// One physical copy of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub template: TemplateId,
    pub location: Location,
}

/// Fixed-size collection of instances with a location index
#[derive(Debug, Clone)]
pub struct EntityPool {
    kind: PoolKind,
    initialized: bool,
    /// Indexed by `InstanceId.0`
    instances: Vec<Instance>,
    by_location: AHashMap<Location, BTreeSet<InstanceId>>,
}

impl EntityPool {
    pub fn new(kind: PoolKind) -> Self {
        Self {
            kind,
            initialized: false,
            instances: Vec::new(),
            by_location: AHashMap::new(),
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Create `max_count` instances of every template at the available pool
    ///
    /// May run exactly once.
    pub fn initialize(&mut self, templates: &[(TemplateId, u32)]) -> Result<()> {
        if self.initialized {
            return Err(EngineError::Reinitialization(self.kind.name()));
        }

        let available = self.by_location.entry(Location::AvailablePool).or_default();
        for (template, max_count) in templates {
            for _ in 0..*max_count {
                let id = InstanceId(self.instances.len() as u32);
                self.instances.push(Instance {
                    id,
                    template: template.clone(),
                    location: Location::AvailablePool,
                });
                available.insert(id);
            }
        }

        self.initialized = true;
        tracing::debug!("{} pool initialized with {} instances", self.kind.name(), self.instances.len());
        Ok(())
    }

    /// Lowest-numbered available instance of a template
    ///
    /// `None` means the pool is exhausted for that template, which is a
    /// normal game outcome.
    pub fn find_available(&self, template: &TemplateId) -> Option<InstanceId> {
        self.by_location
            .get(&Location::AvailablePool)?
            .iter()
            .copied()
            .find(|id| self.instances[id.0 as usize].template == *template)
    }

    /// Relocate an instance
    ///
    /// A no-op when the instance is already there. Every check happens before
    /// the first write, so a failure leaves the pool untouched.
    pub fn move_to(&mut self, id: InstanceId, new_location: Location) -> Result<()> {
        let index = id.0 as usize;
        let current = match self.instances.get(index) {
            Some(instance) => instance.location.clone(),
            None => return Err(EngineError::UnknownInstance(id)),
        };

        if current == new_location {
            return Ok(());
        }

        if !self.kind.accepts(&new_location) {
            return Err(EngineError::InvalidLocation {
                kind: self.kind.name(),
                location: new_location,
            });
        }

        let removed = self
            .by_location
            .get_mut(&current)
            .map(|set| set.remove(&id))
            .unwrap_or(false);
        if !removed {
            return Err(EngineError::PoolDesync(format!(
                "{} {} recorded at {} but missing from that location's set",
                self.kind.name(),
                id,
                current
            )));
        }

        self.by_location.entry(new_location.clone()).or_default().insert(id);
        self.instances[index].location = new_location;
        Ok(())
    }

    /// Instances at a location, optionally filtered by template, in id order
    pub fn instances_at(&self, location: &Location, template: Option<&TemplateId>) -> Vec<InstanceId> {
        let Some(set) = self.by_location.get(location) else {
            return Vec::new();
        };
        set.iter()
            .copied()
            .filter(|id| template.map_or(true, |t| self.instances[id.0 as usize].template == *t))
            .collect()
    }

    pub fn count_at(&self, location: &Location, template: &TemplateId) -> usize {
        self.instances_at(location, Some(template)).len()
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0 as usize)
    }

    pub fn location_of(&self, id: InstanceId) -> Option<&Location> {
        self.get(id).map(|i| &i.location)
    }

    pub fn template_of(&self, id: InstanceId) -> Option<&TemplateId> {
        self.get(id).map(|i| &i.template)
    }

    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    /// Template ids of everything at a location, in instance order
    pub fn templates_at(&self, location: &Location) -> Vec<TemplateId> {
        self.instances_at(location, None)
            .into_iter()
            .map(|id| self.instances[id.0 as usize].template.clone())
            .collect()
    }

    /// Verify that the location index agrees with every instance record
    pub fn check_integrity(&self) -> Result<()> {
        let mut indexed = 0;
        for (location, set) in &self.by_location {
            for id in set {
                match self.instances.get(id.0 as usize) {
                    Some(instance) if instance.location == *location => indexed += 1,
                    Some(instance) => {
                        return Err(EngineError::PoolDesync(format!(
                            "{} {} indexed at {} but recorded at {}",
                            self.kind.name(),
                            id,
                            location,
                            instance.location
                        )))
                    }
                    None => return Err(EngineError::UnknownInstance(*id)),
                }
            }
        }

        if indexed != self.instances.len() {
            return Err(EngineError::PoolDesync(format!(
                "{} pool indexes {} of {} instances",
                self.kind.name(),
                indexed,
                self.instances.len()
            )));
        }
        Ok(())
    }
}
