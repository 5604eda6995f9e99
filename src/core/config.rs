//! Engine configuration
//!
//! Turn structure, agenda options, the antagonistic threat table and the
//! board reactions available to each party. One config belongs to one engine
//! instance; it is passed in at construction and never shared globally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::board::placement::{DuplicateRule, ThreatInteraction};
use crate::core::error::{EngineError, Result};
use crate::core::types::{PartyId, TemplateId};
use crate::engine::reaction::{BoardReactionDef, ReactionEffect};

/// Configuration for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === TURN STRUCTURE ===
    /// Fixed order in which parties take impulses and are polled
    pub turn_order: Vec<PartyId>,

    /// Full cycles of the turn order per round
    ///
    /// The impulse phase also ends early when every party passes in one
    /// consecutive cycle.
    pub impulses_per_round: u32,

    /// Rounds played before the match ends
    pub max_rounds: u32,

    // === AGENDA ===
    /// Agenda options offered to every party at the start of each round
    pub agendas: Vec<String>,

    // === PLACEMENT ===
    /// Antagonistic threat pairs, one entry per direction
    ///
    /// Both directions of a pair must be listed so the two types can never
    /// share a city.
    pub threat_interactions: Vec<ThreatInteraction>,

    // === REACTIONS ===
    /// Board-triggered reactions available to each party
    pub board_reactions: Vec<BoardReactionDef>,

    /// Card ids that may be played as politician-card reactions
    pub reaction_cards: Vec<String>,

    // === RANDOMNESS ===
    /// Seed for randomized scenario threat batches
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_order: PartyId::ALL.to_vec(),
            impulses_per_round: 3,
            max_rounds: 6,
            agendas: vec![
                "economy".to_string(),
                "foreign_policy".to_string(),
                "domestic_order".to_string(),
                "parliament".to_string(),
            ],
            threat_interactions: default_threat_interactions(),
            board_reactions: Vec::new(),
            reaction_cards: Vec::new(),
            seed: 1919,
        }
    }
}

/// Scarcity/abundance and council/regime never share a city.
///
/// A duplicate scarcity placement spills into the DR box; every other
/// duplicate is rejected.
pub fn default_threat_interactions() -> Vec<ThreatInteraction> {
    let pair = |template: &str, counterpart: &str, on_duplicate| ThreatInteraction {
        template: TemplateId::new(template),
        counterpart: TemplateId::new(counterpart),
        on_duplicate,
    };

    vec![
        pair("scarcity", "abundance", DuplicateRule::RedirectToDrBox),
        pair("abundance", "scarcity", DuplicateRule::Reject),
        pair("council", "regime", DuplicateRule::Reject),
        pair("regime", "council", DuplicateRule::Reject),
    ]
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML config
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builder-style seed override
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder-style turn order override
    pub fn with_turn_order(mut self, order: Vec<PartyId>) -> Self {
        self.turn_order = order;
        self
    }

    /// Add a board reaction for a party
    pub fn with_board_reaction(mut self, party: PartyId, id: &str, effect: ReactionEffect) -> Self {
        self.board_reactions.push(BoardReactionDef {
            party,
            id: id.to_string(),
            effect,
        });
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.turn_order.is_empty() {
            return Err("turn_order must name at least one party".into());
        }

        let unique: BTreeSet<_> = self.turn_order.iter().collect();
        if unique.len() != self.turn_order.len() {
            return Err(format!("turn_order contains duplicates: {:?}", self.turn_order));
        }

        if self.impulses_per_round == 0 {
            return Err("impulses_per_round must be positive".into());
        }

        if self.max_rounds == 0 {
            return Err("max_rounds must be positive".into());
        }

        if self.agendas.is_empty() {
            return Err("agendas must offer at least one option".into());
        }

        for entry in &self.threat_interactions {
            if entry.template == entry.counterpart {
                return Err(format!("threat '{}' cannot be its own counterpart", entry.template));
            }
            let mirrored = self
                .threat_interactions
                .iter()
                .any(|other| other.template == entry.counterpart && other.counterpart == entry.template);
            if !mirrored {
                return Err(format!(
                    "threat interaction '{}' -> '{}' has no mirrored entry",
                    entry.template, entry.counterpart
                ));
            }
        }

        for reaction in &self.board_reactions {
            if !self.turn_order.contains(&reaction.party) {
                return Err(format!(
                    "board reaction '{}' belongs to {} which is not in turn_order",
                    reaction.id, reaction.party
                ));
            }
        }

        Ok(())
    }
}
