//! Choice requests and responses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::{CityId, PartyId};
use crate::engine::reaction::ReactionOption;

/// Which handler a choice is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceAction {
    InitialBasePlacement,
    AgendaSelection,
    ResolvePlaceBase,
    Reaction,
}

impl ChoiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceAction::InitialBasePlacement => "initial_base_placement",
            ChoiceAction::AgendaSelection => "agenda_selection",
            ChoiceAction::ResolvePlaceBase => "resolve_place_base",
            ChoiceAction::Reaction => "reaction",
        }
    }
}

impl fmt::Display for ChoiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_base_placement" => Ok(ChoiceAction::InitialBasePlacement),
            "agenda_selection" => Ok(ChoiceAction::AgendaSelection),
            "resolve_place_base" => Ok(ChoiceAction::ResolvePlaceBase),
            "reaction" => Ok(ChoiceAction::Reaction),
            other => Err(other.to_string()),
        }
    }
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceOption {
    City(CityId),
    Party(PartyId),
    Agenda(String),
    Reaction(ReactionOption),
    Pass,
}

impl fmt::Display for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceOption::City(city) => write!(f, "{}", city),
            ChoiceOption::Party(party) => write!(f, "{}", party),
            ChoiceOption::Agenda(agenda) => f.write_str(agenda),
            ChoiceOption::Reaction(reaction) => write!(f, "{}", reaction),
            ChoiceOption::Pass => f.write_str("PASS"),
        }
    }
}

/// Context sent alongside a choice request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceContext {
    pub action: ChoiceAction,
    pub prompt: String,
    /// City the choice concerns, when there is one
    #[serde(default)]
    pub city: Option<CityId>,
}

impl ChoiceContext {
    pub fn new(action: ChoiceAction, prompt: impl Into<String>) -> Self {
        Self {
            action,
            prompt: prompt.into(),
            city: None,
        }
    }

    pub fn in_city(mut self, city: CityId) -> Self {
        self.city = Some(city);
        self
    }
}

/// Outbound request for a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub player: PartyId,
    pub options: Vec<ChoiceOption>,
    pub context: ChoiceContext,
}

/// Inbound answer to a [`ChoiceRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResponse {
    pub player: PartyId,
    pub action: ChoiceAction,
    pub selected: ChoiceOption,
}

impl ChoiceResponse {
    /// Answer a request with one of its options
    pub fn to(request: &ChoiceRequest, selected: ChoiceOption) -> Self {
        Self {
            player: request.player,
            action: request.context.action,
            selected,
        }
    }
}
