//! Top-level phase of a match

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exactly one phase is active at any time
///
/// `*Start`, `ReactionWindowGathering`, `ReactionChainResolving` and
/// `PoliticsPhase` do deterministic work when advanced. The `*Await*` phases
/// emit one request and then wait for the matching response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Setup,
    AgendaPhaseStart,
    AgendaPhaseAwaitChoices,
    ImpulsePhaseStart,
    ImpulsePhaseAwaitMove,
    ReactionWindowGathering,
    ReactionWindowAwaitChoice,
    ReactionChainResolving,
    /// A take-control into a full city waits for the displaced party
    BaseRemovalAwaitChoice,
    PoliticsPhase,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "SETUP",
            Phase::AgendaPhaseStart => "AGENDA_PHASE_START",
            Phase::AgendaPhaseAwaitChoices => "AGENDA_PHASE_AWAIT_CHOICES",
            Phase::ImpulsePhaseStart => "IMPULSE_PHASE_START",
            Phase::ImpulsePhaseAwaitMove => "IMPULSE_PHASE_AWAIT_MOVE",
            Phase::ReactionWindowGathering => "REACTION_WINDOW_GATHERING",
            Phase::ReactionWindowAwaitChoice => "REACTION_WINDOW_AWAIT_CHOICE",
            Phase::ReactionChainResolving => "REACTION_CHAIN_RESOLVING",
            Phase::BaseRemovalAwaitChoice => "BASE_REMOVAL_AWAIT_CHOICE",
            Phase::PoliticsPhase => "POLITICS_PHASE",
            Phase::GameOver => "GAME_OVER",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver)
    }

    /// Phases that wait for an external response
    pub fn awaits_input(&self) -> bool {
        matches!(
            self,
            Phase::AgendaPhaseAwaitChoices
                | Phase::ImpulsePhaseAwaitMove
                | Phase::ReactionWindowAwaitChoice
                | Phase::BaseRemovalAwaitChoice
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
