//! Moves - one player intent for one impulse

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::{CityId, PartyId};

/// Closed set of impulse actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Demonstration,
    Coup,
    CounterCoup,
    Fight,
    Mobilize,
    TakeControl,
    ForeignAffairs,
    Reserve,
    CardPlay,
    Pass,
}

impl ActionKind {
    /// Actions that open a reaction window before they execute
    pub fn is_interruptible(&self) -> bool {
        matches!(
            self,
            ActionKind::Demonstration | ActionKind::Coup | ActionKind::CounterCoup | ActionKind::Fight
        )
    }

    /// Actions that need a target city
    pub fn requires_city(&self) -> bool {
        matches!(
            self,
            ActionKind::Demonstration
                | ActionKind::Coup
                | ActionKind::CounterCoup
                | ActionKind::Fight
                | ActionKind::Mobilize
                | ActionKind::TakeControl
        )
    }
}

/// How a card is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayOption {
    Event,
    Debate,
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTarget {
    City(CityId),
    Party(PartyId),
    Other(String),
}

/// A move submitted by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: PartyId,
    pub kind: ActionKind,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub play_option: Option<PlayOption>,
    #[serde(default)]
    pub target: Option<MoveTarget>,
}

impl Move {
    pub fn new(player: PartyId, kind: ActionKind) -> Self {
        Self {
            player,
            kind,
            card_id: None,
            play_option: None,
            target: None,
        }
    }

    pub fn pass(player: PartyId) -> Self {
        Self::new(player, ActionKind::Pass)
    }

    pub fn in_city(player: PartyId, kind: ActionKind, city: &str) -> Self {
        Self::new(player, kind).with_target(MoveTarget::City(CityId::new(city)))
    }

    pub fn with_target(mut self, target: MoveTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_card(mut self, card: &str, option: PlayOption) -> Self {
        self.card_id = Some(card.to_string());
        self.play_option = Some(option);
        self
    }

    pub fn target_city(&self) -> Option<&CityId> {
        match &self.target {
            Some(MoveTarget::City(city)) => Some(city),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.player, self.kind)?;
        match &self.target {
            Some(MoveTarget::City(city)) => write!(f, " in {}", city)?,
            Some(MoveTarget::Party(party)) => write!(f, " against {}", party)?,
            Some(MoveTarget::Other(other)) => write!(f, " on {}", other)?,
            None => {}
        }
        if let Some(card) = &self.card_id {
            write!(f, " [{}]", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interruptible_kinds() {
        let interruptible: Vec<_> = [
            ActionKind::Demonstration,
            ActionKind::Coup,
            ActionKind::CounterCoup,
            ActionKind::Fight,
            ActionKind::Mobilize,
            ActionKind::TakeControl,
            ActionKind::ForeignAffairs,
            ActionKind::Reserve,
            ActionKind::CardPlay,
            ActionKind::Pass,
        ]
        .into_iter()
        .filter(|k| k.is_interruptible())
        .collect();

        assert_eq!(
            interruptible,
            vec![ActionKind::Demonstration, ActionKind::Coup, ActionKind::CounterCoup, ActionKind::Fight]
        );
    }

    #[test]
    fn test_move_display() {
        let mv = Move::in_city(PartyId::Kpd, ActionKind::Coup, "Berlin").with_card("spartacus", PlayOption::Action);
        assert_eq!(mv.to_string(), "KPD Coup in Berlin [spartacus]");
        assert_eq!(mv.target_city(), Some(&CityId::new("Berlin")));
        assert_eq!(Move::pass(PartyId::Spd).target_city(), None);
    }
}
