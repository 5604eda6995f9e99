//! Party state - scores, hands and supply of one party

use serde::{Deserialize, Serialize};

use crate::core::types::{PartyId, TemplateId};

/// Mutable per-party record, created once at game start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyState {
    pub party_id: PartyId,
    pub current_vp: i32,
    pub reserved_ap: u32,
    pub parliament_seats: u32,

    // Cards are opaque ids; their text is resolved elsewhere
    pub hand_timeline: Vec<String>,
    pub hand_party: Vec<String>,
    pub party_deck: Vec<String>,
    pub party_discard_pile: Vec<String>,

    /// Unit templates the party may still mobilize
    pub unit_supply: Vec<TemplateId>,
    pub agenda: Option<String>,
    pub controlled_minor_parties: Vec<String>,
}

impl PartyState {
    pub fn new(party_id: PartyId) -> Self {
        Self {
            party_id,
            current_vp: 0,
            reserved_ap: 0,
            parliament_seats: 0,
            hand_timeline: Vec::new(),
            hand_party: Vec::new(),
            party_deck: Vec::new(),
            party_discard_pile: Vec::new(),
            unit_supply: Vec::new(),
            agenda: None,
            controlled_minor_parties: Vec::new(),
        }
    }

    pub fn holds_card(&self, card: &str) -> bool {
        self.hand_party.iter().chain(&self.hand_timeline).any(|c| c == card)
    }

    /// Move a card from either hand to the discard pile
    pub fn discard(&mut self, card: &str) -> bool {
        for hand in [&mut self.hand_party, &mut self.hand_timeline] {
            if let Some(pos) = hand.iter().position(|c| c == card) {
                let card = hand.remove(pos);
                self.party_discard_pile.push(card);
                return true;
            }
        }
        false
    }

    /// Take the first unit template from supply
    pub fn take_supply_unit(&mut self) -> Option<TemplateId> {
        if self.unit_supply.is_empty() {
            None
        } else {
            Some(self.unit_supply.remove(0))
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand_party.len() + self.hand_timeline.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_moves_card_from_either_hand() {
        let mut party = PartyState::new(PartyId::Zentrum);
        party.hand_party.push("concordat".into());
        party.hand_timeline.push("kapp_putsch".into());

        assert!(party.discard("kapp_putsch"));
        assert!(party.discard("concordat"));
        assert!(!party.discard("concordat"));
        assert_eq!(party.hand_size(), 0);
        assert_eq!(party.party_discard_pile, vec!["kapp_putsch", "concordat"]);
    }

    #[test]
    fn test_take_supply_unit_in_order() {
        let mut party = PartyState::new(PartyId::Spd);
        party.unit_supply = vec![TemplateId::new("reichsbanner"), TemplateId::new("militia")];
        assert_eq!(party.take_supply_unit(), Some(TemplateId::new("reichsbanner")));
        assert_eq!(party.take_supply_unit(), Some(TemplateId::new("militia")));
        assert_eq!(party.take_supply_unit(), None);
    }
}
