//! Move legality and board effects
//!
//! Effects are base-centric; card text is resolved elsewhere. All board
//! writes go through the placement rules.

use crate::board::PlacementOutcome;
use crate::core::error::{EngineError, Result};
use crate::core::types::{CityId, PartyId};
use crate::engine::events::GameEvent;
use crate::engine::game::{GameEngine, PendingBaseRemoval};
use crate::engine::moves::{ActionKind, Move, MoveTarget, PlayOption};
use crate::engine::phase::Phase;

/// City-targeted kinds, in the order `valid_moves` lists them
const CITY_ACTIONS: [ActionKind; 6] = [
    ActionKind::Demonstration,
    ActionKind::Coup,
    ActionKind::CounterCoup,
    ActionKind::Fight,
    ActionKind::Mobilize,
    ActionKind::TakeControl,
];

impl GameEngine {
    // === LEGALITY ===

    /// Check a move against the current board, ignoring whose turn it is
    pub fn check_move(&self, mv: &Move) -> std::result::Result<(), String> {
        let Some(party) = self.board.party(mv.player) else {
            return Err(format!("{} is not in this match", mv.player));
        };

        if let Some(card) = &mv.card_id {
            if !party.holds_card(card) {
                return Err(format!("{} does not hold card '{}'", mv.player, card));
            }
        }
        if mv.kind == ActionKind::CardPlay && mv.card_id.is_none() {
            return Err("card play needs a card".to_string());
        }

        if !mv.kind.requires_city() {
            return Ok(());
        }
        let Some(city_id) = mv.target_city() else {
            return Err(format!("{:?} needs a target city", mv.kind));
        };
        let Some(city) = self.board.city(city_id) else {
            return Err(format!("unknown city {}", city_id));
        };

        let rivals_present = city.parties_present().iter().any(|p| *p != mv.player);
        match mv.kind {
            ActionKind::CounterCoup | ActionKind::Fight if !rivals_present => {
                Err(format!("no rival bases in {}", city_id))
            }
            ActionKind::Mobilize if party.unit_supply.is_empty() => {
                Err(format!("{} has no units in supply", mv.player))
            }
            _ => Ok(()),
        }
    }

    /// Every legal move for `party`; empty unless it is that party's impulse
    pub fn valid_moves(&self, party: PartyId) -> Vec<Move> {
        if self.phase != Phase::ImpulsePhaseAwaitMove || self.active_player() != Some(party) {
            return Vec::new();
        }
        let Some(state) = self.board.party(party) else {
            return Vec::new();
        };

        let mut candidates = vec![
            Move::pass(party),
            Move::new(party, ActionKind::Reserve),
            Move::new(party, ActionKind::ForeignAffairs),
        ];
        for card in &state.hand_party {
            candidates.push(Move::new(party, ActionKind::CardPlay).with_card(card, PlayOption::Event));
        }
        for city in self.board.city_ids() {
            for kind in CITY_ACTIONS {
                candidates.push(Move::new(party, kind).with_target(MoveTarget::City(city.clone())));
            }
        }

        candidates.into_iter().filter(|mv| self.check_move(mv).is_ok()).collect()
    }

    // === EFFECTS ===

    /// Apply a move's board effect
    ///
    /// Returns `true` when the move suspended on a base-removal choice; the
    /// impulse ends once that choice comes back.
    pub(super) fn execute_move(&mut self, mv: &Move) -> Result<bool> {
        let actor = mv.player;
        match mv.kind {
            ActionKind::Pass | ActionKind::CardPlay => {}

            ActionKind::Demonstration => {
                let city = self.move_city(mv)?;
                self.place_base(actor, &city);
            }

            ActionKind::TakeControl => {
                let city = self.move_city(mv)?;
                if !self.place_base(actor, &city) {
                    let victims = self.rivals_in(actor, &city);
                    if victims.is_empty() {
                        tracing::debug!("{} already fills {}", actor, city);
                    } else {
                        self.base_removal = Some(PendingBaseRemoval {
                            actor,
                            city,
                            victims,
                        });
                        self.transition(Phase::BaseRemovalAwaitChoice);
                        return Ok(true);
                    }
                }
            }

            ActionKind::Coup => {
                let city = self.move_city(mv)?;
                for rival in self.rivals_in(actor, &city) {
                    self.remove_base(rival, &city);
                }
                self.place_base(actor, &city);
            }

            ActionKind::CounterCoup => {
                let city = self.move_city(mv)?;
                for rival in self.rivals_in(actor, &city) {
                    self.remove_base(rival, &city);
                }
            }

            ActionKind::Fight => {
                let city = self.move_city(mv)?;
                if let Some(rival) = self.strongest_rival(actor, &city) {
                    self.remove_base(rival, &city);
                }
            }

            ActionKind::Mobilize => {
                let city = self.move_city(mv)?;
                let Some(template) = self.board.party_mut(actor).and_then(|p| p.take_supply_unit()) else {
                    tracing::debug!("{} has nothing to mobilize", actor);
                    return Ok(false);
                };
                match self.board.place_unit(&city, &template)? {
                    PlacementOutcome::Placed(_) => {
                        self.bus.publish(GameEvent::UnitDeployed {
                            party: actor,
                            template,
                            city,
                        });
                    }
                    outcome => {
                        tracing::debug!("mobilize {} into {} had no effect: {:?}", template, city, outcome);
                        if let Some(party) = self.board.party_mut(actor) {
                            party.unit_supply.insert(0, template);
                        }
                    }
                }
            }

            ActionKind::ForeignAffairs => {
                self.board.trackers.foreign_affairs_progress += 1;
            }

            ActionKind::Reserve => {
                if let Some(party) = self.board.party_mut(actor) {
                    party.reserved_ap += 1;
                }
            }
        }
        Ok(false)
    }

    /// Place one base and announce it; a full city is a no-op
    pub(super) fn place_base(&mut self, party: PartyId, city: &CityId) -> bool {
        if self.board.place_party_base(party, city) {
            self.bus.publish(GameEvent::BasePlaced {
                party,
                city: city.clone(),
            });
            true
        } else {
            tracing::debug!("no room for a {} base in {}", party, city);
            false
        }
    }

    pub(super) fn remove_base(&mut self, party: PartyId, city: &CityId) -> bool {
        if self.board.remove_party_base(party, city) {
            self.bus.publish(GameEvent::BaseRemoved {
                party,
                city: city.clone(),
            });
            true
        } else {
            false
        }
    }

    fn move_city(&self, mv: &Move) -> Result<CityId> {
        mv.target_city()
            .cloned()
            .ok_or_else(|| EngineError::CorruptState(format!("accepted move without a city: {}", mv)))
    }

    /// Other parties with bases in `city`, in turn order
    fn rivals_in(&self, actor: PartyId, city: &CityId) -> Vec<PartyId> {
        let Some(state) = self.board.city(city) else {
            return Vec::new();
        };
        self.config
            .turn_order
            .iter()
            .copied()
            .filter(|p| *p != actor && state.bases_of(*p) > 0)
            .collect()
    }

    /// Rival with the most bases; ties go to the earliest in turn order
    fn strongest_rival(&self, actor: PartyId, city: &CityId) -> Option<PartyId> {
        let state = self.board.city(city)?;
        let mut best: Option<(PartyId, u32)> = None;
        for rival in self.rivals_in(actor, city) {
            let bases = state.bases_of(rival);
            if best.map_or(true, |(_, most)| bases > most) {
                best = Some((rival, bases));
            }
        }
        best.map(|(party, _)| party)
    }
}
