//! Reaction windows and the LIFO reaction stack
//!
//! An interruptible move opens a window. Parties are polled in turn order
//! starting after the actor; a reaction is pushed and polling continues
//! after the reactor, so later parties may answer the new top item. When
//! polling comes back around to the actor the window closes and the stack
//! resolves last in, first out. The actor is never polled on its own move.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::board::Board;
use crate::core::config::EngineConfig;
use crate::core::types::PartyId;
use crate::engine::moves::Move;

/// What resolving a reaction does to the item it answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionEffect {
    /// The answered item is skipped when it resolves
    CancelTarget,
    NoEffect,
}

/// A board reaction a party may use, from config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardReactionDef {
    pub party: PartyId,
    pub id: String,
    pub effect: ReactionEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionSource {
    Board,
    PoliticianCard,
}

/// One reaction offered to a polled party
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactionOption {
    pub reactor: PartyId,
    pub source: ReactionSource,
    /// Board reaction id or card id
    pub id: String,
    pub effect: ReactionEffect,
}

impl fmt::Display for ReactionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            ReactionSource::Board => write!(f, "{} board reaction '{}'", self.reactor, self.id),
            ReactionSource::PoliticianCard => write!(f, "{} plays '{}'", self.reactor, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItem {
    /// The interruptible move that opened the window
    Move(Move),
    BoardReaction(ReactionOption),
    PoliticianCard(ReactionOption),
}

impl StackItem {
    pub fn reaction(&self) -> Option<&ReactionOption> {
        match self {
            StackItem::Move(_) => None,
            StackItem::BoardReaction(r) | StackItem::PoliticianCard(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub item: StackItem,
    /// Index of the entry this one answered
    pub responds_to: Option<usize>,
    pub cancelled: bool,
}

/// LIFO stack for one reaction window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionStack {
    entries: Vec<StackEntry>,
}

impl ReactionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_move(mv: Move) -> Self {
        Self {
            entries: vec![StackEntry {
                item: StackItem::Move(mv),
                responds_to: None,
                cancelled: false,
            }],
        }
    }

    /// Push a reaction answering the current top item
    pub fn push_reaction(&mut self, reaction: ReactionOption) {
        let responds_to = self.entries.len().checked_sub(1);
        let item = match reaction.source {
            ReactionSource::Board => StackItem::BoardReaction(reaction),
            ReactionSource::PoliticianCard => StackItem::PoliticianCard(reaction),
        };
        self.entries.push(StackEntry {
            item,
            responds_to,
            cancelled: false,
        });
    }

    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn cancel(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.cancelled = true;
        }
    }

    /// Whether a board reaction already answers the entry at `index`
    pub fn board_reaction_answers(&self, index: usize) -> bool {
        self.entries
            .iter()
            .any(|e| e.responds_to == Some(index) && matches!(e.item, StackItem::BoardReaction(_)))
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Polling state of an open reaction window
///
/// Positions are indexes into the turn order.
#[derive(Debug, Clone)]
pub struct ReactionWindow {
    /// Party whose move opened the window; polling closes on reaching it
    pub actor: usize,
    /// Next party to poll
    pub poll: usize,
    pub stack: ReactionStack,
    /// Cleared only once the stack has fully resolved
    pub pending_move: Option<Move>,
    /// Polled party and the reactions it was offered
    pub awaiting: Option<(PartyId, Vec<ReactionOption>)>,
    len: usize,
}

impl ReactionWindow {
    pub fn open(mv: Move, actor: usize, turn_order_len: usize) -> Self {
        Self {
            actor,
            poll: (actor + 1) % turn_order_len,
            stack: ReactionStack::with_move(mv.clone()),
            pending_move: Some(mv),
            awaiting: None,
            len: turn_order_len,
        }
    }

    /// Polling has come back around to the actor
    pub fn poll_complete(&self) -> bool {
        self.poll == self.actor
    }

    /// Polled party passed
    pub fn pass(&mut self) {
        self.awaiting = None;
        self.poll = (self.poll + 1) % self.len;
    }

    /// Polled party reacted; polling picks up after it
    pub fn react(&mut self, reaction: ReactionOption) {
        self.awaiting = None;
        self.stack.push_reaction(reaction);
        self.poll = (self.poll + 1) % self.len;
    }
}

/// Answers which reactions a party could use against the current top item
pub trait ReactionProvider {
    fn available_reactions(&self, board: &Board, party: PartyId, stack: &ReactionStack) -> Vec<ReactionOption>;
}

/// Board reactions from config plus reaction cards held in hand
///
/// A board reaction may only answer an original move, and only one board
/// reaction may answer it. Reaction cards may answer anything and always
/// cancel what they answer.
#[derive(Debug, Clone, Default)]
pub struct StandardReactions {
    board_reactions: Vec<BoardReactionDef>,
    reaction_cards: BTreeSet<String>,
}

impl StandardReactions {
    pub fn new(board_reactions: Vec<BoardReactionDef>, reaction_cards: impl IntoIterator<Item = String>) -> Self {
        Self {
            board_reactions,
            reaction_cards: reaction_cards.into_iter().collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.board_reactions.clone(), config.reaction_cards.iter().cloned())
    }
}

impl ReactionProvider for StandardReactions {
    fn available_reactions(&self, board: &Board, party: PartyId, stack: &ReactionStack) -> Vec<ReactionOption> {
        let Some(top) = stack.top() else {
            return Vec::new();
        };
        let top_index = stack.len() - 1;
        let mut options = Vec::new();

        if matches!(top.item, StackItem::Move(_)) && !stack.board_reaction_answers(top_index) {
            options.extend(
                self.board_reactions
                    .iter()
                    .filter(|def| def.party == party)
                    .map(|def| ReactionOption {
                        reactor: party,
                        source: ReactionSource::Board,
                        id: def.id.clone(),
                        effect: def.effect,
                    }),
            );
        }

        if let Some(state) = board.party(party) {
            options.extend(
                state
                    .hand_party
                    .iter()
                    .filter(|card| self.reaction_cards.contains(*card))
                    .map(|card| ReactionOption {
                        reactor: party,
                        source: ReactionSource::PoliticianCard,
                        id: card.clone(),
                        effect: ReactionEffect::CancelTarget,
                    }),
            );
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::InteractionTable;
    use crate::engine::moves::ActionKind;
    use crate::knowledge::Knowledge;
    use std::sync::Arc;

    fn coup() -> Move {
        Move::in_city(PartyId::Spd, ActionKind::Coup, "Berlin")
    }

    fn option(reactor: PartyId, source: ReactionSource, id: &str) -> ReactionOption {
        ReactionOption {
            reactor,
            source,
            id: id.to_string(),
            effect: ReactionEffect::CancelTarget,
        }
    }

    #[test]
    fn test_stack_is_lifo_and_links_targets() {
        let mut stack = ReactionStack::with_move(coup());
        stack.push_reaction(option(PartyId::Kpd, ReactionSource::Board, "general_strike"));
        stack.push_reaction(option(PartyId::Dnvp, ReactionSource::PoliticianCard, "stahlhelm"));

        assert!(stack.board_reaction_answers(0));
        let top = stack.pop().unwrap();
        assert_eq!(top.responds_to, Some(1));
        assert!(matches!(top.item, StackItem::PoliticianCard(_)));
        let next = stack.pop().unwrap();
        assert_eq!(next.responds_to, Some(0));
        assert!(matches!(stack.pop().unwrap().item, StackItem::Move(_)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_window_polls_until_actor() {
        let mut window = ReactionWindow::open(coup(), 2, 4);
        let mut visited = Vec::new();
        while !window.poll_complete() {
            visited.push(window.poll);
            window.pass();
        }
        assert_eq!(visited, vec![3, 0, 1]);
    }

    #[test]
    fn test_window_continues_after_reactor_and_closes_at_actor() {
        let mut window = ReactionWindow::open(coup(), 0, 4);
        window.pass(); // 1 passes
        window.react(option(PartyId::Kpd, ReactionSource::Board, "general_strike")); // 2 reacts
        assert_eq!(window.poll, 3);
        assert_eq!(window.stack.len(), 2);
        assert_eq!(window.pending_move, Some(coup()));

        window.pass(); // 3 passes
        assert!(window.poll_complete());
    }

    #[test]
    fn test_standard_reactions_one_board_reaction_per_move() {
        let board = Board::new(
            Arc::new(Knowledge::new().with_city("Berlin", 2)),
            InteractionTable::default(),
            &PartyId::ALL,
        )
        .unwrap();
        let provider = StandardReactions::new(
            vec![
                BoardReactionDef {
                    party: PartyId::Kpd,
                    id: "general_strike".into(),
                    effect: ReactionEffect::CancelTarget,
                },
                BoardReactionDef {
                    party: PartyId::Dnvp,
                    id: "freikorps".into(),
                    effect: ReactionEffect::NoEffect,
                },
            ],
            Vec::new(),
        );

        let mut stack = ReactionStack::with_move(coup());
        assert_eq!(provider.available_reactions(&board, PartyId::Kpd, &stack).len(), 1);
        assert!(provider.available_reactions(&board, PartyId::Zentrum, &stack).is_empty());

        stack.push_reaction(option(PartyId::Kpd, ReactionSource::Board, "general_strike"));
        // Top is now a board reaction, so no further board reactions
        assert!(provider.available_reactions(&board, PartyId::Dnvp, &stack).is_empty());
    }
}
