//! Outbound notifications and the per-engine event bus
//!
//! The engine publishes every request and state change here. Observers
//! subscribe per [`EventKind`] (or to everything); the bus also keeps a
//! journal so drivers and tests can read what happened since they last looked.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::BoardSnapshot;
use crate::core::types::{CityId, Location, PartyId, Round, TemplateId};
use crate::engine::choice::{ChoiceRequest, ChoiceResponse};
use crate::engine::moves::Move;
use crate::engine::phase::Phase;
use crate::engine::reaction::{ReactionOption, StackItem};

/// The one outstanding request the engine is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    Move { player: PartyId },
    Choice(ChoiceRequest),
}

impl Request {
    pub fn player(&self) -> PartyId {
        match self {
            Request::Move { player } => *player,
            Request::Choice(choice) => choice.player,
        }
    }
}

/// Read-only status projection sent after each mutating step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub phase: Phase,
    pub active_player: Option<PartyId>,
    pub board: BoardSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    RoundStarted { round: Round },

    // === REQUESTS ===
    MoveRequested { player: PartyId },
    ChoiceRequested(ChoiceRequest),

    // === ACCEPTED INPUT ===
    MoveAccepted(Move),
    ChoiceAccepted(ChoiceResponse),
    AgendaSelected { party: PartyId, agenda: String },
    SetupComplete,

    // === BOARD CHANGES ===
    BasePlaced { party: PartyId, city: CityId },
    BaseRemoved { party: PartyId, city: CityId },
    ThreatPlaced { template: TemplateId, location: Location },
    UnitDeployed { party: PartyId, template: TemplateId, city: CityId },

    // === REACTIONS ===
    ReactionWindowOpened(Move),
    ReactionPolled { party: PartyId, options: Vec<ReactionOption> },
    ReactionAdded(ReactionOption),
    StackItemResolved { item: StackItem, cancelled: bool },
    ReactionWindowClosed,

    Status(Box<StatusSnapshot>),
    /// Non-fatal problem with a submission, or the cause of an abort
    Error { target: Option<PartyId>, text: String },
    GameOver { reason: String },
}

/// Discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PhaseChanged,
    RoundStarted,
    MoveRequested,
    ChoiceRequested,
    MoveAccepted,
    ChoiceAccepted,
    AgendaSelected,
    SetupComplete,
    BasePlaced,
    BaseRemoved,
    ThreatPlaced,
    UnitDeployed,
    ReactionWindowOpened,
    ReactionPolled,
    ReactionAdded,
    StackItemResolved,
    ReactionWindowClosed,
    Status,
    Error,
    GameOver,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::PhaseChanged { .. } => EventKind::PhaseChanged,
            GameEvent::RoundStarted { .. } => EventKind::RoundStarted,
            GameEvent::MoveRequested { .. } => EventKind::MoveRequested,
            GameEvent::ChoiceRequested(_) => EventKind::ChoiceRequested,
            GameEvent::MoveAccepted(_) => EventKind::MoveAccepted,
            GameEvent::ChoiceAccepted(_) => EventKind::ChoiceAccepted,
            GameEvent::AgendaSelected { .. } => EventKind::AgendaSelected,
            GameEvent::SetupComplete => EventKind::SetupComplete,
            GameEvent::BasePlaced { .. } => EventKind::BasePlaced,
            GameEvent::BaseRemoved { .. } => EventKind::BaseRemoved,
            GameEvent::ThreatPlaced { .. } => EventKind::ThreatPlaced,
            GameEvent::UnitDeployed { .. } => EventKind::UnitDeployed,
            GameEvent::ReactionWindowOpened(_) => EventKind::ReactionWindowOpened,
            GameEvent::ReactionPolled { .. } => EventKind::ReactionPolled,
            GameEvent::ReactionAdded(_) => EventKind::ReactionAdded,
            GameEvent::StackItemResolved { .. } => EventKind::StackItemResolved,
            GameEvent::ReactionWindowClosed => EventKind::ReactionWindowClosed,
            GameEvent::Status(_) => EventKind::Status,
            GameEvent::Error { .. } => EventKind::Error,
            GameEvent::GameOver { .. } => EventKind::GameOver,
        }
    }

    /// Party the event is addressed to; `None` means everyone
    pub fn target(&self) -> Option<PartyId> {
        match self {
            GameEvent::MoveRequested { player } => Some(*player),
            GameEvent::ChoiceRequested(request) => Some(request.player),
            GameEvent::Error { target, .. } => *target,
            _ => None,
        }
    }

    /// Whether `party` should see this event
    pub fn is_for(&self, party: PartyId) -> bool {
        self.target().map_or(true, |t| t == party)
    }
}

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Synchronous publish/subscribe owned by one engine
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(Option<EventKind>, Handler)>,
    journal: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every event of `kind`
    pub fn subscribe(&mut self, kind: EventKind, handler: impl FnMut(&GameEvent) + 'static) {
        self.handlers.push((Some(kind), Box::new(handler)));
    }

    pub fn subscribe_all(&mut self, handler: impl FnMut(&GameEvent) + 'static) {
        self.handlers.push((None, Box::new(handler)));
    }

    pub fn publish(&mut self, event: GameEvent) {
        let kind = event.kind();
        for (filter, handler) in self.handlers.iter_mut() {
            if filter.map_or(true, |k| k == kind) {
                handler(&event);
            }
        }
        self.journal.push(event);
    }

    /// Every event published since the last drain
    pub fn journal(&self) -> &[GameEvent] {
        &self.journal
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("journal", &self.journal.len())
            .finish()
    }
}
