//! Turn/phase state machine
//!
//! The driver calls [`GameEngine::advance`] repeatedly. Each call either does
//! one phase's deterministic work or emits the single outstanding request
//! and yields. Answers come back through [`GameEngine::submit_move`] and
//! [`GameEngine::submit_choice`], which validate before touching the board.
//!
//! Phase flow per round:
//! Setup (first round only) -> AgendaStart -> AgendaAwait -> ImpulseStart
//! -> ImpulseAwaitMove -> [ReactionGathering <-> ReactionAwait ->
//! ChainResolving] -> ImpulseStart ... -> Politics -> AgendaStart

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::sync::Arc;

use crate::board::{Board, InteractionTable};
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{CityId, PartyId};
use crate::engine::choice::{ChoiceAction, ChoiceContext, ChoiceOption, ChoiceRequest, ChoiceResponse};
use crate::engine::events::{EventBus, EventKind, GameEvent, Request, StatusSnapshot};
use crate::engine::moves::{ActionKind, Move};
use crate::engine::phase::Phase;
use crate::engine::reaction::{
    ReactionEffect, ReactionProvider, ReactionSource, ReactionStack, ReactionWindow, StackEntry, StackItem,
    StandardReactions,
};
use crate::engine::setup::{SetupMachine, SetupStep};
use crate::knowledge::Knowledge;
use crate::scenario::Scenario;

/// What one call to [`GameEngine::advance`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Deterministic work was done; call again
    Progressed,
    /// Waiting on this request; answer it before advancing further
    Awaiting(Request),
    GameOver,
}

/// Why a submission was turned away
///
/// None of these change the board. The pending request is re-published to
/// its player after every rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("{player} may not act now, waiting on {expected}")]
    NotYourTurn { player: PartyId, expected: PartyId },

    #[error("no {expected} is pending in phase {phase}")]
    WrongPhase { phase: Phase, expected: &'static str },

    #[error("'{0}' is not one of the offered options")]
    InvalidChoice(String),

    #[error("choice answers '{got}' but '{expected}' is pending")]
    ActionMismatch { expected: ChoiceAction, got: ChoiceAction },

    #[error("unknown choice action '{0}'")]
    UnknownAction(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("the match is over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    Rejected(Rejection),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted)
    }
}

/// A take-control into a full city, waiting for the actor to pick a victim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBaseRemoval {
    pub actor: PartyId,
    pub city: CityId,
    pub victims: Vec<PartyId>,
}

/// One match: board, phase machine and notification bus
pub struct GameEngine {
    pub(super) config: EngineConfig,
    pub(super) board: Board,
    pub(super) phase: Phase,
    pub(super) bus: EventBus,
    reactions: Box<dyn ReactionProvider>,

    // === REQUEST TRACKING ===
    /// Single outstanding request
    pending: Option<Request>,

    // === PHASE STATE ===
    setup: SetupMachine,
    agenda_poll: usize,
    pub(super) active_index: usize,
    impulses_taken: usize,
    consecutive_passes: usize,
    window: Option<ReactionWindow>,
    pub(super) base_removal: Option<PendingBaseRemoval>,

    abort_cause: Option<String>,
}

impl GameEngine {
    /// Build the board, apply the scenario and start in `SETUP`
    pub fn new(knowledge: Arc<Knowledge>, scenario: &Scenario, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(EngineError::Config)?;

        let interactions = InteractionTable::new(config.threat_interactions.clone());
        let mut board = Board::new(knowledge, interactions, &config.turn_order)?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let placed = scenario.apply(&mut board, &mut rng)?;

        let setup = SetupMachine::new(&config.turn_order, &scenario.base_quotas());
        let reactions = Box::new(StandardReactions::from_config(&config));

        let mut engine = Self {
            config,
            board,
            phase: Phase::Setup,
            bus: EventBus::new(),
            reactions,
            pending: None,
            setup,
            agenda_poll: 0,
            active_index: 0,
            impulses_taken: 0,
            consecutive_passes: 0,
            window: None,
            base_removal: None,
            abort_cause: None,
        };

        for (template, location) in placed {
            engine.bus.publish(GameEvent::ThreatPlaced { template, location });
        }
        engine.board.check_integrity()?;

        tracing::info!(
            "match '{}' ready: {} parties, {} cities",
            scenario.name,
            engine.config.turn_order.len(),
            engine.board.city_ids().len()
        );
        Ok(engine)
    }

    /// Swap the capability provider used to list reactions
    pub fn with_reaction_provider(mut self, provider: impl ReactionProvider + 'static) -> Self {
        self.reactions = Box::new(provider);
        self
    }

    // === ACCESSORS ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn turn_order(&self) -> &[PartyId] {
        &self.config.turn_order
    }

    pub fn pending_request(&self) -> Option<&Request> {
        self.pending.as_ref()
    }

    /// Party taking the current impulse, outside setup and agenda
    pub fn active_player(&self) -> Option<PartyId> {
        match self.phase {
            Phase::ImpulsePhaseStart
            | Phase::ImpulsePhaseAwaitMove
            | Phase::ReactionWindowGathering
            | Phase::ReactionWindowAwaitChoice
            | Phase::ReactionChainResolving
            | Phase::BaseRemovalAwaitChoice => self.config.turn_order.get(self.active_index).copied(),
            _ => None,
        }
    }

    /// Reaction stack of the open window, if any
    pub fn reaction_stack(&self) -> Option<&ReactionStack> {
        self.window.as_ref().map(|w| &w.stack)
    }

    /// Interruptible move held until its window fully resolves
    pub fn pending_move(&self) -> Option<&Move> {
        self.window.as_ref().and_then(|w| w.pending_move.as_ref())
    }

    pub fn abort_cause(&self) -> Option<&str> {
        self.abort_cause.as_deref()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: self.phase,
            active_player: self.active_player(),
            board: self.board.snapshot(),
        }
    }

    // === NOTIFICATIONS ===

    pub fn subscribe(&mut self, kind: EventKind, handler: impl FnMut(&GameEvent) + 'static) {
        self.bus.subscribe(kind, handler);
    }

    pub fn subscribe_all(&mut self, handler: impl FnMut(&GameEvent) + 'static) {
        self.bus.subscribe_all(handler);
    }

    pub fn events(&self) -> &[GameEvent] {
        self.bus.journal()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.bus.drain()
    }

    // === DRIVING ===

    /// Do one step of work, or report the request being waited on
    pub fn advance(&mut self) -> Result<AdvanceOutcome> {
        if self.phase.is_terminal() {
            return Ok(AdvanceOutcome::GameOver);
        }
        if let Some(request) = &self.pending {
            return Ok(AdvanceOutcome::Awaiting(request.clone()));
        }
        let result = self.step();
        self.checked(result)
    }

    fn step(&mut self) -> Result<AdvanceOutcome> {
        match self.phase {
            Phase::Setup => self.step_setup(),

            Phase::AgendaPhaseStart => {
                self.agenda_poll = 0;
                for party in self.config.turn_order.clone() {
                    if let Some(state) = self.board.party_mut(party) {
                        state.agenda = None;
                    }
                }
                self.transition(Phase::AgendaPhaseAwaitChoices);
                Ok(AdvanceOutcome::Progressed)
            }

            Phase::AgendaPhaseAwaitChoices => match self.config.turn_order.get(self.agenda_poll).copied() {
                Some(party) => {
                    let options = self.config.agendas.iter().cloned().map(ChoiceOption::Agenda).collect();
                    let context = ChoiceContext::new(
                        ChoiceAction::AgendaSelection,
                        format!("Round {}: choose an agenda for {}", self.board.round, party),
                    );
                    Ok(self.request_choice(party, options, context))
                }
                None => {
                    self.transition(Phase::ImpulsePhaseStart);
                    Ok(AdvanceOutcome::Progressed)
                }
            },

            Phase::ImpulsePhaseStart => {
                let order_len = self.config.turn_order.len();
                let impulse_cap = self.config.impulses_per_round as usize * order_len;
                if self.impulses_taken >= impulse_cap || self.consecutive_passes >= order_len {
                    tracing::debug!(
                        "impulse phase over after {} impulses ({} consecutive passes)",
                        self.impulses_taken,
                        self.consecutive_passes
                    );
                    self.transition(Phase::PoliticsPhase);
                } else {
                    self.transition(Phase::ImpulsePhaseAwaitMove);
                }
                Ok(AdvanceOutcome::Progressed)
            }

            Phase::ImpulsePhaseAwaitMove => {
                let player = self.current_player()?;
                Ok(self.request(Request::Move { player }))
            }

            Phase::ReactionWindowGathering => self.step_gathering(),
            Phase::ReactionWindowAwaitChoice => self.step_reaction_request(),
            Phase::ReactionChainResolving => self.step_resolve(),

            Phase::BaseRemovalAwaitChoice => {
                let Some(removal) = self.base_removal.clone() else {
                    return Err(EngineError::CorruptState("base removal phase without a pending removal".into()));
                };
                let options = removal.victims.iter().copied().map(ChoiceOption::Party).collect();
                let context = ChoiceContext::new(
                    ChoiceAction::ResolvePlaceBase,
                    format!("{} is full: choose a party to lose a base", removal.city),
                )
                .in_city(removal.city.clone());
                Ok(self.request_choice(removal.actor, options, context))
            }

            Phase::PoliticsPhase => self.step_politics(),

            Phase::GameOver => Ok(AdvanceOutcome::GameOver),
        }
    }

    fn step_setup(&mut self) -> Result<AdvanceOutcome> {
        match self.setup.next_step(&self.board) {
            SetupStep::Request { party, cities } => {
                let options = cities.into_iter().map(ChoiceOption::City).collect();
                let context = ChoiceContext::new(
                    ChoiceAction::InitialBasePlacement,
                    format!("{}: place an initial base ({} left)", party, self.setup.remaining(party)),
                );
                Ok(self.request_choice(party, options, context))
            }
            SetupStep::Complete => {
                tracing::info!("setup complete");
                self.bus.publish(GameEvent::SetupComplete);
                self.publish_status();
                self.transition(Phase::AgendaPhaseStart);
                Ok(AdvanceOutcome::Progressed)
            }
        }
    }

    /// Poll parties for reactions until one has something to offer or the
    /// poll comes back to the actor
    fn step_gathering(&mut self) -> Result<AdvanceOutcome> {
        let Some(mut window) = self.window.take() else {
            return Err(EngineError::CorruptState("reaction gathering without an open window".into()));
        };

        while !window.poll_complete() {
            let party = self.config.turn_order[window.poll];
            let options = self.reactions.available_reactions(&self.board, party, &window.stack);
            if options.is_empty() {
                tracing::debug!("{} has no reaction available", party);
                window.pass();
                continue;
            }

            self.bus.publish(GameEvent::ReactionPolled {
                party,
                options: options.clone(),
            });
            window.awaiting = Some((party, options));
            self.window = Some(window);
            self.transition(Phase::ReactionWindowAwaitChoice);
            return Ok(AdvanceOutcome::Progressed);
        }

        tracing::debug!("reaction window closed with {} item(s)", window.stack.len());
        self.window = Some(window);
        self.bus.publish(GameEvent::ReactionWindowClosed);
        self.transition(Phase::ReactionChainResolving);
        Ok(AdvanceOutcome::Progressed)
    }

    fn step_reaction_request(&mut self) -> Result<AdvanceOutcome> {
        let Some((party, reactions, top)) = self.window.as_ref().and_then(|w| {
            let (party, reactions) = w.awaiting.clone()?;
            Some((party, reactions, w.stack.top().map(|e| describe_item(&e.item))))
        }) else {
            return Err(EngineError::CorruptState("reaction choice without a polled party".into()));
        };

        let mut options: Vec<ChoiceOption> = reactions.into_iter().map(ChoiceOption::Reaction).collect();
        options.push(ChoiceOption::Pass);
        let context = ChoiceContext::new(
            ChoiceAction::Reaction,
            format!("React to {}?", top.unwrap_or_else(|| "nothing".to_string())),
        );
        Ok(self.request_choice(party, options, context))
    }

    /// Pop and apply one stack item; ends the impulse once the stack is empty
    fn step_resolve(&mut self) -> Result<AdvanceOutcome> {
        let Some(mut window) = self.window.take() else {
            return Err(EngineError::CorruptState("chain resolution without an open window".into()));
        };

        let Some(StackEntry {
            item,
            responds_to,
            cancelled,
        }) = window.stack.pop()
        else {
            tracing::debug!("reaction stack empty, impulse complete");
            self.end_impulse();
            return Ok(AdvanceOutcome::Progressed);
        };

        if cancelled {
            tracing::info!("{} was cancelled", describe_item(&item));
        } else {
            match &item {
                StackItem::Move(mv) => {
                    tracing::info!("resolving {}", mv);
                    if self.execute_move(mv)? {
                        return Err(EngineError::CorruptState(format!(
                            "{} suspended during chain resolution",
                            mv
                        )));
                    }
                }
                StackItem::BoardReaction(reaction) | StackItem::PoliticianCard(reaction) => {
                    tracing::info!("resolving {}", reaction);
                    if reaction.effect == ReactionEffect::CancelTarget {
                        if let Some(target) = responds_to {
                            window.stack.cancel(target);
                        }
                    }
                }
            }
        }

        self.window = Some(window);
        self.bus.publish(GameEvent::StackItemResolved { item, cancelled });
        self.publish_status();
        Ok(AdvanceOutcome::Progressed)
    }

    fn step_politics(&mut self) -> Result<AdvanceOutcome> {
        if self.board.round >= self.config.max_rounds {
            self.finish(format!("round limit {} reached", self.config.max_rounds));
            return Ok(AdvanceOutcome::GameOver);
        }

        self.board.round += 1;
        self.impulses_taken = 0;
        self.consecutive_passes = 0;
        self.active_index = 0;
        tracing::info!("round {} begins", self.board.round);
        self.bus.publish(GameEvent::RoundStarted { round: self.board.round });
        self.publish_status();
        self.transition(Phase::AgendaPhaseStart);
        Ok(AdvanceOutcome::Progressed)
    }

    // === INBOUND ===

    /// Accept a move from the active player
    pub fn submit_move(&mut self, mv: Move) -> Result<Submission> {
        if self.phase.is_terminal() {
            return Ok(Submission::Rejected(Rejection::GameOver));
        }

        let expected = match &self.pending {
            Some(Request::Move { player }) if self.phase == Phase::ImpulsePhaseAwaitMove => Some(*player),
            _ => None,
        };
        let Some(expected) = expected else {
            let phase = self.phase;
            return Ok(self.reject(mv.player, Rejection::WrongPhase { phase, expected: "move" }));
        };
        if mv.player != expected {
            return Ok(self.reject(
                mv.player,
                Rejection::NotYourTurn {
                    player: mv.player,
                    expected,
                },
            ));
        }
        if let Err(reason) = self.check_move(&mv) {
            return Ok(self.reject(mv.player, Rejection::IllegalMove(reason)));
        }

        self.pending = None;
        tracing::info!("move accepted: {}", mv);
        self.bus.publish(GameEvent::MoveAccepted(mv.clone()));
        let result = self.apply_move(mv).map(|_| Submission::Accepted);
        self.checked(result)
    }

    fn apply_move(&mut self, mv: Move) -> Result<()> {
        if let Some(card) = &mv.card_id {
            if let Some(party) = self.board.party_mut(mv.player) {
                party.discard(card);
            }
        }

        if mv.kind == ActionKind::Pass {
            self.consecutive_passes += 1;
        } else {
            self.consecutive_passes = 0;
        }

        if mv.kind.is_interruptible() {
            let window = ReactionWindow::open(mv.clone(), self.active_index, self.config.turn_order.len());
            self.window = Some(window);
            self.bus.publish(GameEvent::ReactionWindowOpened(mv));
            self.transition(Phase::ReactionWindowGathering);
            return Ok(());
        }

        let suspended = self.execute_move(&mv)?;
        if !suspended {
            self.publish_status();
            self.end_impulse();
        }
        Ok(())
    }

    /// Accept an answer to the pending choice request
    pub fn submit_choice(&mut self, response: ChoiceResponse) -> Result<Submission> {
        if self.phase.is_terminal() {
            return Ok(Submission::Rejected(Rejection::GameOver));
        }

        let Some(Request::Choice(request)) = self.pending.clone() else {
            let phase = self.phase;
            return Ok(self.reject(response.player, Rejection::WrongPhase { phase, expected: "choice" }));
        };
        if response.player != request.player {
            return Ok(self.reject(
                response.player,
                Rejection::NotYourTurn {
                    player: response.player,
                    expected: request.player,
                },
            ));
        }
        if response.action != request.context.action {
            return Ok(self.reject(
                response.player,
                Rejection::ActionMismatch {
                    expected: request.context.action,
                    got: response.action,
                },
            ));
        }
        if !request.options.contains(&response.selected) {
            return Ok(self.reject(response.player, Rejection::InvalidChoice(response.selected.to_string())));
        }

        self.pending = None;
        tracing::info!("{} chose {} for {}", response.player, response.selected, response.action);
        self.bus.publish(GameEvent::ChoiceAccepted(response.clone()));

        let ChoiceResponse {
            player,
            action,
            selected,
        } = response;
        let result = match action {
            ChoiceAction::InitialBasePlacement => self.on_setup_choice(player, selected),
            ChoiceAction::AgendaSelection => self.on_agenda_choice(player, selected),
            ChoiceAction::ResolvePlaceBase => self.on_base_removal_choice(player, selected),
            ChoiceAction::Reaction => self.on_reaction_choice(player, selected),
        };
        self.checked(result.map(|_| Submission::Accepted))
    }

    /// Like [`submit_choice`](Self::submit_choice) with the action as a raw tag
    pub fn submit_choice_tagged(&mut self, player: PartyId, action: &str, selected: ChoiceOption) -> Result<Submission> {
        match action.parse::<ChoiceAction>() {
            Ok(action) => self.submit_choice(ChoiceResponse {
                player,
                action,
                selected,
            }),
            Err(tag) => Ok(self.reject(player, Rejection::UnknownAction(tag))),
        }
    }

    // === CHOICE HANDLERS ===

    fn on_setup_choice(&mut self, party: PartyId, selected: ChoiceOption) -> Result<()> {
        self.expect_phase(Phase::Setup, ChoiceAction::InitialBasePlacement)?;
        let ChoiceOption::City(city) = selected else {
            return Err(EngineError::CorruptState(format!("setup choice was not a city: {}", selected)));
        };
        if !self.place_base(party, &city) {
            return Err(EngineError::CorruptState(format!("offered setup city {} refused a base", city)));
        }
        self.setup.record_placement(party);
        self.publish_status();
        Ok(())
    }

    fn on_agenda_choice(&mut self, party: PartyId, selected: ChoiceOption) -> Result<()> {
        self.expect_phase(Phase::AgendaPhaseAwaitChoices, ChoiceAction::AgendaSelection)?;
        let ChoiceOption::Agenda(agenda) = selected else {
            return Err(EngineError::CorruptState(format!("agenda choice was not an agenda: {}", selected)));
        };
        if let Some(state) = self.board.party_mut(party) {
            state.agenda = Some(agenda.clone());
        }
        self.bus.publish(GameEvent::AgendaSelected { party, agenda });
        self.agenda_poll += 1;
        Ok(())
    }

    fn on_base_removal_choice(&mut self, actor: PartyId, selected: ChoiceOption) -> Result<()> {
        self.expect_phase(Phase::BaseRemovalAwaitChoice, ChoiceAction::ResolvePlaceBase)?;
        let ChoiceOption::Party(victim) = selected else {
            return Err(EngineError::CorruptState(format!("base removal choice was not a party: {}", selected)));
        };
        let Some(removal) = self.base_removal.take() else {
            return Err(EngineError::CorruptState("base removal answered with nothing pending".into()));
        };

        if !self.remove_base(victim, &removal.city) {
            return Err(EngineError::CorruptState(format!("{} has no base to lose in {}", victim, removal.city)));
        }
        if !self.place_base(actor, &removal.city) {
            return Err(EngineError::CorruptState(format!("{} still full after removal", removal.city)));
        }
        self.publish_status();
        self.end_impulse();
        Ok(())
    }

    fn on_reaction_choice(&mut self, party: PartyId, selected: ChoiceOption) -> Result<()> {
        self.expect_phase(Phase::ReactionWindowAwaitChoice, ChoiceAction::Reaction)?;
        let Some(mut window) = self.window.take() else {
            return Err(EngineError::CorruptState("reaction answered with no open window".into()));
        };

        match selected {
            ChoiceOption::Pass => window.pass(),
            ChoiceOption::Reaction(reaction) => {
                if reaction.source == ReactionSource::PoliticianCard {
                    if let Some(state) = self.board.party_mut(party) {
                        state.discard(&reaction.id);
                    }
                }
                window.react(reaction.clone());
                self.bus.publish(GameEvent::ReactionAdded(reaction));
            }
            other => {
                self.window = Some(window);
                return Err(EngineError::CorruptState(format!("reaction choice was {}", other)));
            }
        }

        self.window = Some(window);
        self.transition(Phase::ReactionWindowGathering);
        Ok(())
    }

    // === HELPERS ===

    pub(super) fn current_player(&self) -> Result<PartyId> {
        self.config
            .turn_order
            .get(self.active_index)
            .copied()
            .ok_or_else(|| EngineError::CorruptState(format!("active index {} out of range", self.active_index)))
    }

    fn expect_phase(&self, phase: Phase, action: ChoiceAction) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(EngineError::CorruptState(format!(
                "{} choice reached its handler in phase {}",
                action, self.phase
            )))
        }
    }

    pub(super) fn transition(&mut self, to: Phase) {
        if self.phase != to {
            tracing::debug!("phase {} -> {}", self.phase, to);
            self.bus.publish(GameEvent::PhaseChanged { from: self.phase, to });
            self.phase = to;
        }
    }

    fn request(&mut self, request: Request) -> AdvanceOutcome {
        self.announce(&request);
        self.pending = Some(request.clone());
        AdvanceOutcome::Awaiting(request)
    }

    fn request_choice(&mut self, player: PartyId, options: Vec<ChoiceOption>, context: ChoiceContext) -> AdvanceOutcome {
        self.request(Request::Choice(ChoiceRequest {
            player,
            options,
            context,
        }))
    }

    fn announce(&mut self, request: &Request) {
        match request {
            Request::Move { player } => self.bus.publish(GameEvent::MoveRequested { player: *player }),
            Request::Choice(choice) => self.bus.publish(GameEvent::ChoiceRequested(choice.clone())),
        }
    }

    /// Report a rejected submission and re-issue the pending request
    fn reject(&mut self, submitter: PartyId, rejection: Rejection) -> Submission {
        tracing::warn!("rejected submission from {}: {}", submitter, rejection);
        self.bus.publish(GameEvent::Error {
            target: Some(submitter),
            text: rejection.to_string(),
        });
        if let Some(request) = self.pending.clone() {
            self.announce(&request);
        }
        Submission::Rejected(rejection)
    }

    pub(super) fn publish_status(&mut self) {
        let status = self.status();
        self.bus.publish(GameEvent::Status(Box::new(status)));
    }

    pub(super) fn end_impulse(&mut self) {
        self.window = None;
        self.impulses_taken += 1;
        self.active_index = (self.active_index + 1) % self.config.turn_order.len();
        self.transition(Phase::ImpulsePhaseStart);
    }

    fn finish(&mut self, reason: String) {
        tracing::info!("game over: {}", reason);
        self.pending = None;
        self.transition(Phase::GameOver);
        self.bus.publish(GameEvent::GameOver { reason });
    }

    /// Verify the board after an entry point; any fatal error ends the match
    fn checked<T>(&mut self, result: Result<T>) -> Result<T> {
        let result = result.and_then(|value| self.board.check_integrity().map(|_| value));
        if let Err(err) = &result {
            self.abort(err.to_string());
        }
        result
    }

    /// End the match with a fatal cause
    ///
    /// Used for internal corruption and by drivers that cannot continue.
    pub fn abort(&mut self, cause: String) {
        if self.abort_cause.is_some() {
            return;
        }
        tracing::error!("match aborted: {}", cause);
        self.window = None;
        self.base_removal = None;
        self.bus.publish(GameEvent::Error {
            target: None,
            text: cause.clone(),
        });
        self.abort_cause = Some(cause.clone());
        self.finish(format!("aborted: {}", cause));
    }
}

fn describe_item(item: &StackItem) -> String {
    match item {
        StackItem::Move(mv) => mv.to_string(),
        StackItem::BoardReaction(r) | StackItem::PoliticianCard(r) => r.to_string(),
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("phase", &self.phase)
            .field("round", &self.board.round)
            .field("pending", &self.pending)
            .field("active_index", &self.active_index)
            .field("abort_cause", &self.abort_cause)
            .finish_non_exhaustive()
    }
}
