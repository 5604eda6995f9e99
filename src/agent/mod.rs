//! Decision providers and the loop that drives a match with them
//!
//! The engine never calls an agent itself. [`MatchDriver`] owns the loop:
//! advance the engine, hand any request to the right agent, submit the
//! answer, repeat.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::error::{EngineError, Result};
use crate::core::types::{PartyId, Round};
use crate::engine::{AdvanceOutcome, ChoiceOption, ChoiceRequest, ChoiceResponse, GameEngine, GameEvent, Move, Request};

/// Supplies moves and choices for one party
pub trait Agent {
    fn party(&self) -> PartyId;

    /// Pick a move for the party's impulse
    fn next_move(&mut self, engine: &GameEngine) -> Move;

    /// Pick one of the request's options
    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceOption;

    /// Notification addressed to this party or to everyone
    fn receive(&mut self, _event: &GameEvent) {}
}

/// Picks uniformly among legal moves and offered options
#[derive(Debug, Clone)]
pub struct RandomAgent {
    party: PartyId,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(party: PartyId, seed: u64) -> Self {
        Self {
            party,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn party(&self) -> PartyId {
        self.party
    }

    fn next_move(&mut self, engine: &GameEngine) -> Move {
        let moves = engine.valid_moves(self.party);
        if moves.is_empty() {
            return Move::pass(self.party);
        }
        let idx = self.rng.gen_range(0..moves.len());
        moves[idx].clone()
    }

    fn choose(&mut self, request: &ChoiceRequest) -> ChoiceOption {
        if request.options.is_empty() {
            return ChoiceOption::Pass;
        }
        let idx = self.rng.gen_range(0..request.options.len());
        request.options[idx].clone()
    }

    fn receive(&mut self, event: &GameEvent) {
        if let GameEvent::Error { text, .. } = event {
            tracing::debug!("{} was told: {}", self.party, text);
        }
    }
}

/// How a driven match stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchEnd {
    /// The engine reached `GAME_OVER`
    Finished { reason: String },
    /// The driver gave up after its step budget
    StepLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub end: MatchEnd,
    pub steps: usize,
    pub round: Round,
    pub moves: usize,
    pub choices: usize,
    pub rejections: usize,
}

/// Drives one engine with one agent per party
pub struct MatchDriver<'a> {
    engine: &'a mut GameEngine,
    agents: Vec<Box<dyn Agent>>,
    max_steps: usize,
}

impl<'a> MatchDriver<'a> {
    pub fn new(engine: &'a mut GameEngine, agents: Vec<Box<dyn Agent>>) -> Self {
        Self {
            engine,
            agents,
            max_steps: 100_000,
        }
    }

    /// Random agents for every party in turn order, seeded from `seed`
    pub fn with_random_agents(engine: &'a mut GameEngine, seed: u64) -> Self {
        let agents = engine
            .turn_order()
            .iter()
            .enumerate()
            .map(|(i, party)| Box::new(RandomAgent::new(*party, seed.wrapping_add(i as u64))) as Box<dyn Agent>)
            .collect();
        Self::new(engine, agents)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Run until the match ends or the step budget runs out
    ///
    /// A fatal error is returned as-is with the engine already in
    /// `GAME_OVER` and the cause recorded. A request for a party with no
    /// agent aborts the match the same way.
    pub fn run(&mut self) -> Result<MatchSummary> {
        let mut summary = MatchSummary {
            end: MatchEnd::StepLimit,
            steps: 0,
            round: self.engine.board().round,
            moves: 0,
            choices: 0,
            rejections: 0,
        };
        let mut end_reason = None;

        while summary.steps < self.max_steps {
            summary.steps += 1;
            let outcome = self.engine.advance();
            end_reason = self.deliver_events().or(end_reason);
            let outcome = outcome?;

            match outcome {
                AdvanceOutcome::Progressed => {}
                AdvanceOutcome::GameOver => {
                    summary.end = MatchEnd::Finished {
                        reason: end_reason.unwrap_or_else(|| "game over".to_string()),
                    };
                    break;
                }
                AdvanceOutcome::Awaiting(request) => {
                    let player = request.player();
                    let Some(agent) = self.agents.iter_mut().find(|a| a.party() == player) else {
                        let cause = format!("no agent plays {}", player);
                        self.engine.abort(cause.clone());
                        self.deliver_events();
                        return Err(EngineError::MatchAborted(cause));
                    };

                    let submission = match request {
                        Request::Move { .. } => {
                            summary.moves += 1;
                            let mv = agent.next_move(self.engine);
                            self.engine.submit_move(mv)?
                        }
                        Request::Choice(choice) => {
                            summary.choices += 1;
                            let selected = agent.choose(&choice);
                            self.engine.submit_choice(ChoiceResponse::to(&choice, selected))?
                        }
                    };
                    if !submission.is_accepted() {
                        summary.rejections += 1;
                    }
                }
            }
        }

        if summary.end == MatchEnd::StepLimit {
            tracing::warn!("match stopped after {} steps without finishing", summary.steps);
        }
        summary.round = self.engine.board().round;
        Ok(summary)
    }

    /// Hand new events to the agents they are addressed to
    ///
    /// Returns the game-over reason if one was published.
    fn deliver_events(&mut self) -> Option<String> {
        let mut reason = None;
        for event in self.engine.drain_events() {
            if let GameEvent::GameOver { reason: r } = &event {
                reason = Some(r.clone());
            }
            for agent in self.agents.iter_mut().filter(|a| event.is_for(a.party())) {
                agent.receive(&event);
            }
        }
        reason
    }
}
