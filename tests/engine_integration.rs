//! Integration tests for the match engine
//!
//! These drive a full engine through its public entry points only:
//! - Setup round-robin with a party that runs out of cities
//! - Coup with a reaction window that everyone passes on
//! - Reaction chains answered by politician cards, resolved last in first out
//! - Mid-window reactions that still close polling at the actor
//! - Take-control into a full city and the base-removal choice
//! - Rejected submissions from the wrong party
//! - A complete random match on the shipped demo data

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use weimar_engine::agent::{MatchDriver, MatchEnd};
use weimar_engine::core::config::EngineConfig;
use weimar_engine::core::types::{CityId, PartyId};
use weimar_engine::engine::{
    ActionKind, AdvanceOutcome, ChoiceAction, ChoiceOption, ChoiceResponse, GameEngine, GameEvent, Move, Phase,
    ReactionEffect, Rejection, Request, StackItem, Submission,
};
use weimar_engine::knowledge::{load_knowledge_dir, Knowledge};
use weimar_engine::scenario::{InitialPartySetup, Scenario};

// ============================================================================
// Helpers
// ============================================================================

fn scenario(quotas: &[(PartyId, u32)]) -> Scenario {
    Scenario {
        id: "test".into(),
        name: "Test".into(),
        initial_party_setup: quotas
            .iter()
            .map(|(party, bases)| {
                (
                    *party,
                    InitialPartySetup {
                        city_bases: *bases,
                        parliament_seats: 0,
                    },
                )
            })
            .collect(),
        ..Scenario::default()
    }
}

/// Advance until the engine waits on a request
fn next_request(engine: &mut GameEngine) -> Request {
    for _ in 0..500 {
        match engine.advance().unwrap() {
            AdvanceOutcome::Progressed => {}
            AdvanceOutcome::Awaiting(request) => return request,
            AdvanceOutcome::GameOver => panic!("match ended unexpectedly"),
        }
    }
    panic!("engine never asked for input");
}

fn choose(engine: &mut GameEngine, request: &Request, selected: ChoiceOption) {
    let Request::Choice(choice) = request else {
        panic!("expected a choice request, got {:?}", request);
    };
    let submitted = engine.submit_choice(ChoiceResponse::to(choice, selected)).unwrap();
    assert_eq!(submitted, Submission::Accepted);
}

fn city(name: &str) -> ChoiceOption {
    ChoiceOption::City(CityId::new(name))
}

/// Answer setup placements in the given order, then every agenda choice,
/// and return the first move request
fn play_opening(engine: &mut GameEngine, placements: &[(PartyId, &str)]) -> Request {
    for (party, name) in placements {
        let request = next_request(engine);
        assert_eq!(request.player(), *party);
        choose(engine, &request, city(name));
    }
    loop {
        let request = next_request(engine);
        match &request {
            Request::Move { .. } => return request,
            Request::Choice(choice) => {
                assert_eq!(choice.context.action, ChoiceAction::AgendaSelection);
                let first = choice.options[0].clone();
                choose(engine, &request, first);
            }
        }
    }
}

fn position(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events
        .iter()
        .position(pred)
        .unwrap_or_else(|| panic!("event not found in {:?}", events))
}

// ============================================================================
// Setup
// ============================================================================

/// A party with no valid city left is skipped without blocking the others
///
/// SPD owes 3 bases and ZENTRUM 2. After SPD takes C2, ZENTRUM takes C1 and
/// SPD takes C3, ZENTRUM has nowhere left to go; SPD still gets its last
/// placement in C1 and setup completes.
#[test]
fn test_setup_skips_party_without_cities() {
    let knowledge = Knowledge::new().with_city("C1", 2).with_city("C2", 1).with_city("C3", 1);
    let config = EngineConfig::default().with_turn_order(vec![PartyId::Spd, PartyId::Zentrum]);
    let scenario = scenario(&[(PartyId::Spd, 3), (PartyId::Zentrum, 2)]);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, config).unwrap();

    let script = [
        (PartyId::Spd, "C2"),
        (PartyId::Zentrum, "C1"),
        (PartyId::Spd, "C3"),
    ];
    for (party, name) in script {
        let request = next_request(&mut engine);
        assert_eq!(request.player(), party);
        choose(&mut engine, &request, city(name));
    }

    let Request::Choice(last) = next_request(&mut engine) else {
        panic!("expected SPD's last placement");
    };
    assert_eq!(last.player, PartyId::Spd);
    assert_eq!(last.options, vec![city("C1")]);
    choose(&mut engine, &Request::Choice(last), city("C1"));

    let Request::Choice(agenda) = next_request(&mut engine) else {
        panic!("expected agenda selection");
    };
    assert_eq!(agenda.context.action, ChoiceAction::AgendaSelection);
    assert!(engine.events().contains(&GameEvent::SetupComplete));

    let board = engine.board();
    let c1 = board.city(&CityId::new("C1")).unwrap();
    assert_eq!(c1.bases_of(PartyId::Spd), 1);
    assert_eq!(c1.bases_of(PartyId::Zentrum), 1);
    let zentrum_total: u32 = board.cities().map(|c| c.bases_of(PartyId::Zentrum)).sum();
    assert_eq!(zentrum_total, 1);
}

// ============================================================================
// Reaction windows
// ============================================================================

/// Coup in Berlin; ZENTRUM could react but passes, KPD and DNVP have nothing
#[test]
fn test_coup_window_closes_after_one_cycle() {
    let knowledge = Knowledge::new().with_city("Berlin", 3).with_city("Munich", 3);
    let config = EngineConfig::default().with_board_reaction(
        PartyId::Zentrum,
        "general_strike",
        ReactionEffect::CancelTarget,
    );
    let scenario = scenario(&[(PartyId::Kpd, 1), (PartyId::Dnvp, 1)]);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, config).unwrap();

    let first = play_opening(&mut engine, &[(PartyId::Kpd, "Berlin"), (PartyId::Dnvp, "Berlin")]);
    assert_eq!(first, Request::Move { player: PartyId::Spd });
    engine.drain_events();

    let coup = Move::in_city(PartyId::Spd, ActionKind::Coup, "Berlin");
    assert!(engine.submit_move(coup.clone()).unwrap().is_accepted());
    assert_eq!(engine.phase(), Phase::ReactionWindowGathering);
    assert_eq!(engine.pending_move(), Some(&coup));

    let Request::Choice(offer) = next_request(&mut engine) else {
        panic!("expected ZENTRUM to be polled");
    };
    assert_eq!(offer.player, PartyId::Zentrum);
    assert_eq!(offer.context.action, ChoiceAction::Reaction);
    assert_eq!(offer.options.len(), 2);
    assert_eq!(offer.options.last(), Some(&ChoiceOption::Pass));
    choose(&mut engine, &Request::Choice(offer), ChoiceOption::Pass);

    let next = next_request(&mut engine);
    assert_eq!(next, Request::Move { player: PartyId::Zentrum });
    assert!(engine.pending_move().is_none());
    assert!(engine.reaction_stack().is_none());

    let berlin = engine.board().city(&CityId::new("Berlin")).unwrap();
    assert_eq!(berlin.bases_of(PartyId::Spd), 1);
    assert_eq!(berlin.bases_of(PartyId::Kpd), 0);
    assert_eq!(berlin.bases_of(PartyId::Dnvp), 0);

    let events = engine.events();
    let polls = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ReactionPolled { .. }))
        .count();
    assert_eq!(polls, 1);
    assert!(events.contains(&GameEvent::ReactionWindowClosed));
    assert!(events.contains(&GameEvent::StackItemResolved {
        item: StackItem::Move(coup),
        cancelled: false,
    }));
}

/// A card played against a board reaction cancels it, so the move survives
#[test]
fn test_reaction_chain_resolves_last_in_first_out() {
    let knowledge = Knowledge::new().with_city("Berlin", 3);
    let mut config = EngineConfig::default().with_board_reaction(
        PartyId::Zentrum,
        "general_strike",
        ReactionEffect::CancelTarget,
    );
    config.reaction_cards = vec!["red_sailors".to_string()];
    let mut scenario = scenario(&[]);
    scenario.starting_hands = BTreeMap::from([(PartyId::Kpd, vec!["red_sailors".to_string()])]);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, config).unwrap();

    play_opening(&mut engine, &[]);
    let demo = Move::in_city(PartyId::Spd, ActionKind::Demonstration, "Berlin");
    engine.submit_move(demo.clone()).unwrap();
    engine.drain_events();

    // ZENTRUM strikes against the demonstration
    let strike = next_request(&mut engine);
    assert_eq!(strike.player(), PartyId::Zentrum);
    let Request::Choice(offer) = &strike else { unreachable!() };
    let strike_option = offer.options[0].clone();
    choose(&mut engine, &strike, strike_option);

    // Polling continues after ZENTRUM: KPD answers the strike with a card
    let sailors = next_request(&mut engine);
    assert_eq!(sailors.player(), PartyId::Kpd);
    let Request::Choice(offer) = &sailors else { unreachable!() };
    let card_option = offer.options[0].clone();
    choose(&mut engine, &sailors, card_option);
    assert!(engine.board().party(PartyId::Kpd).unwrap().hand_party.is_empty());
    assert_eq!(engine.reaction_stack().map(|s| s.len()), Some(3));

    // DNVP has nothing and polling reaches SPD; the chain resolves
    assert_eq!(next_request(&mut engine), Request::Move { player: PartyId::Zentrum });

    let resolved: Vec<(String, bool)> = engine
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::StackItemResolved { item, cancelled } => {
                let name = match item {
                    StackItem::Move(_) => "move".to_string(),
                    StackItem::BoardReaction(r) | StackItem::PoliticianCard(r) => r.id.clone(),
                };
                Some((name, *cancelled))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        resolved,
        vec![
            ("red_sailors".to_string(), false),
            ("general_strike".to_string(), true),
            ("move".to_string(), false),
        ]
    );
    assert_eq!(
        engine.board().city(&CityId::new("Berlin")).unwrap().bases_of(PartyId::Spd),
        1
    );
}

/// A reaction mid-window does not send polling around a second time
///
/// SPD demonstrates. ZENTRUM holds a reaction card and passes, KPD answers
/// with a board reaction, DNVP has nothing. Polling then reaches SPD and the
/// window closes, even though SPD and ZENTRUM could answer KPD with cards.
#[test]
fn test_mid_window_reaction_closes_at_actor() {
    let knowledge = Knowledge::new().with_city("Berlin", 3);
    let mut config = EngineConfig::default().with_board_reaction(
        PartyId::Kpd,
        "red_front_march",
        ReactionEffect::NoEffect,
    );
    config.reaction_cards = vec!["stab_in_the_back".to_string()];
    let mut scenario = scenario(&[]);
    scenario.starting_hands = BTreeMap::from([
        (PartyId::Spd, vec!["stab_in_the_back".to_string()]),
        (PartyId::Zentrum, vec!["stab_in_the_back".to_string()]),
    ]);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, config).unwrap();

    play_opening(&mut engine, &[]);
    engine
        .submit_move(Move::in_city(PartyId::Spd, ActionKind::Demonstration, "Berlin"))
        .unwrap();
    engine.drain_events();

    let zentrum = next_request(&mut engine);
    assert_eq!(zentrum.player(), PartyId::Zentrum);
    choose(&mut engine, &zentrum, ChoiceOption::Pass);

    let kpd = next_request(&mut engine);
    assert_eq!(kpd.player(), PartyId::Kpd);
    let Request::Choice(offer) = &kpd else { unreachable!() };
    let march = offer.options[0].clone();
    choose(&mut engine, &kpd, march);

    assert_eq!(next_request(&mut engine), Request::Move { player: PartyId::Zentrum });

    let polled: Vec<PartyId> = engine
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::ReactionPolled { party, .. } => Some(*party),
            _ => None,
        })
        .collect();
    assert_eq!(polled, vec![PartyId::Zentrum, PartyId::Kpd]);

    let board = engine.board();
    assert!(board.party(PartyId::Spd).unwrap().holds_card("stab_in_the_back"));
    assert!(board.party(PartyId::Zentrum).unwrap().holds_card("stab_in_the_back"));
    assert_eq!(board.city(&CityId::new("Berlin")).unwrap().bases_of(PartyId::Spd), 1);
}

// ============================================================================
// Base removal
// ============================================================================

/// Take-control into a full city asks the actor which rival loses a base
#[test]
fn test_take_control_of_full_city() {
    let knowledge = Knowledge::new().with_city("Kiel", 2).with_city("Bremen", 2);
    let scenario = scenario(&[(PartyId::Spd, 1), (PartyId::Zentrum, 1)]);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, EngineConfig::default()).unwrap();
    play_opening(&mut engine, &[(PartyId::Spd, "Kiel"), (PartyId::Zentrum, "Kiel")]);

    let take = Move::in_city(PartyId::Spd, ActionKind::TakeControl, "Kiel");
    assert!(engine.submit_move(take).unwrap().is_accepted());

    let request = next_request(&mut engine);
    let Request::Choice(choice) = &request else {
        panic!("expected a base removal choice");
    };
    assert_eq!(choice.player, PartyId::Spd);
    assert_eq!(choice.context.action, ChoiceAction::ResolvePlaceBase);
    assert_eq!(choice.context.city, Some(CityId::new("Kiel")));
    assert_eq!(choice.options, vec![ChoiceOption::Party(PartyId::Zentrum)]);

    engine.drain_events();
    choose(&mut engine, &request, ChoiceOption::Party(PartyId::Zentrum));

    let kiel = engine.board().city(&CityId::new("Kiel")).unwrap();
    assert_eq!(kiel.bases_of(PartyId::Zentrum), 0);
    assert_eq!(kiel.bases_of(PartyId::Spd), 2);

    let events = engine.events();
    let removed = position(events, |e| matches!(e, GameEvent::BaseRemoved { party: PartyId::Zentrum, .. }));
    let placed = position(events, |e| matches!(e, GameEvent::BasePlaced { party: PartyId::Spd, .. }));
    let status = position(events, |e| matches!(e, GameEvent::Status(_)));
    assert!(removed < placed);
    assert!(placed < status);

    assert_eq!(next_request(&mut engine), Request::Move { player: PartyId::Zentrum });
}

// ============================================================================
// Rejections
// ============================================================================

/// Moves from the wrong party never touch the board
#[test]
fn test_non_active_move_is_rejected_and_rerequested() {
    let knowledge = Knowledge::new().with_city("Berlin", 3);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario(&[]), EngineConfig::default()).unwrap();
    play_opening(&mut engine, &[]);
    let before = engine.status();
    engine.drain_events();

    let intruder = Move::in_city(PartyId::Dnvp, ActionKind::Demonstration, "Berlin");
    let result = engine.submit_move(intruder).unwrap();
    assert_eq!(
        result,
        Submission::Rejected(Rejection::NotYourTurn {
            player: PartyId::Dnvp,
            expected: PartyId::Spd,
        })
    );
    assert_eq!(engine.status(), before);

    let events = engine.drain_events();
    assert!(matches!(
        events.as_slice(),
        [
            GameEvent::Error { target: Some(PartyId::Dnvp), .. },
            GameEvent::MoveRequested { player: PartyId::Spd },
        ]
    ));
    assert_eq!(engine.pending_request(), Some(&Request::Move { player: PartyId::Spd }));
}

/// A choice sent while a move is pending is turned away
#[test]
fn test_choice_during_move_request_is_rejected() {
    let knowledge = Knowledge::new().with_city("Berlin", 3);
    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario(&[]), EngineConfig::default()).unwrap();
    play_opening(&mut engine, &[]);

    let result = engine
        .submit_choice(ChoiceResponse {
            player: PartyId::Spd,
            action: ChoiceAction::Reaction,
            selected: ChoiceOption::Pass,
        })
        .unwrap();
    assert!(matches!(result, Submission::Rejected(Rejection::WrongPhase { .. })));
    assert!(!engine.is_over());
}

// ============================================================================
// Demo data
// ============================================================================

/// The shipped data set plays a full match with random agents
#[test]
fn test_demo_data_full_match() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let knowledge = load_knowledge_dir(&root.join("data")).unwrap();
    assert_eq!(knowledge.parties.len(), 4);
    let scenario = Scenario::load(&root.join("data/scenarios/main_scenario.json")).unwrap();
    let config = EngineConfig::load(&root.join("data/engine.toml")).unwrap();

    let mut engine = GameEngine::new(Arc::new(knowledge), &scenario, config).unwrap();
    let summary = MatchDriver::with_random_agents(&mut engine, 7).run().unwrap();

    assert!(matches!(summary.end, MatchEnd::Finished { .. }));
    assert_eq!(summary.rejections, 0);
    assert!(engine.abort_cause().is_none());
    assert!(engine.board().check_integrity().is_ok());
    assert_eq!(engine.board().party(PartyId::Spd).unwrap().parliament_seats, 163);
}
