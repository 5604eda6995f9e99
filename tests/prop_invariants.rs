//! Property-based tests for board and reaction invariants
//!
//! Random operation sequences must never break:
//! - the fixed instance count and single-location membership of pooled entities
//! - the exclusion of antagonistic threat pairs from a shared city
//! - the poll order, closing at the actor, and LIFO resolution of reaction windows
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;

use weimar_engine::board::{Board, EntityPool, InteractionTable, PoolKind};
use weimar_engine::core::config::default_threat_interactions;
use weimar_engine::core::types::{InstanceId, Location, PartyId, TemplateId};
use weimar_engine::engine::{
    ActionKind, Move, ReactionEffect, ReactionOption, ReactionSource, ReactionWindow, StackItem,
};
use weimar_engine::knowledge::Knowledge;

// ============================================================================
// Helpers
// ============================================================================

const LOCATIONS: [&str; 4] = ["pool", "dr", "Berlin", "Munich"];

fn location(index: usize) -> Location {
    match LOCATIONS[index % LOCATIONS.len()] {
        "pool" => Location::AvailablePool,
        "dr" => Location::DrBox,
        city => Location::city(city),
    }
}

fn all_locations() -> Vec<Location> {
    (0..LOCATIONS.len()).map(location).collect()
}

fn threat_pool() -> EntityPool {
    let mut pool = EntityPool::new(PoolKind::Threat);
    pool.initialize(&[
        (TemplateId::new("scarcity"), 4),
        (TemplateId::new("council"), 3),
        (TemplateId::new("unrest"), 5),
    ])
    .unwrap();
    pool
}

fn threat_board() -> Board {
    let knowledge = Knowledge::new()
        .with_city("Berlin", 3)
        .with_city("Munich", 2)
        .with_threat("scarcity", 6, 1, Some(3))
        .with_threat("abundance", 6, 1, None)
        .with_threat("council", 4, 1, None)
        .with_threat("regime", 4, 1, None)
        .with_threat("unrest", 8, 2, None);
    Board::new(
        Arc::new(knowledge),
        InteractionTable::new(default_threat_interactions()),
        &PartyId::ALL,
    )
    .unwrap()
}

const THREATS: [&str; 5] = ["scarcity", "abundance", "council", "regime", "unrest"];

fn reaction(reactor: PartyId, id: usize) -> ReactionOption {
    ReactionOption {
        reactor,
        source: ReactionSource::PoliticianCard,
        id: format!("card_{}", id),
        effect: ReactionEffect::NoEffect,
    }
}

// ============================================================================
// Entity pool
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Moves never create or destroy instances, and each sits in exactly one place
    #[test]
    fn prop_pool_membership_is_exclusive(
        moves in prop::collection::vec((0u32..12, 0usize..4), 0..60)
    ) {
        let mut pool = threat_pool();
        for (id, loc) in moves {
            pool.move_to(InstanceId(id), location(loc)).unwrap();
        }

        prop_assert!(pool.check_integrity().is_ok());
        prop_assert_eq!(pool.len(), 12);

        for instance in pool.instances() {
            let holders = all_locations()
                .into_iter()
                .filter(|l| pool.instances_at(l, None).contains(&instance.id))
                .count();
            prop_assert_eq!(holders, 1);
            prop_assert_eq!(pool.location_of(instance.id), Some(&instance.location));
        }

        for (template, max_count) in [("scarcity", 4), ("council", 3), ("unrest", 5)] {
            let template = TemplateId::new(template);
            let total: usize = all_locations().iter().map(|l| pool.count_at(l, &template)).sum();
            prop_assert_eq!(total, max_count);
        }
    }

    /// Repeating a move changes nothing
    #[test]
    fn prop_move_is_idempotent(id in 0u32..12, loc in 0usize..4) {
        let mut once = threat_pool();
        once.move_to(InstanceId(id), location(loc)).unwrap();
        let mut twice = once.clone();
        twice.move_to(InstanceId(id), location(loc)).unwrap();

        for l in all_locations() {
            prop_assert_eq!(once.instances_at(&l, None), twice.instances_at(&l, None));
        }
    }
}

// ============================================================================
// Placement rules
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Paired threats never share a city and per-city caps always hold
    #[test]
    fn prop_threat_placement_keeps_caps_and_pairs(
        requests in prop::collection::vec((0usize..5, 1usize..4), 0..40)
    ) {
        let mut board = threat_board();
        for (threat, loc) in requests {
            board.place_threat(&location(loc), &TemplateId::new(THREATS[threat])).unwrap();
        }

        prop_assert!(board.check_integrity().is_ok());
        let threats = board.threats();
        for city in ["Berlin", "Munich"] {
            let at = Location::city(city);
            let count = |t: &str| threats.count_at(&at, &TemplateId::new(t));

            prop_assert!(count("scarcity") == 0 || count("abundance") == 0);
            prop_assert!(count("council") == 0 || count("regime") == 0);
            for t in ["scarcity", "abundance", "council", "regime"] {
                prop_assert!(count(t) <= 1);
            }
            prop_assert!(count("unrest") <= 2);
        }
        prop_assert!(threats.count_at(&Location::DrBox, &TemplateId::new("scarcity")) <= 3);
    }
}

// ============================================================================
// Reaction windows
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// With no reactions, every other party is polled once in turn order
    #[test]
    fn prop_poll_visits_each_other_party_once(parties in 2usize..7, actor_seed in 0usize..7) {
        let actor = actor_seed % parties;
        let mv = Move::in_city(PartyId::Spd, ActionKind::Coup, "Berlin");
        let mut window = ReactionWindow::open(mv, actor, parties);

        let mut visited = Vec::new();
        while !window.poll_complete() {
            visited.push(window.poll);
            window.pass();
            prop_assert!(visited.len() < parties);
        }

        let expected: Vec<usize> = (1..parties).map(|k| (actor + k) % parties).collect();
        prop_assert_eq!(visited, expected);
    }

    /// Reactions never extend polling past the actor; the stack unwinds in reverse
    #[test]
    fn prop_reactions_close_at_actor_and_unwind_lifo(
        parties in 2usize..7,
        actor_seed in 0usize..7,
        decisions in prop::collection::vec(any::<bool>(), 0..30)
    ) {
        let actor = actor_seed % parties;
        let mv = Move::in_city(PartyId::Spd, ActionKind::Demonstration, "Berlin");
        let mut window = ReactionWindow::open(mv, actor, parties);

        let mut pushed = Vec::new();
        let mut polled = 0;
        for react in decisions {
            if window.poll_complete() {
                break;
            }
            if react {
                let id = pushed.len();
                window.react(reaction(PartyId::Kpd, id));
                pushed.push(format!("card_{}", id));
            } else {
                window.pass();
            }
            polled += 1;
            prop_assert_eq!(window.poll_complete(), polled == parties - 1);
            prop_assert!(window.poll_complete() || window.poll != actor);
        }

        let mut popped = Vec::new();
        while let Some(entry) = window.stack.pop() {
            match entry.item {
                StackItem::Move(_) => prop_assert!(window.stack.is_empty()),
                other => popped.push(other.reaction().unwrap().id.clone()),
            }
        }
        pushed.reverse();
        prop_assert_eq!(popped, pushed);
    }
}
