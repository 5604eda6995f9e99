//! Weimar Engine - game state engine for a turn-based political strategy game
//!
//! Parties contest cities and parliament over a series of rounds. The crate
//! holds the board (entity pools, cities, parties), the placement rules,
//! the phase machine with its reaction stack, and the setup sub-protocol.
//! Agents and presentation sit outside and talk to the engine through
//! requests, submissions and notifications.

pub mod agent;
pub mod board;
pub mod core;
pub mod engine;
pub mod knowledge;
pub mod scenario;
