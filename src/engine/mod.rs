//! Match engine - phase machine, reactions and setup

mod actions;
pub mod choice;
pub mod events;
pub mod game;
pub mod moves;
pub mod phase;
pub mod reaction;
pub mod setup;

pub use choice::{ChoiceAction, ChoiceContext, ChoiceOption, ChoiceRequest, ChoiceResponse};
pub use events::{EventBus, EventKind, GameEvent, Request, StatusSnapshot};
pub use game::{AdvanceOutcome, GameEngine, PendingBaseRemoval, Rejection, Submission};
pub use moves::{ActionKind, Move, MoveTarget, PlayOption};
pub use phase::Phase;
pub use reaction::{
    BoardReactionDef, ReactionEffect, ReactionOption, ReactionProvider, ReactionSource, ReactionStack,
    ReactionWindow, StackEntry, StackItem, StandardReactions,
};
pub use setup::{SetupMachine, SetupStep};
