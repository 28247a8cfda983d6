//! Rules engine for a hidden-role tunnel-building card game.
//!
//! Players extend a tunnel from the start card toward three hidden finish
//! cards, one of which conceals the gold. The engine owns the board
//! connectivity rules, the turn and round state machine, and end-of-round
//! gold allocation; callers (a UI, a server handler, a bot) drive it one
//! command at a time.

pub mod board;
pub mod cards;
pub mod config;
pub mod deck;
pub mod error;
pub mod events;
pub mod game;
mod play;
pub mod player;
pub mod scoring;
pub mod types;

pub use board::{Board, FINISH_POSITIONS, START_POSITION};
pub use cards::{
    ActionCard, ActionKind, Card, CardId, CardStatus, PathCard, PathKind, PlayParams,
};
pub use config::{load_options, GameOptions};
pub use deck::{Deck, Discard, GoldCard, RewardDeck};
pub use error::GameError;
pub use events::{GameEvent, Standing, Winner};
pub use game::{Game, RoundResult};
pub use player::{Player, PlayerId, ToolState};
pub use types::{Connectors, Position, Side, Tool};
