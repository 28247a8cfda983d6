//! Engine errors. Every rule violation maps to its own variant and aborts
//! the operation before any state has changed.

use thiserror::Error;

use crate::types::{Position, Tool};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game has not started")]
    NotStarted,
    #[error("game has already finished")]
    Finished,
    #[error("maximum number of players")]
    MaxPlayers,
    #[error("not enough players")]
    NotEnoughPlayers,
    #[error("unknown player {0}")]
    UnknownPlayer(String),
    #[error("cannot play card which isn't in player's hand")]
    CardNotInHand,
    #[error("player must discard")]
    MustDiscard,
    #[error("card has already been played")]
    CardAlreadyPlayed,
    #[error("card has already been discarded")]
    CardAlreadyDiscarded,
    #[error("invalid type of card provided")]
    InvalidCardType,
    #[error("position {0} is already occupied")]
    PositionOccupied(Position),
    #[error("position {0} is already empty")]
    PositionEmpty(Position),
    #[error("cannot remove card at {0}")]
    CannotRemoveCard(Position),
    #[error("position {0} is not reachable from the start card")]
    PositionUnreachable(Position),
    #[error("card connectors do not match at {0}")]
    ConnectorMismatch(Position),
    #[error("tool {0} is already broken")]
    ToolAlreadyBroken(Tool),
    #[error("tool {0} does not need repaired")]
    ToolNotBroken(Tool),
    #[error("cannot apply to {0}")]
    ToolNotApplicable(Tool),
    #[error("missing play parameters")]
    MissingParameters,
    #[error("invalid finish card provided")]
    InvalidFinishCard,
}
