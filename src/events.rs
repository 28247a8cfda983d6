//! Typed game events. Observers subscribe to the whole stream; emission
//! order is program order.

use std::collections::HashMap;

use serde::Serialize;

use crate::cards::CardId;
use crate::deck::GoldCard;
use crate::player::PlayerId;

/// Which camp took the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    GoldDiggers,
    Saboteurs,
}

/// One line of the end-of-game scoreboard, sorted by gold descending.
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub name: String,
    pub total_gold: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    AddPlayer {
        player_id: PlayerId,
        name: String,
    },
    RemovePlayer {
        player_id: PlayerId,
    },
    StartGame,
    StartRound {
        round: usize,
    },
    StartTurn {
        player_id: PlayerId,
    },
    EndTurn {
        player_id: PlayerId,
    },
    PlayCard {
        player_id: PlayerId,
        card_id: CardId,
    },
    DiscardCard {
        player_id: PlayerId,
        card_id: Option<CardId>,
    },
    EndRound {
        round: usize,
        winner: Winner,
        gold: HashMap<PlayerId, Vec<GoldCard>>,
    },
    EndGame {
        standings: Vec<Standing>,
    },
}

impl GameEvent {
    /// The event's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::AddPlayer { .. } => "add-player",
            GameEvent::RemovePlayer { .. } => "remove-player",
            GameEvent::StartGame => "start-game",
            GameEvent::StartRound { .. } => "start-round",
            GameEvent::StartTurn { .. } => "start-turn",
            GameEvent::EndTurn { .. } => "end-turn",
            GameEvent::PlayCard { .. } => "play-card",
            GameEvent::DiscardCard { .. } => "discard-card",
            GameEvent::EndRound { .. } => "end-round",
            GameEvent::EndGame { .. } => "end-game",
        }
    }
}
