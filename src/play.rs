//! Card-effect dispatch: map a played card's kind to its effect and report
//! which cards end up in the discard pile.
//!
//! Every branch validates completely before it mutates, so a failed play
//! leaves the hand, the board and every player untouched.

use std::collections::HashMap;

use crate::board::Board;
use crate::cards::{ActionKind, Card, PlayParams};
use crate::error::GameError;
use crate::player::{Player, PlayerId};
use crate::types::{Position, Tool};

fn board_position(params: &PlayParams) -> Result<Position, GameError> {
    match params {
        PlayParams::Board { position } => Ok(*position),
        PlayParams::Tool { .. } => Err(GameError::MissingParameters),
    }
}

fn tool_params(params: &PlayParams) -> Result<(&str, Tool), GameError> {
    match params {
        PlayParams::Tool { player_id, tool } => Ok((player_id, *tool)),
        PlayParams::Board { .. } => Err(GameError::MissingParameters),
    }
}

fn take_from_hand(
    players: &mut HashMap<PlayerId, Player>,
    player_id: &str,
    card_id: &str,
) -> Result<Card, GameError> {
    players
        .get_mut(player_id)
        .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?
        .remove_from_hand(card_id)
}

/// Resolve a play. Returns the cards to discard: nothing for a tunnel card
/// (it lives on the board now), the action card itself for tool and map
/// plays, and the knocked-out tunnel card alongside the rockfall card.
pub(crate) fn perform_play(
    acting_id: &str,
    card_id: &str,
    params: Option<&PlayParams>,
    players: &mut HashMap<PlayerId, Player>,
    board: &mut Board,
) -> Result<Vec<Card>, GameError> {
    let params = params.ok_or(GameError::MissingParameters)?;
    let card = players
        .get(acting_id)
        .ok_or_else(|| GameError::UnknownPlayer(acting_id.to_string()))?
        .card_in_hand(card_id)
        .ok_or(GameError::CardNotInHand)?
        .clone();

    match card {
        Card::Path(path) => {
            let position = board_position(params)?;
            board.validate_add(&path, position)?;

            let removed = take_from_hand(players, acting_id, card_id)?;
            let mut path = match removed {
                Card::Path(path) => path,
                card @ Card::Action(_) => {
                    if let Some(player) = players.get_mut(acting_id) {
                        player.add_to_hand(card);
                    }
                    return Err(GameError::InvalidCardType);
                }
            };
            path.params = Some(params.clone());
            board.add_card(path, position)?;
            Ok(vec![])
        }
        Card::Action(action) => match &action.kind {
            ActionKind::Break { applies_to } | ActionKind::Repair { applies_to } => {
                let (target_id, tool) = tool_params(params)?;
                if !applies_to.contains(&tool) {
                    return Err(GameError::ToolNotApplicable(tool));
                }
                let repair = matches!(action.kind, ActionKind::Repair { .. });
                let target = players
                    .get(target_id)
                    .ok_or_else(|| GameError::UnknownPlayer(target_id.to_string()))?;
                if repair && target.tools().is_working(tool) {
                    return Err(GameError::ToolNotBroken(tool));
                }
                if !repair && !target.tools().is_working(tool) {
                    return Err(GameError::ToolAlreadyBroken(tool));
                }
                let target_id = target_id.to_string();

                let mut removed = take_from_hand(players, acting_id, card_id)?;
                removed.record_params(params.clone());
                let target = players
                    .get_mut(&target_id)
                    .ok_or(GameError::UnknownPlayer(target_id.clone()))?;
                if repair {
                    target.repair_tool(tool)?;
                } else {
                    target.break_tool(tool)?;
                }
                Ok(vec![removed])
            }
            ActionKind::Rockfall => {
                let position = board_position(params)?;
                match board.card_at(position) {
                    None => return Err(GameError::PositionEmpty(position)),
                    Some(card) if !card.is_tunnel() => {
                        return Err(GameError::CannotRemoveCard(position))
                    }
                    Some(_) => {}
                }
                let mut removed = take_from_hand(players, acting_id, card_id)?;
                removed.record_params(params.clone());
                let knocked_out = board.remove_card(position)?;
                Ok(vec![Card::Path(knocked_out), removed])
            }
            ActionKind::Map => {
                let position = board_position(params)?;
                let finish = board
                    .card_at(position)
                    .filter(|card| card.is_finish())
                    .cloned()
                    .ok_or(GameError::InvalidFinishCard)?;
                let mut removed = take_from_hand(players, acting_id, card_id)?;
                removed.record_params(params.clone());
                players
                    .get_mut(acting_id)
                    .ok_or_else(|| GameError::UnknownPlayer(acting_id.to_string()))?
                    .view_finish_card(&finish)?;
                Ok(vec![removed])
            }
        },
    }
}
