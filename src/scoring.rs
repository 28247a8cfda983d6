//! End-of-round gold allocation.

use std::collections::HashMap;

use crate::config::{MAX_REWARD_CARDS, SABOTEUR_GOLD_VALUES};
use crate::deck::{GoldCard, RewardDeck};
use crate::player::{Player, PlayerId};

pub type GoldAllocation = HashMap<PlayerId, Vec<GoldCard>>;

/// Wrap an index (possibly negative) into `0..len`.
fn wrap_index(index: i64, len: usize) -> usize {
    index.rem_euclid(len as i64) as usize
}

/// The player the reward round starts from.
///
/// When a saboteur's own placement revealed the gold, the payout redirects
/// counter-clockwise (decreasing turn-order index, wrapping) to the nearest
/// gold digger.
fn successful_gold_digger(
    active_id: &str,
    play_order: &[PlayerId],
    players: &HashMap<PlayerId, Player>,
) -> PlayerId {
    let is_saboteur = players.get(active_id).map(|p| p.is_saboteur).unwrap_or(false);
    if !is_saboteur {
        return active_id.to_string();
    }
    let start = play_order
        .iter()
        .position(|id| id == active_id)
        .unwrap_or(0);
    for offset in 0..play_order.len() {
        let index = wrap_index(start as i64 - offset as i64, play_order.len());
        let candidate = &play_order[index];
        if players.get(candidate).is_some_and(|p| !p.is_saboteur) {
            return candidate.clone();
        }
    }
    active_id.to_string()
}

/// Deal reward cards to the gold diggers, one at a time counter-clockwise
/// through the digger-only sub-order, starting from the successful player.
/// At most `min(players, MAX_REWARD_CARDS)` cards go out; an exhausted
/// reward deck simply stops the payout.
pub fn allocate_gold_to_diggers(
    reward_deck: &mut RewardDeck,
    play_order: &[PlayerId],
    players: &HashMap<PlayerId, Player>,
    active_id: &str,
) -> GoldAllocation {
    let mut allocation = GoldAllocation::new();
    let diggers: Vec<&PlayerId> = play_order
        .iter()
        .filter(|id| players.get(*id).is_some_and(|p| !p.is_saboteur))
        .collect();
    if diggers.is_empty() {
        return allocation;
    }

    let starting_id = successful_gold_digger(active_id, play_order, players);
    let start = diggers
        .iter()
        .position(|id| **id == starting_id)
        .unwrap_or(0);
    let reward_count = play_order.len().min(MAX_REWARD_CARDS);

    for offset in 0..reward_count {
        let index = wrap_index(start as i64 - offset as i64, diggers.len());
        if let Some(reward) = reward_deck.draw_card() {
            allocation
                .entry(diggers[index].clone())
                .or_default()
                .push(reward);
        }
    }
    allocation
}

/// Pay each saboteur the fixed value owed for their count, extracted from
/// the reward deck.
pub fn allocate_gold_to_saboteurs(
    reward_deck: &mut RewardDeck,
    play_order: &[PlayerId],
    players: &HashMap<PlayerId, Player>,
) -> GoldAllocation {
    let mut allocation = GoldAllocation::new();
    let saboteurs: Vec<&PlayerId> = play_order
        .iter()
        .filter(|id| players.get(*id).is_some_and(|p| p.is_saboteur))
        .collect();
    let amount = SABOTEUR_GOLD_VALUES
        .get(&saboteurs.len())
        .copied()
        .unwrap_or(0);
    for id in saboteurs {
        allocation.insert(id.clone(), reward_deck.extract_cards_to_value(amount));
    }
    allocation
}
