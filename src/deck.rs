//! Draw pile, discard pile and the gold reward deck.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::cards::{build_shuffled_deck, Card};
use crate::error::GameError;
use crate::types::next_id;

/// The face-down draw pile. Cards come off the front.
#[derive(Debug, Serialize)]
pub struct Deck {
    id: String,
    draw_pile: Vec<Card>,
}

impl Deck {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            id: next_id("deck"),
            draw_pile: build_shuffled_deck(rng),
        }
    }

    pub fn draw_card(&mut self) -> Option<Card> {
        if self.draw_pile.is_empty() {
            return None;
        }
        Some(self.draw_pile.remove(0))
    }

    pub fn card_count(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty()
    }
}

/// The face-up discard pile. Index 0 is the top.
#[derive(Debug, Serialize)]
pub struct Discard {
    id: String,
    discard_pile: Vec<Card>,
}

impl Discard {
    pub fn new() -> Self {
        Self {
            id: next_id("discard"),
            discard_pile: Vec::new(),
        }
    }

    /// File a card that was used up by being played (action cards, cards
    /// knocked off the board).
    pub fn add_played(&mut self, mut card: Card) -> Result<(), GameError> {
        card.set_played()?;
        self.discard_pile.insert(0, card);
        Ok(())
    }

    /// File a card a player threw away unplayed.
    pub fn add_discarded(&mut self, mut card: Card) -> Result<(), GameError> {
        card.set_discarded()?;
        self.discard_pile.insert(0, card);
        Ok(())
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.first()
    }

    pub fn card_count(&self) -> usize {
        self.discard_pile.len()
    }
}

impl Default for Discard {
    fn default() -> Self {
        Self::new()
    }
}

/// A gold nugget card worth 1, 2 or 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoldCard {
    pub id: String,
    pub value: u32,
}

impl GoldCard {
    fn new(value: u32) -> Self {
        Self {
            id: next_id("gold"),
            value,
        }
    }
}

/// The reward pile: 4x3 + 8x2 + 16x1 = 28 cards, 48 gold. One deck serves
/// the whole game.
#[derive(Debug, Serialize)]
pub struct RewardDeck {
    id: String,
    draw_pile: Vec<GoldCard>,
}

impl RewardDeck {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut draw_pile: Vec<GoldCard> = Vec::with_capacity(28);
        draw_pile.extend((0..4).map(|_| GoldCard::new(3)));
        draw_pile.extend((0..8).map(|_| GoldCard::new(2)));
        draw_pile.extend((0..16).map(|_| GoldCard::new(1)));
        draw_pile.shuffle(rng);
        Self {
            id: next_id("reward-deck"),
            draw_pile,
        }
    }

    #[cfg(test)]
    fn with_values(values: &[u32]) -> Self {
        Self {
            id: next_id("reward-deck"),
            draw_pile: values.iter().map(|&v| GoldCard::new(v)).collect(),
        }
    }

    pub fn draw_card(&mut self) -> Option<GoldCard> {
        if self.draw_pile.is_empty() {
            return None;
        }
        Some(self.draw_pile.remove(0))
    }

    pub fn card_count(&self) -> usize {
        self.draw_pile.len()
    }

    /// Remove cards summing to exactly `value`.
    ///
    /// Scans from each starting offset, greedily accumulating cards that
    /// fit under the target and swapping out the last pick whenever a later
    /// card lands the running total strictly closer. The first exact match
    /// wins. When no offset produces an exact match, the final offset's
    /// best accumulation is removed and 1-value cards are minted to cover
    /// the shortfall, growing the pool past the nominal 28 cards.
    pub fn extract_cards_to_value(&mut self, value: u32) -> Vec<GoldCard> {
        let mut last_allocation: Vec<usize> = Vec::new();
        for start in 0..self.draw_pile.len() {
            let mut chosen: Vec<usize> = Vec::new();
            let mut total = 0u32;
            for index in start..self.draw_pile.len() {
                let card_value = self.draw_pile[index].value;
                if total + card_value <= value {
                    chosen.push(index);
                    total += card_value;
                } else if chosen.len() > 1 {
                    let last_value = self.draw_pile[chosen[chosen.len() - 1]].value;
                    let without_last = total - last_value;
                    if without_last + card_value <= value && without_last + card_value > total {
                        chosen.pop();
                        chosen.push(index);
                        total = without_last + card_value;
                    }
                }
            }
            if total == value {
                return self.take_indices(&chosen);
            }
            last_allocation = chosen;
        }

        let mut cards = self.take_indices(&last_allocation);
        let total: u32 = cards.iter().map(|c| c.value).sum();
        for _ in 0..value.saturating_sub(total) {
            cards.push(GoldCard::new(1));
        }
        cards
    }

    fn take_indices(&mut self, indices: &[usize]) -> Vec<GoldCard> {
        let cards: Vec<GoldCard> = indices.iter().map(|&i| self.draw_pile[i].clone()).collect();
        let mut descending = indices.to_vec();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        for index in descending {
            self.draw_pile.remove(index);
        }
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_deck_draws_down() {
        let mut deck = Deck::new(&mut rng());
        assert_eq!(deck.card_count(), 67);
        let card = deck.draw_card().unwrap();
        assert_eq!(card.status(), CardStatus::Unused);
        assert_eq!(deck.card_count(), 66);
    }

    #[test]
    fn test_deck_exhausts_to_none() {
        let mut deck = Deck::new(&mut rng());
        while deck.draw_card().is_some() {}
        assert!(deck.is_empty());
        assert!(deck.draw_card().is_none());
    }

    #[test]
    fn test_discard_marks_status() {
        let mut deck = Deck::new(&mut rng());
        let mut discard = Discard::new();

        let card = deck.draw_card().unwrap();
        let id = card.id().to_string();
        discard.add_played(card).unwrap();
        assert_eq!(discard.top_card().unwrap().id(), id);
        assert_eq!(discard.top_card().unwrap().status(), CardStatus::Played);

        let card = deck.draw_card().unwrap();
        discard.add_discarded(card).unwrap();
        assert_eq!(discard.top_card().unwrap().status(), CardStatus::Discarded);
        assert_eq!(discard.card_count(), 2);
    }

    #[test]
    fn test_discard_rejects_double_discard() {
        let mut deck = Deck::new(&mut rng());
        let mut discard = Discard::new();
        let mut card = deck.draw_card().unwrap();
        card.set_discarded().unwrap();
        assert_eq!(
            discard.add_discarded(card),
            Err(GameError::CardAlreadyDiscarded)
        );
    }

    #[test]
    fn test_reward_deck_composition() {
        let deck = RewardDeck::new(&mut rng());
        assert_eq!(deck.card_count(), 28);
        let total: u32 = deck.draw_pile.iter().map(|c| c.value).sum();
        assert_eq!(total, 48);
    }

    #[test]
    fn test_extract_combination_from_initial_card() {
        // [2,3,1,1,2] to match 4 gives {2,1,1}.
        let mut deck = RewardDeck::with_values(&[2, 3, 1, 1, 2]);
        let cards = deck.extract_cards_to_value(4);
        let values: Vec<u32> = cards.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![2, 1, 1]);
        assert_eq!(deck.card_count(), 2);
    }

    #[test]
    fn test_extract_combination_from_later_offset() {
        // [2,3,1,3] to match 4 gives {3,1}.
        let mut deck = RewardDeck::with_values(&[2, 3, 1, 3]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(4)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![3, 1]);
        assert_eq!(deck.card_count(), 2);
    }

    #[test]
    fn test_extract_single_trailing_card() {
        // [3,3,3,2] to match 2 gives {2}.
        let mut deck = RewardDeck::with_values(&[3, 3, 3, 2]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(2)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![2]);
        assert_eq!(deck.card_count(), 3);
    }

    #[test]
    fn test_extract_swaps_last_for_better_fit() {
        // [2,3,1,2] to match 4: 2+1 is beaten by swapping the 1 for the
        // trailing 2.
        let mut deck = RewardDeck::with_values(&[2, 3, 1, 2]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(4)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![2, 2]);
        assert_eq!(deck.card_count(), 2);
    }

    #[test]
    fn test_extract_mints_shortfall() {
        // [2,3,3] to match 4: no exact subset from any offset, so the final
        // offset's {3} is topped up with a minted 1.
        let mut deck = RewardDeck::with_values(&[2, 3, 3]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(4)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![3, 1]);
        assert_eq!(deck.card_count(), 2);
    }

    #[test]
    fn test_extract_mints_everything_when_nothing_fits() {
        // [3,3,3] to match 2: every offset accumulates nothing.
        let mut deck = RewardDeck::with_values(&[3, 3, 3]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(2)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![1, 1]);
        assert_eq!(deck.card_count(), 3);
    }

    #[test]
    fn test_extract_from_empty_deck_mints_all() {
        let mut deck = RewardDeck::with_values(&[]);
        let values: Vec<u32> = deck
            .extract_cards_to_value(3)
            .iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(values, vec![1, 1, 1]);
    }
}
