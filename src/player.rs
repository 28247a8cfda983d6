//! Player state: hand, tools, allegiance and finish-card memory.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::cards::{Card, CardId, PathCard, PathKind};
use crate::error::GameError;
use crate::types::{next_id, Tool};

pub type PlayerId = String;

/// Working state of the three tools. A broken tool is repaired back to
/// working; breaking a broken tool (or repairing a working one) errors.
#[derive(Debug, Clone, Serialize)]
pub struct ToolState {
    pub pick: bool,
    pub lamp: bool,
    pub wagon: bool,
}

impl ToolState {
    fn all_working() -> Self {
        Self {
            pick: true,
            lamp: true,
            wagon: true,
        }
    }

    pub fn is_working(&self, tool: Tool) -> bool {
        match tool {
            Tool::Pick => self.pick,
            Tool::Lamp => self.lamp,
            Tool::Wagon => self.wagon,
        }
    }

    fn set(&mut self, tool: Tool, working: bool) {
        match tool {
            Tool::Pick => self.pick = working,
            Tool::Lamp => self.lamp = working,
            Tool::Wagon => self.wagon = working,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u32,
    hand: HashMap<CardId, Card>,
    tools: ToolState,
    pub is_saboteur: bool,
    viewed_finish_cards: HashMap<CardId, PathKind>,
}

impl Player {
    /// A new player outside any game. Age is flavor; when omitted it lands
    /// somewhere between 8 and 90.
    pub fn new(name: &str, age: Option<u32>) -> Self {
        let age = age.unwrap_or_else(|| rand::thread_rng().gen_range(8..=90));
        Self {
            id: next_id("player"),
            name: name.to_string(),
            age,
            hand: HashMap::new(),
            tools: ToolState::all_working(),
            is_saboteur: false,
            viewed_finish_cards: HashMap::new(),
        }
    }

    /// Reset for a fresh round: empty hand, working tools, cleared finish
    /// memory, new allegiance.
    pub fn setup(&mut self, is_saboteur: bool) {
        self.hand.clear();
        self.tools = ToolState::all_working();
        self.viewed_finish_cards.clear();
        self.is_saboteur = is_saboteur;
    }

    pub fn add_to_hand(&mut self, card: Card) {
        self.hand.insert(card.id().to_string(), card);
    }

    pub fn card_in_hand(&self, card_id: &str) -> Option<&Card> {
        self.hand.get(card_id)
    }

    pub fn remove_from_hand(&mut self, card_id: &str) -> Result<Card, GameError> {
        self.hand.remove(card_id).ok_or(GameError::CardNotInHand)
    }

    /// Pull a card out of the hand to throw it away.
    pub fn discard_card(&mut self, card_id: &str) -> Result<Card, GameError> {
        self.remove_from_hand(card_id)
    }

    /// Flip a path card held in the hand. Action cards have no facing.
    pub fn rotate_card(&mut self, card_id: &str) -> Result<bool, GameError> {
        match self.hand.get_mut(card_id) {
            Some(Card::Path(card)) => Ok(card.rotate()),
            Some(Card::Action(_)) => Err(GameError::InvalidCardType),
            None => Err(GameError::CardNotInHand),
        }
    }

    pub fn hand(&self) -> impl Iterator<Item = &Card> {
        self.hand.values()
    }

    pub fn hand_card_count(&self) -> usize {
        self.hand.len()
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn break_tool(&mut self, tool: Tool) -> Result<(), GameError> {
        if !self.tools.is_working(tool) {
            return Err(GameError::ToolAlreadyBroken(tool));
        }
        self.tools.set(tool, false);
        Ok(())
    }

    pub fn repair_tool(&mut self, tool: Tool) -> Result<(), GameError> {
        if self.tools.is_working(tool) {
            return Err(GameError::ToolNotBroken(tool));
        }
        self.tools.set(tool, true);
        Ok(())
    }

    /// Remember a finish card shown via a map action. Board-facing state is
    /// untouched.
    pub fn view_finish_card(&mut self, card: &PathCard) -> Result<(), GameError> {
        if !card.is_finish() {
            return Err(GameError::InvalidFinishCard);
        }
        self.viewed_finish_cards.insert(card.id.clone(), card.kind);
        Ok(())
    }

    pub fn viewed_finish_cards(&self) -> &HashMap<CardId, PathKind> {
        &self.viewed_finish_cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{ActionCard, ActionKind, PathCard};
    use crate::types::Side::{Bottom as B, Top as T};

    #[test]
    fn test_new_player_defaults() {
        let player = Player::new("Alice", Some(20));
        assert_eq!(player.age, 20);
        assert_eq!(player.hand_card_count(), 0);
        assert!(!player.is_saboteur);
        assert!(player.tools().is_working(Tool::Pick));
        assert!(player.tools().is_working(Tool::Lamp));
        assert!(player.tools().is_working(Tool::Wagon));
    }

    #[test]
    fn test_random_age_in_range() {
        let player = Player::new("Bob", None);
        assert!((8..=90).contains(&player.age));
    }

    #[test]
    fn test_hand_management() {
        let mut player = Player::new("Alice", Some(20));
        let card = Card::Path(PathCard::passage(&[T, B], false));
        let id = card.id().to_string();
        player.add_to_hand(card);
        assert_eq!(player.hand_card_count(), 1);
        assert!(player.card_in_hand(&id).is_some());

        let removed = player.remove_from_hand(&id).unwrap();
        assert_eq!(removed.id(), id);
        assert_eq!(
            player.remove_from_hand(&id),
            Err(GameError::CardNotInHand)
        );
    }

    #[test]
    fn test_tool_break_and_repair() {
        let mut player = Player::new("Alice", Some(20));
        player.break_tool(Tool::Lamp).unwrap();
        assert!(!player.tools().is_working(Tool::Lamp));
        assert_eq!(
            player.break_tool(Tool::Lamp),
            Err(GameError::ToolAlreadyBroken(Tool::Lamp))
        );
        player.repair_tool(Tool::Lamp).unwrap();
        assert!(player.tools().is_working(Tool::Lamp));
        assert_eq!(
            player.repair_tool(Tool::Lamp),
            Err(GameError::ToolNotBroken(Tool::Lamp))
        );
    }

    #[test]
    fn test_setup_resets_state() {
        let mut player = Player::new("Alice", Some(20));
        player.add_to_hand(Card::Action(ActionCard::new(ActionKind::Map)));
        player.break_tool(Tool::Pick).unwrap();
        let finish = PathCard::gold_finish(false);
        player.view_finish_card(&finish).unwrap();

        player.setup(true);
        assert_eq!(player.hand_card_count(), 0);
        assert!(player.tools().is_working(Tool::Pick));
        assert!(player.viewed_finish_cards().is_empty());
        assert!(player.is_saboteur);
    }

    #[test]
    fn test_view_finish_card_rejects_non_finish() {
        let mut player = Player::new("Alice", Some(20));
        let passage = PathCard::passage(&[T, B], false);
        assert_eq!(
            player.view_finish_card(&passage),
            Err(GameError::InvalidFinishCard)
        );
        let gold = PathCard::gold_finish(false);
        player.view_finish_card(&gold).unwrap();
        assert_eq!(
            player.viewed_finish_cards().get(&gold.id),
            Some(&PathKind::GoldFinish)
        );
    }
}
