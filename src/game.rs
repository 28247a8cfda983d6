//! Top-level game orchestrator: roster, turn order, round lifecycle and
//! reward distribution.
//!
//! Single-threaded and synchronous; every public operation validates, then
//! runs to completion before returning. Callers drive one command at a
//! time.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::board::Board;
use crate::cards::{Card, PlayParams};
use crate::config::{GameOptions, RoleSplit, INITIAL_HAND_SIZES, ROLE_RATIO};
use crate::deck::{Deck, Discard, RewardDeck};
use crate::error::GameError;
use crate::events::{GameEvent, Standing, Winner};
use crate::play::perform_play;
use crate::player::{Player, PlayerId};
use crate::scoring::{allocate_gold_to_diggers, allocate_gold_to_saboteurs, GoldAllocation};
use crate::types::next_id;

/// Outcome of one finished round, including a snapshot of the game state
/// at completion (minus earlier round results, to keep nesting bounded).
#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    pub round: usize,
    pub winner: Winner,
    pub gold: GoldAllocation,
    pub snapshot: serde_json::Value,
}

pub struct Game {
    id: String,
    options: GameOptions,
    players: HashMap<PlayerId, Player>,
    joined: Vec<PlayerId>,
    play_order: Vec<PlayerId>,
    started: bool,
    turn: usize,
    deck: Deck,
    discard: Discard,
    board: Board,
    reward_deck: RewardDeck,
    discard_sequence: Vec<PlayerId>,
    round_results: Vec<RoundResult>,
    rng: StdRng,
    observers: Vec<Box<dyn Fn(&GameEvent)>>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_options(GameOptions::default())
    }

    pub fn with_options(options: GameOptions) -> Self {
        let mut rng = match options.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let deck = Deck::new(&mut rng);
        let board = Board::new(&mut rng);
        let reward_deck = RewardDeck::new(&mut rng);
        Self {
            id: next_id("game"),
            options,
            players: HashMap::new(),
            joined: Vec::new(),
            play_order: Vec::new(),
            started: false,
            turn: 0,
            deck,
            discard: Discard::new(),
            board,
            reward_deck,
            discard_sequence: Vec::new(),
            round_results: Vec::new(),
            rng,
            observers: Vec::new(),
        }
    }

    /// Subscribe to the full event stream.
    pub fn on<F: Fn(&GameEvent) + 'static>(&mut self, listener: F) {
        self.observers.push(Box::new(listener));
    }

    fn emit(&self, event: GameEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.round_results.len() == self.options.rounds
    }

    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.players.len() == self.options.max_players {
            return Err(GameError::MaxPlayers);
        }
        let event = GameEvent::AddPlayer {
            player_id: player.id.clone(),
            name: player.name.clone(),
        };
        self.joined.push(player.id.clone());
        self.players.insert(player.id.clone(), player);
        self.emit(event);
        Ok(())
    }

    /// Remove a player from the roster. Silently ignores unknown ids.
    pub fn remove_player(&mut self, player_id: &str) {
        if self.players.remove(player_id).is_none() {
            return;
        }
        self.joined.retain(|id| id != player_id);
        self.emit(GameEvent::RemovePlayer {
            player_id: player_id.to_string(),
        });
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.joined.iter().filter_map(|id| self.players.get(id))
    }

    pub fn play_order(&self) -> &[PlayerId] {
        &self.play_order
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn reward_deck(&self) -> &RewardDeck {
        &self.reward_deck
    }

    pub fn round_results(&self) -> &[RoundResult] {
        &self.round_results
    }

    pub fn top_of_discard_pile(&self) -> Option<&Card> {
        self.discard.top_card()
    }

    pub fn visualize_board(&self) -> String {
        self.board.visualize()
    }

    /// The player whose turn it is, while a round is running.
    pub fn active_player_id(&self) -> Option<&PlayerId> {
        if !self.started || self.is_finished() || self.play_order.is_empty() {
            return None;
        }
        Some(&self.play_order[self.turn % self.play_order.len()])
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.active_player_id().and_then(|id| self.players.get(id))
    }

    /// Deal allegiances and hands for a fresh round. The role table keeps
    /// one spare flag, so the shuffled assignment varies per round.
    fn setup_players(&mut self) {
        let count = self.play_order.len();
        let split = ROLE_RATIO.get(&count).copied().unwrap_or(RoleSplit {
            saboteurs: count / 3,
            gold_diggers: count - count / 3,
        });
        let mut allegiances = vec![true; split.saboteurs];
        allegiances.extend(std::iter::repeat(false).take(split.gold_diggers));
        allegiances.shuffle(&mut self.rng);
        for (id, is_saboteur) in self.play_order.iter().zip(allegiances) {
            if let Some(player) = self.players.get_mut(id) {
                player.setup(is_saboteur);
            }
        }

        let hand_size = INITIAL_HAND_SIZES.get(&count).copied().unwrap_or(4);
        for _ in 0..hand_size {
            for id in &self.play_order {
                if let Some(card) = self.deck.draw_card() {
                    if let Some(player) = self.players.get_mut(id) {
                        player.add_to_hand(card);
                    }
                }
            }
        }
    }

    /// Begin the first round: turn order ascends by age (ties keep join
    /// order), allegiances are dealt, hands are dealt.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.players.len() < self.options.min_players {
            return Err(GameError::NotEnoughPlayers);
        }
        if self.players.len() > self.options.max_players {
            return Err(GameError::MaxPlayers);
        }
        let mut order = self.joined.clone();
        order.sort_by_key(|id| self.players.get(id).map(|p| p.age).unwrap_or(0));
        self.play_order = order;
        self.setup_players();
        self.started = true;
        tracing::info!(
            game = %self.id,
            players = self.play_order.len(),
            "game started"
        );
        self.emit(GameEvent::StartGame);
        self.emit(GameEvent::StartRound {
            round: self.round_results.len(),
        });
        if let Some(id) = self.active_player_id() {
            self.emit(GameEvent::StartTurn {
                player_id: id.clone(),
            });
        }
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        Ok(())
    }

    fn end_turn(&mut self, round_finished: bool) {
        if let Some(id) = self.active_player_id().cloned() {
            self.emit(GameEvent::EndTurn { player_id: id });
        }
        if round_finished {
            return;
        }
        self.turn += 1;
        if let Some(id) = self.active_player_id().cloned() {
            self.emit(GameEvent::StartTurn { player_id: id });
        }
    }

    /// Flip a card in a player's hand before playing it. Costs nothing and
    /// does not end the turn. Returns the new upside-down state.
    pub fn rotate_card(&mut self, player_id: &str, card_id: &str) -> Result<bool, GameError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        player.rotate_card(card_id)
    }

    /// Play a card from `player_id`'s hand. On success the turn ends, or
    /// the round finishes when the play completed the board or emptied the
    /// last hand.
    pub fn play_card(
        &mut self,
        player_id: &str,
        card_id: &str,
        params: Option<PlayParams>,
    ) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if !self.players.contains_key(player_id) {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }

        let affected = perform_play(
            player_id,
            card_id,
            params.as_ref(),
            &mut self.players,
            &mut self.board,
        )?;
        self.discard_sequence.clear();
        tracing::debug!(player = player_id, card = card_id, "card played");
        self.emit(GameEvent::PlayCard {
            player_id: player_id.to_string(),
            card_id: card_id.to_string(),
        });

        for card in affected {
            self.discard.add_played(card)?;
        }
        if let Some(card) = self.deck.draw_card() {
            if let Some(player) = self.players.get_mut(player_id) {
                player.add_to_hand(card);
            }
        }

        if self.board.is_complete() || self.all_hands_empty() {
            self.finish_round();
        } else {
            self.end_turn(false);
        }
        Ok(())
    }

    /// Discard a card (or pass, when the hand is empty). The round ends
    /// once every player has discarded consecutively against an empty deck,
    /// or when the last hand empties out.
    pub fn discard_card(
        &mut self,
        player_id: &str,
        card_id: Option<&str>,
    ) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        let hand_count = self
            .players
            .get(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?
            .hand_card_count();

        if hand_count == 0 {
            self.emit(GameEvent::DiscardCard {
                player_id: player_id.to_string(),
                card_id: None,
            });
        } else {
            let card_id = card_id.ok_or(GameError::MustDiscard)?;
            let card = self
                .players
                .get_mut(player_id)
                .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?
                .discard_card(card_id)?;
            self.discard.add_discarded(card)?;
            tracing::debug!(player = player_id, card = card_id, "card discarded");
            self.emit(GameEvent::DiscardCard {
                player_id: player_id.to_string(),
                card_id: Some(card_id.to_string()),
            });
        }

        if let Some(card) = self.deck.draw_card() {
            if let Some(player) = self.players.get_mut(player_id) {
                player.add_to_hand(card);
            }
        }

        if self.deck.is_empty() {
            self.discard_sequence.push(player_id.to_string());
            if self.discard_sequence.len() == self.play_order.len() || self.all_hands_empty() {
                self.finish_round();
                return Ok(());
            }
        }
        self.end_turn(false);
        Ok(())
    }

    fn all_hands_empty(&self) -> bool {
        self.play_order
            .iter()
            .all(|id| self.players.get(id).map_or(true, |p| p.hand_card_count() == 0))
    }

    /// Close out the round: pick the winning side, allocate gold, record
    /// the result, then either finish the game or set up the next round.
    fn finish_round(&mut self) {
        self.end_turn(true);

        let round = self.round_results.len();
        let winner = if self.board.is_complete() {
            Winner::GoldDiggers
        } else {
            Winner::Saboteurs
        };
        let active_id = self.play_order[self.turn % self.play_order.len()].clone();
        let gold = match winner {
            Winner::GoldDiggers => allocate_gold_to_diggers(
                &mut self.reward_deck,
                &self.play_order,
                &self.players,
                &active_id,
            ),
            Winner::Saboteurs => {
                allocate_gold_to_saboteurs(&mut self.reward_deck, &self.play_order, &self.players)
            }
        };
        tracing::info!(round, winner = ?winner, "round finished");

        let result = RoundResult {
            round,
            winner,
            gold,
            snapshot: self.snapshot_value(false),
        };
        self.emit(GameEvent::EndRound {
            round,
            winner,
            gold: result.gold.clone(),
        });
        self.round_results.push(result);

        if self.is_finished() {
            let standings = self.standings();
            tracing::info!(game = %self.id, "game finished");
            self.emit(GameEvent::EndGame { standings });
        } else {
            self.deck = Deck::new(&mut self.rng);
            self.discard = Discard::new();
            self.board = Board::new(&mut self.rng);
            self.discard_sequence.clear();
            self.setup_players();
            self.emit(GameEvent::StartRound {
                round: self.round_results.len(),
            });
            if let Some(id) = self.active_player_id() {
                self.emit(GameEvent::StartTurn {
                    player_id: id.clone(),
                });
            }
        }
    }

    /// Scoreboard over all recorded rounds, sorted by gold descending;
    /// ties keep turn-order position.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .play_order
            .iter()
            .filter_map(|id| {
                let player = self.players.get(id)?;
                let total_gold = self
                    .round_results
                    .iter()
                    .filter_map(|result| result.gold.get(id))
                    .flat_map(|cards| cards.iter().map(|c| c.value))
                    .sum();
                Some(Standing {
                    player_id: id.clone(),
                    name: player.name.clone(),
                    total_gold,
                })
            })
            .collect();
        standings.sort_by(|a, b| b.total_gold.cmp(&a.total_gold));
        standings
    }

    /// Structural snapshot of the whole game, suitable for JSON encoding.
    pub fn snapshot(&self) -> serde_json::Value {
        self.snapshot_value(true)
    }

    fn snapshot_value(&self, include_rounds: bool) -> serde_json::Value {
        let mut value = serde_json::json!({
            "id": self.id,
            "players": self.players,
            "play_order": self.play_order,
            "turn": self.turn,
            "is_started": self.started,
            "is_finished": self.is_finished(),
            "deck": self.deck,
            "discard": self.discard,
            "board": self.board,
            "reward_deck": self.reward_deck,
        });
        if include_rounds {
            value["round_results"] = serde_json::to_value(&self.round_results)
                .expect("round results serialize cleanly");
        }
        value
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
