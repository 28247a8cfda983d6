//! Card model and the full deck catalog (44 path cards, 27 action cards).
//!
//! Cards are a closed sum over path and action kinds; dispatch matches on
//! the kind tag rather than downcasting. A card lives in exactly one
//! container at a time (deck, hand, board grid, discard pile) and moves
//! between them by value.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::SerializeStruct;
use serde::Serialize;

use crate::error::GameError;
use crate::types::{next_id, Connectors, Position, Side, Tool};

pub type CardId = String;

/// Card lifecycle. `unused -> played` is idempotent; `unused -> discarded`
/// is terminal; nothing leaves `discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Unused,
    Played,
    Discarded,
}

fn mark_played(status: &mut CardStatus) -> Result<(), GameError> {
    match *status {
        CardStatus::Discarded => Err(GameError::CardAlreadyDiscarded),
        _ => {
            *status = CardStatus::Played;
            Ok(())
        }
    }
}

fn mark_discarded(status: &mut CardStatus) -> Result<(), GameError> {
    match *status {
        CardStatus::Unused => {
            *status = CardStatus::Discarded;
            Ok(())
        }
        CardStatus::Played => Err(GameError::CardAlreadyPlayed),
        CardStatus::Discarded => Err(GameError::CardAlreadyDiscarded),
    }
}

/// Parameters recorded on a card when it is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayParams {
    Board { position: Position },
    Tool { player_id: String, tool: Tool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Start,
    GoldFinish,
    RockFinish,
    Passage,
    Deadend,
}

impl PathKind {
    fn tag(self) -> &'static str {
        match self {
            PathKind::Start => "start",
            PathKind::GoldFinish => "gold_finish",
            PathKind::RockFinish => "rock_finish",
            PathKind::Passage => "passage",
            PathKind::Deadend => "deadend",
        }
    }
}

/// A card that occupies a board space: start, finish, passage or dead-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCard {
    pub id: CardId,
    pub status: CardStatus,
    pub kind: PathKind,
    connectors: Connectors,
    upside_down: bool,
    face_up: bool,
    pub params: Option<PlayParams>,
}

impl PathCard {
    fn new(kind: PathKind, connectors: Connectors, upside_down: bool) -> Self {
        let face_up = !matches!(kind, PathKind::GoldFinish | PathKind::RockFinish);
        Self {
            id: next_id("card"),
            status: CardStatus::Unused,
            kind,
            connectors,
            upside_down,
            face_up,
            params: None,
        }
    }

    pub fn passage(sides: &[Side], upside_down: bool) -> Self {
        Self::new(PathKind::Passage, Connectors::new(sides), upside_down)
    }

    pub fn deadend(sides: &[Side], upside_down: bool) -> Self {
        Self::new(PathKind::Deadend, Connectors::new(sides), upside_down)
    }

    pub fn start(upside_down: bool) -> Self {
        Self::new(PathKind::Start, Connectors::all(), upside_down)
    }

    pub fn gold_finish(upside_down: bool) -> Self {
        Self::new(PathKind::GoldFinish, Connectors::all(), upside_down)
    }

    pub fn rock_finish(sides: &[Side], upside_down: bool) -> Self {
        Self::new(PathKind::RockFinish, Connectors::new(sides), upside_down)
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self.kind, PathKind::Passage | PathKind::Deadend)
    }

    pub fn is_finish(&self) -> bool {
        matches!(self.kind, PathKind::GoldFinish | PathKind::RockFinish)
    }

    pub fn is_upside_down(&self) -> bool {
        self.upside_down
    }

    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    /// Flip the card over. Two rotations restore the original facing.
    pub fn rotate(&mut self) -> bool {
        self.upside_down = !self.upside_down;
        self.upside_down
    }

    /// The stated connector set.
    pub fn connectors(&self) -> Connectors {
        self.connectors
    }

    /// Connectors adjusted for the current orientation.
    pub fn effective_connectors(&self) -> Connectors {
        if self.upside_down {
            self.connectors.flipped()
        } else {
            self.connectors
        }
    }

    /// Connectors as seen by the availability flood: a face-down finish
    /// card keeps all four sides open until revealed.
    pub fn traversal_connectors(&self) -> Connectors {
        if self.is_finish() && !self.face_up {
            Connectors::all()
        } else {
            self.effective_connectors()
        }
    }

    /// Reveal a face-down finish card, snapping its orientation so the
    /// effective connectors include the side the path entered through.
    /// Revealing an already face-up card is a no-op.
    pub fn turn_over(&mut self, toward: Side) {
        if self.face_up {
            return;
        }
        self.face_up = true;
        if !self.effective_connectors().contains(toward) {
            self.upside_down = !self.upside_down;
        }
    }

    /// Reveal without an orientation constraint (end-of-round cleanup).
    pub fn force_turn_over(&mut self) {
        self.face_up = true;
    }

    pub fn set_played(&mut self) -> Result<(), GameError> {
        mark_played(&mut self.status)
    }

    pub fn set_discarded(&mut self) -> Result<(), GameError> {
        mark_discarded(&mut self.status)
    }
}

// Face-down finish cards serialize a neutral kind and the full connector
// set so snapshots cannot leak the hidden card.
impl Serialize for PathCard {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hidden = self.is_finish() && !self.face_up;
        let mut state = serializer.serialize_struct("PathCard", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("kind", if hidden { "finish" } else { self.kind.tag() })?;
        let connectors = if hidden { Connectors::all() } else { self.connectors };
        state.serialize_field("connectors", &connectors)?;
        state.serialize_field("upside_down", &(!hidden && self.upside_down))?;
        state.serialize_field("face_up", &self.face_up)?;
        state.serialize_field("params", &self.params)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Map,
    Rockfall,
    Break { applies_to: Vec<Tool> },
    Repair { applies_to: Vec<Tool> },
}

/// A one-shot card played against a player or the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCard {
    pub id: CardId,
    pub status: CardStatus,
    pub kind: ActionKind,
    pub params: Option<PlayParams>,
}

impl ActionCard {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            id: next_id("card"),
            status: CardStatus::Unused,
            kind,
            params: None,
        }
    }

    pub fn set_played(&mut self) -> Result<(), GameError> {
        mark_played(&mut self.status)
    }

    pub fn set_discarded(&mut self) -> Result<(), GameError> {
        mark_discarded(&mut self.status)
    }
}

/// Any card that can sit in a deck or a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Card {
    Path(PathCard),
    Action(ActionCard),
}

impl Card {
    pub fn id(&self) -> &str {
        match self {
            Card::Path(card) => &card.id,
            Card::Action(card) => &card.id,
        }
    }

    pub fn status(&self) -> CardStatus {
        match self {
            Card::Path(card) => card.status,
            Card::Action(card) => card.status,
        }
    }

    pub fn set_played(&mut self) -> Result<(), GameError> {
        match self {
            Card::Path(card) => card.set_played(),
            Card::Action(card) => card.set_played(),
        }
    }

    pub fn set_discarded(&mut self) -> Result<(), GameError> {
        match self {
            Card::Path(card) => card.set_discarded(),
            Card::Action(card) => card.set_discarded(),
        }
    }

    /// Record the parameters this card was played with.
    pub fn record_params(&mut self, params: PlayParams) {
        match self {
            Card::Path(card) => card.params = Some(params),
            Card::Action(card) => card.params = Some(params),
        }
    }

    pub fn as_path(&self) -> Option<&PathCard> {
        match self {
            Card::Path(card) => Some(card),
            Card::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionCard> {
        match self {
            Card::Action(card) => Some(card),
            Card::Path(_) => None,
        }
    }
}

// ------------------------------------------------------------------ //
//  Deck catalog
// ------------------------------------------------------------------ //

use Side::{Bottom as B, Left as L, Right as R, Top as T};

struct TunnelSpec {
    deadend: bool,
    sides: &'static [Side],
    count: usize,
}

static TUNNEL_CATALOG: Lazy<Vec<TunnelSpec>> = Lazy::new(|| {
    vec![
        // 31 passage cards
        TunnelSpec { deadend: false, sides: &[R, L], count: 3 },
        TunnelSpec { deadend: false, sides: &[T, B], count: 4 },
        TunnelSpec { deadend: false, sides: &[T, L], count: 4 },
        TunnelSpec { deadend: false, sides: &[T, R], count: 5 },
        TunnelSpec { deadend: false, sides: &[T, R, L], count: 5 },
        TunnelSpec { deadend: false, sides: &[T, R, B], count: 5 },
        TunnelSpec { deadend: false, sides: &[T, R, B, L], count: 5 },
        // 9 dead-end cards
        TunnelSpec { deadend: true, sides: &[T], count: 1 },
        TunnelSpec { deadend: true, sides: &[R], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, R], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, B], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, L], count: 1 },
        TunnelSpec { deadend: true, sides: &[R, L], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, R, B], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, R, L], count: 1 },
        TunnelSpec { deadend: true, sides: &[T, R, B, L], count: 1 },
    ]
});

struct ActionSpec {
    kind: ActionKind,
    count: usize,
}

static ACTION_CATALOG: Lazy<Vec<ActionSpec>> = Lazy::new(|| {
    vec![
        ActionSpec { kind: ActionKind::Map, count: 6 },
        ActionSpec { kind: ActionKind::Rockfall, count: 3 },
        ActionSpec { kind: ActionKind::Break { applies_to: vec![Tool::Pick] }, count: 3 },
        ActionSpec { kind: ActionKind::Break { applies_to: vec![Tool::Lamp] }, count: 3 },
        ActionSpec { kind: ActionKind::Break { applies_to: vec![Tool::Wagon] }, count: 3 },
        ActionSpec { kind: ActionKind::Repair { applies_to: vec![Tool::Pick] }, count: 2 },
        ActionSpec { kind: ActionKind::Repair { applies_to: vec![Tool::Lamp] }, count: 2 },
        ActionSpec { kind: ActionKind::Repair { applies_to: vec![Tool::Wagon] }, count: 2 },
        ActionSpec {
            kind: ActionKind::Repair { applies_to: vec![Tool::Pick, Tool::Lamp] },
            count: 1,
        },
        ActionSpec {
            kind: ActionKind::Repair { applies_to: vec![Tool::Pick, Tool::Wagon] },
            count: 1,
        },
        ActionSpec {
            kind: ActionKind::Repair { applies_to: vec![Tool::Lamp, Tool::Wagon] },
            count: 1,
        },
    ]
});

/// The four cards seeded onto a fresh board.
pub struct PlacedCards {
    pub start: PathCard,
    pub gold: PathCard,
    pub rock1: PathCard,
    pub rock2: PathCard,
}

pub fn placed_cards(rng: &mut impl Rng) -> PlacedCards {
    PlacedCards {
        start: PathCard::start(rng.gen_bool(0.5)),
        gold: PathCard::gold_finish(rng.gen_bool(0.5)),
        rock1: PathCard::rock_finish(&[T, R], rng.gen_bool(0.5)),
        rock2: PathCard::rock_finish(&[T, L], rng.gen_bool(0.5)),
    }
}

/// Build the shuffled draw pile: every catalog entry instantiated, tunnel
/// cards dealt with a random initial orientation.
pub fn build_shuffled_deck(rng: &mut impl Rng) -> Vec<Card> {
    let mut cards: Vec<Card> = Vec::with_capacity(deck_size());
    for spec in TUNNEL_CATALOG.iter() {
        for _ in 0..spec.count {
            let card = if spec.deadend {
                PathCard::deadend(spec.sides, rng.gen_bool(0.5))
            } else {
                PathCard::passage(spec.sides, rng.gen_bool(0.5))
            };
            cards.push(Card::Path(card));
        }
    }
    for spec in ACTION_CATALOG.iter() {
        for _ in 0..spec.count {
            cards.push(Card::Action(ActionCard::new(spec.kind.clone())));
        }
    }
    cards.shuffle(rng);
    cards
}

/// Total number of cards in the draw pile.
pub fn deck_size() -> usize {
    TUNNEL_CATALOG.iter().map(|s| s.count).sum::<usize>()
        + ACTION_CATALOG.iter().map(|s| s.count).sum::<usize>()
}
