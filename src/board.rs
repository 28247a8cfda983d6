//! Board logic: tunnel connectivity, placement validation, finish reveal.
//!
//! The grid is sparse. Reachability is computed by flooding outward from the
//! start card through effective connectors; face-down finish cards traverse
//! and match as if all four sides were open.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::SerializeStruct;
use serde::Serialize;

use crate::cards::{placed_cards, CardStatus, PathCard, PathKind};
use crate::error::GameError;
use crate::types::{next_id, Position, Side};

pub const START_POSITION: Position = Position { x: 0, y: 0 };

/// The three finish slots: a fan seven spaces up from the start.
pub const FINISH_POSITIONS: [Position; 3] = [
    Position { x: 2, y: 7 },
    Position { x: 0, y: 7 },
    Position { x: -2, y: 7 },
];

pub struct Board {
    id: String,
    grid: HashMap<Position, PathCard>,
    complete: bool,
}

impl Board {
    /// Seed the start card at the origin and one gold + two rock finish
    /// cards across the finish slots, with the assignment shuffled.
    pub fn new(rng: &mut impl Rng) -> Self {
        let placed = placed_cards(rng);
        let mut finishes = vec![placed.gold, placed.rock1, placed.rock2];
        finishes.shuffle(rng);

        let mut grid = HashMap::new();
        let seed = |pos: Position, mut card: PathCard, grid: &mut HashMap<Position, PathCard>| {
            card.set_played().expect("freshly built cards are playable");
            grid.insert(pos, card);
        };
        seed(START_POSITION, placed.start, &mut grid);
        for (pos, card) in FINISH_POSITIONS.into_iter().zip(finishes) {
            seed(pos, card, &mut grid);
        }

        Self {
            id: next_id("board"),
            grid,
            complete: false,
        }
    }

    /// Assemble a board from an explicit grid (tests).
    #[cfg(test)]
    pub(crate) fn from_parts(grid: HashMap<Position, PathCard>) -> Self {
        Self {
            id: next_id("board"),
            grid,
            complete: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True from the moment the gold finish card is revealed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn card_at(&self, position: Position) -> Option<&PathCard> {
        self.grid.get(&position)
    }

    /// Positions currently holding a card, sorted.
    pub fn occupied_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.grid.keys().copied().collect();
        positions.sort();
        positions
    }

    /// Raw four-neighbor occupancy, no filtering.
    pub fn adjacent_cards(&self, position: Position) -> [(Side, Option<&PathCard>); 4] {
        position
            .neighbors()
            .map(|(side, npos)| (side, self.grid.get(&npos)))
    }

    /// Every empty position reachable from the start card.
    ///
    /// Iterative flood with an explicit work stack: an empty position is
    /// collected and terminates its branch, a dead-end card never
    /// propagates, and any other card propagates through each effective
    /// connector (face-down finish cards count as four-sided). The visited
    /// set makes cycles safe. Result is sorted for determinism.
    pub fn available_positions(&self) -> Vec<Position> {
        let mut visited: HashSet<Position> = HashSet::new();
        let mut available: HashSet<Position> = HashSet::new();
        let mut stack = vec![START_POSITION];

        while let Some(pos) = stack.pop() {
            if !visited.insert(pos) {
                continue;
            }
            match self.grid.get(&pos) {
                None => {
                    available.insert(pos);
                }
                Some(card) if card.kind == PathKind::Deadend => {}
                Some(card) => {
                    for side in card.traversal_connectors().sides() {
                        stack.push(pos.neighbor(side));
                    }
                }
            }
        }

        let mut result: Vec<Position> = available.into_iter().collect();
        result.sort();
        result
    }

    /// Whether `card` may sit with `side` facing `adjacent`.
    ///
    /// An absent neighbor is trivially compatible and a face-down finish
    /// card matches as wild. Otherwise the edge must agree from both sides:
    /// either both cards open toward each other or neither does.
    pub fn can_cards_connect(side: Side, adjacent: Option<&PathCard>, card: &PathCard) -> bool {
        let Some(adjacent) = adjacent else {
            return true;
        };
        if adjacent.is_finish() && !adjacent.is_face_up() {
            return true;
        }
        let needs_connector = card.effective_connectors().contains(side);
        let has_connector = adjacent.effective_connectors().contains(side.opposite());
        needs_connector == has_connector
    }

    /// Check every placement rule without mutating.
    ///
    /// Rules, in order, each with its own error:
    /// 1. Only passage and dead-end cards go into the grid
    /// 2. The card must be unused
    /// 3. The position must be empty
    /// 4. The position must be reachable from the start card
    /// 5. Connectors must agree with all four neighbors
    pub(crate) fn validate_add(&self, card: &PathCard, position: Position) -> Result<(), GameError> {
        if !card.is_tunnel() {
            return Err(GameError::InvalidCardType);
        }
        match card.status {
            CardStatus::Unused => {}
            CardStatus::Played => return Err(GameError::CardAlreadyPlayed),
            CardStatus::Discarded => return Err(GameError::CardAlreadyDiscarded),
        }
        if self.grid.contains_key(&position) {
            return Err(GameError::PositionOccupied(position));
        }
        if !self.available_positions().contains(&position) {
            return Err(GameError::PositionUnreachable(position));
        }
        for (side, adjacent) in self.adjacent_cards(position) {
            if !Self::can_cards_connect(side, adjacent, card) {
                return Err(GameError::ConnectorMismatch(position));
            }
        }
        Ok(())
    }

    /// Place a tunnel card, then reveal any face-down finish card the new
    /// card actually connects into. Revealing gold completes the board and
    /// force-reveals the remaining finish cards.
    pub fn add_card(&mut self, mut card: PathCard, position: Position) -> Result<(), GameError> {
        self.validate_add(&card, position)?;
        card.set_played()?;
        let connectors = card.effective_connectors();
        self.grid.insert(position, card);

        let mut gold_revealed = false;
        for side in connectors.sides() {
            let npos = position.neighbor(side);
            if let Some(neighbor) = self.grid.get_mut(&npos) {
                if neighbor.is_finish() && !neighbor.is_face_up() {
                    neighbor.turn_over(side.opposite());
                    if neighbor.kind == PathKind::GoldFinish {
                        gold_revealed = true;
                    }
                }
            }
        }

        if gold_revealed {
            self.complete = true;
            for card in self.grid.values_mut() {
                if card.is_finish() && !card.is_face_up() {
                    card.force_turn_over();
                }
            }
        }
        Ok(())
    }

    /// Remove a passage or dead-end card (rockfall). The seeded start and
    /// finish cards are not removable.
    pub fn remove_card(&mut self, position: Position) -> Result<PathCard, GameError> {
        match self.grid.get(&position) {
            None => Err(GameError::PositionEmpty(position)),
            Some(card) if !card.is_tunnel() => Err(GameError::CannotRemoveCard(position)),
            Some(_) => self
                .grid
                .remove(&position)
                .ok_or(GameError::PositionEmpty(position)),
        }
    }

    /// Text rendering of the occupied and available positions, three text
    /// rows per cell.
    pub fn visualize(&self) -> String {
        let available: HashSet<Position> = self.available_positions().into_iter().collect();
        let mut xs: Vec<i32> = self.grid.keys().map(|p| p.x).collect();
        let mut ys: Vec<i32> = self.grid.keys().map(|p| p.y).collect();
        xs.extend(available.iter().map(|p| p.x));
        ys.extend(available.iter().map(|p| p.y));
        let (min_x, max_x) = (xs.iter().min().copied().unwrap_or(0), xs.iter().max().copied().unwrap_or(0));
        let (min_y, max_y) = (ys.iter().min().copied().unwrap_or(0), ys.iter().max().copied().unwrap_or(0));

        let mut out = String::new();
        for y in (min_y..=max_y).rev() {
            let mut rows = [String::new(), String::new(), String::new()];
            for x in min_x..=max_x {
                let pos = Position::new(x, y);
                let cell = match self.grid.get(&pos) {
                    Some(card) => card_cell(card),
                    None if available.contains(&pos) => cell_of("░░", "░░", "░░"),
                    None => cell_of("  ", "  ", "  "),
                };
                for (row, line) in rows.iter_mut().zip(cell) {
                    row.push_str(&line);
                }
            }
            for row in rows {
                out.push_str(&row);
                out.push('\n');
            }
        }
        out
    }
}

fn cell_of(top: &str, mid: &str, bottom: &str) -> [String; 3] {
    [
        format!("{top}{top}{top}"),
        format!("{mid}{mid}{mid}"),
        format!("{bottom}{bottom}{bottom}"),
    ]
}

fn card_cell(card: &PathCard) -> [String; 3] {
    if card.is_finish() && !card.is_face_up() {
        return [
            "██████".to_string(),
            "██??██".to_string(),
            "██████".to_string(),
        ];
    }
    let open = |side: Side| {
        if card.effective_connectors().contains(side) {
            "  "
        } else {
            "██"
        }
    };
    let center = if card.kind == PathKind::Deadend { "██" } else { "  " };
    [
        format!("██{}██", open(Side::Top)),
        format!("{}{}{}", open(Side::Left), center, open(Side::Right)),
        format!("██{}██", open(Side::Bottom)),
    ]
}

// Grid keys serialize in their canonical "x,y" form, sorted.
impl Serialize for Board {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let grid: BTreeMap<String, &PathCard> =
            self.grid.iter().map(|(pos, card)| (pos.key(), card)).collect();
        let mut state = serializer.serialize_struct("Board", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("grid", &grid)?;
        state.serialize_field("is_complete", &self.complete)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side::{Bottom as B, Left as L, Right as R, Top as T};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_board() -> Board {
        let mut rng = StdRng::seed_from_u64(42);
        Board::new(&mut rng)
    }

    /// Start card plus a gold finish two spaces up.
    fn board_with_near_gold() -> Board {
        let mut grid = HashMap::new();
        grid.insert(START_POSITION, PathCard::start(false));
        grid.insert(Position::new(0, 2), PathCard::gold_finish(false));
        Board::from_parts(grid)
    }

    #[test]
    fn test_seeded_positions() {
        let board = make_board();
        assert_eq!(board.card_at(START_POSITION).unwrap().kind, PathKind::Start);
        for pos in FINISH_POSITIONS {
            let card = board.card_at(pos).unwrap();
            assert!(card.is_finish());
            assert!(!card.is_face_up());
        }
        assert!(!board.is_complete());
    }

    #[test]
    fn test_initial_available_positions() {
        let board = make_board();
        let open = board.available_positions();
        assert_eq!(open.len(), 4);
        for pos in [
            Position::new(0, 1),
            Position::new(1, 0),
            Position::new(0, -1),
            Position::new(-1, 0),
        ] {
            assert!(open.contains(&pos));
        }
    }

    #[test]
    fn test_add_card_then_availability_moves_downstream() {
        let mut board = make_board();
        let card = PathCard::passage(&[R, L], false);
        let pos = Position::new(1, 0);
        board.add_card(card, pos).unwrap();

        assert_eq!(board.card_at(pos).unwrap().kind, PathKind::Passage);
        let open = board.available_positions();
        assert!(!open.contains(&pos));
        assert!(open.contains(&Position::new(2, 0)));
    }

    #[test]
    fn test_reachability_monotonicity() {
        let mut board = make_board();
        let before: HashSet<Position> = board.available_positions().into_iter().collect();
        let pos = Position::new(0, 1);
        board
            .add_card(PathCard::passage(&[T, B], false), pos)
            .unwrap();
        let after: HashSet<Position> = board.available_positions().into_iter().collect();
        for p in &before {
            if *p != pos {
                assert!(after.contains(p), "{p} lost by placing at {pos}");
            }
        }
        assert!(after.contains(&Position::new(0, 2)));
    }

    #[test]
    fn test_add_card_rejects_non_tunnel() {
        let mut board = make_board();
        let err = board
            .add_card(PathCard::start(false), Position::new(0, 1))
            .unwrap_err();
        assert_eq!(err, GameError::InvalidCardType);
    }

    #[test]
    fn test_add_card_rejects_played_card() {
        let mut board = make_board();
        let mut card = PathCard::passage(&[T, B], false);
        card.set_played().unwrap();
        let err = board.add_card(card, Position::new(0, 1)).unwrap_err();
        assert_eq!(err, GameError::CardAlreadyPlayed);
    }

    #[test]
    fn test_add_card_rejects_occupied_position() {
        let mut board = make_board();
        board
            .add_card(PathCard::passage(&[T, B], false), Position::new(0, 1))
            .unwrap();
        let err = board
            .add_card(PathCard::passage(&[T, B], false), Position::new(0, 1))
            .unwrap_err();
        assert_eq!(err, GameError::PositionOccupied(Position::new(0, 1)));
    }

    #[test]
    fn test_add_card_rejects_unreachable_position() {
        let mut board = make_board();
        let err = board
            .add_card(PathCard::passage(&[T, B], false), Position::new(5, 5))
            .unwrap_err();
        assert_eq!(err, GameError::PositionUnreachable(Position::new(5, 5)));
    }

    #[test]
    fn test_add_card_rejects_half_connection() {
        let mut board = make_board();
        // [right, left] above the start: its bottom is a wall while the
        // start opens upward.
        let err = board
            .add_card(PathCard::passage(&[R, L], false), Position::new(0, 1))
            .unwrap_err();
        assert_eq!(err, GameError::ConnectorMismatch(Position::new(0, 1)));
    }

    #[test]
    fn test_connector_symmetry() {
        let a = PathCard::passage(&[T, R], false);
        let b = PathCard::passage(&[T, B], true);
        for side in crate::types::SIDES {
            assert_eq!(
                Board::can_cards_connect(side, Some(&b), &a),
                Board::can_cards_connect(side.opposite(), Some(&a), &b),
            );
        }
    }

    #[test]
    fn test_deadend_stops_propagation() {
        let mut board = make_board();
        board
            .add_card(PathCard::deadend(&[T, B], false), Position::new(0, 1))
            .unwrap();
        let open = board.available_positions();
        assert!(!open.contains(&Position::new(0, 2)));
    }

    #[test]
    fn test_gold_reveal_completes_board() {
        let mut board = board_with_near_gold();
        board
            .add_card(PathCard::passage(&[T, B], false), Position::new(0, 1))
            .unwrap();
        assert!(board.is_complete());
        let gold = board.card_at(Position::new(0, 2)).unwrap();
        assert!(gold.is_face_up());
    }

    #[test]
    fn test_rock_reveal_snaps_orientation() {
        let mut grid = HashMap::new();
        grid.insert(START_POSITION, PathCard::start(false));
        // Rock finish open top/right; the path enters from below, so the
        // reveal must flip it to face the connection.
        grid.insert(Position::new(0, 2), PathCard::rock_finish(&[T, R], false));
        let mut board = Board::from_parts(grid);
        board
            .add_card(PathCard::passage(&[T, B], false), Position::new(0, 1))
            .unwrap();
        let rock = board.card_at(Position::new(0, 2)).unwrap();
        assert!(rock.is_face_up());
        assert!(rock.effective_connectors().contains(B));
        assert!(!board.is_complete());
    }

    #[test]
    fn test_no_reveal_without_connection() {
        let mut grid = HashMap::new();
        grid.insert(START_POSITION, PathCard::start(false));
        grid.insert(Position::new(0, 2), PathCard::rock_finish(&[T, R], false));
        let mut board = Board::from_parts(grid);
        // Dead-end pointing only downward: adjacent to the finish but not
        // connected into it.
        board
            .add_card(PathCard::deadend(&[B], false), Position::new(0, 1))
            .unwrap();
        let rock = board.card_at(Position::new(0, 2)).unwrap();
        assert!(!rock.is_face_up());
    }

    #[test]
    fn test_remove_card() {
        let mut board = make_board();
        let pos = Position::new(0, 1);
        board
            .add_card(PathCard::passage(&[T, B], false), pos)
            .unwrap();
        let removed = board.remove_card(pos).unwrap();
        assert_eq!(removed.kind, PathKind::Passage);
        assert!(board.card_at(pos).is_none());

        assert_eq!(board.remove_card(pos), Err(GameError::PositionEmpty(pos)));
        assert_eq!(
            board.remove_card(START_POSITION),
            Err(GameError::CannotRemoveCard(START_POSITION)),
        );
    }

    #[test]
    fn test_face_down_finish_matches_as_wild() {
        let mut grid = HashMap::new();
        grid.insert(START_POSITION, PathCard::start(false));
        grid.insert(Position::new(0, 2), PathCard::rock_finish(&[T, R], false));
        let board = Board::from_parts(grid);
        // A card whose top side is a wall still fits under the face-down
        // finish; only the start card below constrains it.
        let card = PathCard::passage(&[T, B], false);
        let finish = board.card_at(Position::new(0, 2));
        assert!(Board::can_cards_connect(T, finish, &card));
        let walled = PathCard::passage(&[R, L], false);
        assert!(Board::can_cards_connect(T, finish, &walled));
    }

    #[test]
    fn test_serialization_uses_position_keys() {
        let board = make_board();
        let value = serde_json::to_value(&board).unwrap();
        assert!(value["grid"]["0,0"].is_object());
        assert_eq!(value["grid"]["0,0"]["kind"], "start");
        assert_eq!(value["is_complete"], false);
        for pos in FINISH_POSITIONS {
            assert_eq!(value["grid"][pos.key()]["kind"], "finish");
        }
    }

    #[test]
    fn test_visualize_renders_grid() {
        let board = make_board();
        let rendered = board.visualize();
        assert!(!rendered.is_empty());
        // Start card: all four sides open.
        assert!(rendered.contains("██  ██"));
        // Hidden finish cards.
        assert!(rendered.contains("██??██"));
    }
}
