//! Core value types: sides, connector sets, grid positions, tools, ids.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// The four sides of a card space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

pub const SIDES: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        };
        f.write_str(name)
    }
}

/// A set of connector sides, packed into a bitmask for Copy semantics.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connectors(u8);

impl Connectors {
    pub fn new(sides: &[Side]) -> Self {
        let mut bits = 0u8;
        for side in sides {
            bits |= 1 << side.index();
        }
        Connectors(bits)
    }

    /// All four sides open.
    pub fn all() -> Self {
        Connectors(0b1111)
    }

    pub fn contains(self, side: Side) -> bool {
        self.0 & (1 << side.index()) != 0
    }

    /// Every member mapped to its opposite side (the upside-down view).
    pub fn flipped(self) -> Self {
        let mut bits = 0u8;
        for side in SIDES {
            if self.contains(side) {
                bits |= 1 << side.opposite().index();
            }
        }
        Connectors(bits)
    }

    /// Member sides in canonical top/right/bottom/left order.
    pub fn sides(self) -> Vec<Side> {
        SIDES.into_iter().filter(|s| self.contains(*s)).collect()
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Connectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sides()).finish()
    }
}

impl Serialize for Connectors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sides().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Connectors {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sides = Vec::<Side>::deserialize(deserializer)?;
        Ok(Connectors::new(&sides))
    }
}

/// A grid coordinate with a canonical `"x,y"` string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(',')?;
        Some(Self::new(x.parse().ok()?, y.parse().ok()?))
    }

    /// The adjacent position one unit toward `side`. Top is +y, right is +x.
    pub fn neighbor(self, side: Side) -> Self {
        match side {
            Side::Top => Self::new(self.x, self.y + 1),
            Side::Right => Self::new(self.x + 1, self.y),
            Side::Bottom => Self::new(self.x, self.y - 1),
            Side::Left => Self::new(self.x - 1, self.y),
        }
    }

    /// All four cardinal neighbors, paired with the side they sit on.
    pub fn neighbors(self) -> [(Side, Position); 4] {
        SIDES.map(|side| (side, self.neighbor(side)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Position::from_key(&key)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid position key: {key}")))
    }
}

/// The three dwarf tools a player keeps in working order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pick,
    Lamp,
    Wagon,
}

pub const TOOLS: [Tool; 3] = [Tool::Pick, Tool::Lamp, Tool::Wagon];

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Pick => "pick",
            Tool::Lamp => "lamp",
            Tool::Wagon => "wagon",
        };
        f.write_str(name)
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Sequential entity ids. A counter keeps snapshots cheap and diffable
/// compared to UUIDs; uniqueness holds process-wide.
pub fn next_id(prefix: &str) -> String {
    format!("{prefix}-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
