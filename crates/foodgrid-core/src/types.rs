//! Core type definitions for the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeId(pub Uuid);

impl EpisodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position on the grid. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Cell one step ahead when facing `direction`
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// True when the position lies strictly inside a one-cell border
    pub fn is_interior(&self, width: i32, height: i32) -> bool {
        self.x > 0 && self.y > 0 && self.x < width - 1 && self.y < height - 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Facing direction. Discriminants follow the MiniGrid convention
/// (0 = east, clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North,
        ]
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Wraps modulo 4
    pub fn from_index(index: u8) -> Self {
        Self::all()[(index % 4) as usize]
    }

    /// Rotate counter-clockwise
    pub fn turn_left(&self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Rotate clockwise
    pub fn turn_right(&self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

/// Discrete agent actions, in MiniGrid order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left = 0,
    Right = 1,
    Forward = 2,
    Pickup = 3,
    Drop = 4,
    Toggle = 5,
    Done = 6,
}

impl Action {
    pub fn all() -> [Action; 7] {
        [
            Action::Left,
            Action::Right,
            Action::Forward,
            Action::Pickup,
            Action::Drop,
            Action::Toggle,
            Action::Done,
        ]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }
}

/// A food item. The payoff never changes once placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    energy: f64,
}

impl Food {
    pub fn new(energy: f64) -> Self {
        Self { energy }
    }

    /// Energy granted on consumption
    pub fn energy(&self) -> f64 {
        self.energy
    }
}

/// Something occupying a grid cell (or carried by the agent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Wall,
    Food(Food),
}

impl Entity {
    pub fn can_pickup(&self) -> bool {
        matches!(self, Entity::Food(_))
    }

    pub fn can_overlap(&self) -> bool {
        false
    }

    pub fn as_food(&self) -> Option<&Food> {
        match self {
            Entity::Food(food) => Some(food),
            Entity::Wall => None,
        }
    }

    /// `[object, color, state]` triple used in observations
    pub fn encode(&self) -> [u8; 3] {
        match self {
            Entity::Wall => [OBJECT_WALL, COLOR_GREY, 0],
            Entity::Food(_) => [OBJECT_FOOD, COLOR_GREEN, 0],
        }
    }
}

pub const OBJECT_EMPTY: u8 = 1;
pub const OBJECT_WALL: u8 = 2;
pub const OBJECT_AGENT: u8 = 10;
pub const OBJECT_FOOD: u8 = 11;

pub const COLOR_RED: u8 = 0;
pub const COLOR_GREEN: u8 = 1;
pub const COLOR_GREY: u8 = 5;
