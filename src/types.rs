use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Largest grid side accepted from a config or a saved position.
pub const MAX_SIDE: i32 = 4096;

/// Stones and the ball must satisfy `|x|, |y| <= COORD_LIMIT`. Off-grid cells
/// stay representable (a winning jump can land past the edge) while every
/// jump the search walks stays far from `i32` overflow.
pub const COORD_LIMIT: i32 = 1 << 20;

/// A grid intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// True when the coordinate is within [`COORD_LIMIT`] on both axes.
    pub fn is_addressable(self) -> bool {
        (-COORD_LIMIT..=COORD_LIMIT).contains(&self.x)
            && (-COORD_LIMIT..=COORD_LIMIT).contains(&self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Grid dimensions. Goal rows are `y <= 1` (bottom) and `y >= height - 2` (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub width: i32,
    pub height: i32,
}

impl Shape {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns the centre intersection, where the ball starts.
    pub fn center(&self) -> Coord {
        Coord::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y)
    }

    /// Both sides must lie in `1..=MAX_SIDE`.
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 || self.height <= 0 {
            return Err(format!(
                "shape must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(format!(
                "shape {}x{} exceeds the {MAX_SIDE}x{MAX_SIDE} limit",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::new(15, 19)
    }
}

/// Every ball position visited en route to (but excluding) a destination.
/// The first entry is the square the search started from.
pub type Path = Vec<Coord>;

/// Destination -> every distinct path that lands there.
pub type LegalMoves = BTreeMap<Coord, Vec<Path>>;

/// One straight jump, from take-off to landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Coord,
    pub to: Coord,
}

/// A goal side. Also used for the player defending/attacking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// One renderer directive. A [`Diff`] carries any combination of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    Added { coords: Vec<Coord> },
    Removed { coords: Vec<Coord> },
    MoveTrail { segments: Vec<Segment> },
    /// Several paths reach `dest` and none is a single jump; nothing was staged.
    Conflict { dest: Coord, paths: Vec<Path> },
    ClearTransient,
    BallMovedTo { coord: Coord },
}

/// Changes a renderer must apply, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub instructions: Vec<Instruction>,
}

impl Diff {
    pub fn single(instruction: Instruction) -> Self {
        Self {
            instructions: vec![instruction],
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Returns the conflict carried by this diff, if staging stopped on one.
    pub fn conflict(&self) -> Option<(Coord, &[Path])> {
        self.instructions.iter().find_map(|ins| match ins {
            Instruction::Conflict { dest, paths } => Some((*dest, paths.as_slice())),
            _ => None,
        })
    }
}

/// Persistence triple: enough to rebuild a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub shape: Shape,
    pub ball: Coord,
    pub stones: Vec<Coord>,
}

impl Position {
    /// Checks the shape, that the ball and every stone are addressable, and
    /// that no stone is duplicated or sits on the ball.
    pub fn validate(&self) -> Result<(), String> {
        self.shape.validate()?;
        if !self.ball.is_addressable() {
            return Err(format!(
                "ball ({}, {}) is too far from the grid",
                self.ball.x, self.ball.y
            ));
        }

        let mut seen = BTreeSet::new();
        for &stone in &self.stones {
            if !stone.is_addressable() {
                return Err(format!(
                    "stone at ({}, {}) is too far from the grid",
                    stone.x, stone.y
                ));
            }
            if stone == self.ball {
                return Err(format!(
                    "stone at ({}, {}) overlaps the ball",
                    stone.x, stone.y
                ));
            }
            if !seen.insert(stone) {
                return Err(format!("duplicate stone at ({}, {})", stone.x, stone.y));
            }
        }
        Ok(())
    }
}

/// Tunables for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub shape: Shape,
    pub start: Coord,
    /// Longest jump chain the move search follows.
    pub max_depth: usize,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.shape.validate()?;
        if !self.shape.contains(self.start) {
            return Err(format!(
                "start ({}, {}) is outside the grid",
                self.start.x, self.start.y
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let shape = Shape::default();
        Self {
            shape,
            start: shape.center(),
            max_depth: crate::movegen::DEFAULT_MAX_DEPTH,
        }
    }
}
