use std::collections::BTreeSet;

use crate::movegen;
use crate::types::{Coord, Diff, Instruction, LegalMoves, Position, Shape, Side};

/// Authoritative phutball position: stones, ball and the cached legal-move
/// table for that pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    stones: BTreeSet<Coord>,
    ball: Coord,
    shape: Shape,
    max_depth: usize,
    legal_moves: LegalMoves,
}

impl BoardState {
    /// Creates an empty board with the ball at `ball`.
    pub fn new(shape: Shape, ball: Coord, max_depth: usize) -> Self {
        let mut board = Self {
            stones: BTreeSet::new(),
            ball,
            shape,
            max_depth,
            legal_moves: LegalMoves::new(),
        };
        board.update_legal_moves();
        board
    }

    /// Rebuilds a board from a saved position.
    pub fn from_position(position: &Position, max_depth: usize) -> Result<Self, String> {
        position.validate()?;

        let mut board = Self {
            stones: position.stones.iter().copied().collect(),
            ball: position.ball,
            shape: position.shape,
            max_depth,
            legal_moves: LegalMoves::new(),
        };
        board.update_legal_moves();
        Ok(board)
    }

    pub fn to_position(&self) -> Position {
        Position {
            shape: self.shape,
            ball: self.ball,
            stones: self.stones.iter().copied().collect(),
        }
    }

    pub fn stones(&self) -> &BTreeSet<Coord> {
        &self.stones
    }

    pub fn ball(&self) -> Coord {
        self.ball
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn legal_moves(&self) -> &LegalMoves {
        &self.legal_moves
    }

    /// True when `coord` holds a stone or the ball.
    pub fn is_occupied(&self, coord: Coord) -> bool {
        coord == self.ball || self.stones.contains(&coord)
    }

    /// Places a stone. Returns `None` when the cell holds a stone or the ball.
    /// The legal-move table is left stale; call [`Self::update_legal_moves`].
    pub fn add_man(&mut self, coord: Coord) -> Option<Diff> {
        if self.is_occupied(coord) {
            return None;
        }
        self.stones.insert(coord);
        Some(Diff::single(Instruction::Added {
            coords: vec![coord],
        }))
    }

    /// Lifts a stone. Returns `None` when there is none at `coord`.
    pub fn remove_man(&mut self, coord: Coord) -> Option<Diff> {
        if !self.stones.remove(&coord) {
            return None;
        }
        Some(Diff::single(Instruction::Removed {
            coords: vec![coord],
        }))
    }

    /// Adds or removes a stone, then refreshes the legal-move table.
    pub fn toggle_man(&mut self, coord: Coord) -> Option<Diff> {
        let diff = if self.stones.contains(&coord) {
            self.remove_man(coord)
        } else {
            self.add_man(coord)
        };
        self.update_legal_moves();
        diff
    }

    pub fn update_legal_moves(&mut self) -> &LegalMoves {
        self.legal_moves = movegen::generate(self.ball, &self.stones, self.shape, self.max_depth);
        &self.legal_moves
    }

    /// Returns the goal the ball sits in, if any.
    pub fn check_for_win(&self) -> Option<Side> {
        if self.ball.y <= 1 {
            Some(Side::Bottom)
        } else if self.ball.y >= self.shape.height.saturating_sub(2) {
            Some(Side::Top)
        } else {
            None
        }
    }

    /// Clears every stone and puts the ball on `center`.
    pub fn reset(&mut self, center: Coord) {
        self.stones.clear();
        self.ball = center;
        self.update_legal_moves();
    }

    /// Replaces the position with a committed speculation.
    pub(crate) fn commit(&mut self, ball: Coord, stones: BTreeSet<Coord>, legal_moves: LegalMoves) {
        self.ball = ball;
        self.stones = stones;
        self.legal_moves = legal_moves;
    }

    pub fn as_ascii(&self) -> String {
        render_ascii(self.shape, self.ball, &self.stones, &self.legal_moves)
    }
}

/// Text picture of a position, top row first: `O` ball, `X` stone,
/// `@` legal destination, `,` empty.
pub fn render_ascii(
    shape: Shape,
    ball: Coord,
    stones: &BTreeSet<Coord>,
    legal_moves: &LegalMoves,
) -> String {
    let width = usize::try_from(shape.width).unwrap_or(0);
    let height = usize::try_from(shape.height).unwrap_or(0);
    let capacity = width
        .checked_add(1)
        .and_then(|row| row.checked_mul(height))
        .unwrap_or(0);
    let mut out = String::with_capacity(capacity);
    for y in (0..shape.height).rev() {
        for x in 0..shape.width {
            let coord = Coord::new(x, y);
            out.push(if coord == ball {
                'O'
            } else if stones.contains(&coord) {
                'X'
            } else if legal_moves.contains_key(&coord) {
                '@'
            } else {
                ','
            });
        }
        out.push('\n');
    }
    out
}
