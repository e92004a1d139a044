//! Staged moves.
//!
//! A [`Speculation`] is a shadow of a [`BoardState`] in which one move is
//! built step by step: a single jump, a chain of jumps (with undo back to
//! any earlier stop), or a stone placement. The board itself only changes
//! in [`Speculation::confirm`]; dropping or resetting the speculation
//! abandons the staged work.

use std::collections::BTreeSet;

use crate::board::{BoardState, render_ascii};
use crate::geometry;
use crate::movegen;
use crate::types::{Coord, Diff, Instruction, LegalMoves, Path, Shape};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speculation {
    ball: Coord,
    stones: BTreeSet<Coord>,
    legal_moves: LegalMoves,
    /// Stones taken by each staged segment, in order.
    removed_segments: Vec<Vec<Coord>>,
    /// Squares the ball has left during this build, starting square first.
    /// Entry `i` is the take-off point of `removed_segments[i]`.
    visited_steps: Vec<Coord>,
    shape: Shape,
    max_depth: usize,
}

impl Speculation {
    /// Returns an idle speculation mirroring `board`.
    pub fn from_board(board: &BoardState) -> Self {
        Self {
            ball: board.ball(),
            stones: board.stones().clone(),
            legal_moves: board.legal_moves().clone(),
            removed_segments: Vec::new(),
            visited_steps: Vec::new(),
            shape: board.shape(),
            max_depth: board.max_depth(),
        }
    }

    /// Discards staged work and mirrors `board` again.
    pub fn reset(&mut self, board: &BoardState) {
        *self = Self::from_board(board);
    }

    pub fn ball(&self) -> Coord {
        self.ball
    }

    pub fn stones(&self) -> &BTreeSet<Coord> {
        &self.stones
    }

    pub fn legal_moves(&self) -> &LegalMoves {
        &self.legal_moves
    }

    pub fn removed_segments(&self) -> &[Vec<Coord>] {
        &self.removed_segments
    }

    pub fn visited_steps(&self) -> &[Coord] {
        &self.visited_steps
    }

    /// True while no jump is staged.
    pub fn is_idle(&self) -> bool {
        self.visited_steps.is_empty()
    }

    /// True if a stone has been staged that `board` does not have.
    pub fn has_staged_stones(&self, board: &BoardState) -> bool {
        !self.stones.is_subset(board.stones())
    }

    /// Stages a jump to `dest`, or rewinds to `dest` if the ball already
    /// passed through it during this build.
    ///
    /// Returns a move trail on success, a conflict when several multi-jump
    /// paths reach `dest` and none is a single jump, and `None` otherwise.
    pub fn stage_move(&mut self, dest: Coord) -> Option<Diff> {
        if let Some(paths) = self.legal_moves.get(&dest) {
            let Some(path) = preferred_path(paths) else {
                return Some(Diff::single(Instruction::Conflict {
                    dest,
                    paths: paths.clone(),
                }));
            };
            let path = path.clone();
            return Some(self.advance(dest, &path));
        }

        let index = self.visited_steps.iter().position(|&step| step == dest)?;
        Some(self.rewind(index))
    }

    /// Stages a jump to `dest` along an explicitly chosen `path`, as offered
    /// by a conflict. Returns `None` if `path` does not reach `dest`.
    pub fn stage_path(&mut self, dest: Coord, path: &[Coord]) -> Option<Diff> {
        let known = self
            .legal_moves
            .get(&dest)?
            .iter()
            .any(|candidate| candidate.as_slice() == path);
        if !known {
            return None;
        }
        Some(self.advance(dest, path))
    }

    /// Stages a stone at `coord` and refreshes the shadow legal moves.
    /// Returns `None` if the cell holds a stone or the ball.
    pub fn stage_placement(&mut self, coord: Coord) -> Option<Diff> {
        if coord == self.ball || !self.stones.insert(coord) {
            return None;
        }
        self.refresh();
        Some(Diff::single(Instruction::Added {
            coords: vec![coord],
        }))
    }

    /// Writes the staged move into `board` and returns to idle.
    /// Returns `None` if nothing was staged.
    pub fn confirm(&mut self, board: &mut BoardState) -> Option<Diff> {
        let new_stones: Vec<Coord> = self.stones.difference(board.stones()).copied().collect();
        if self.removed_segments.is_empty() && new_stones.is_empty() {
            return None;
        }

        let diff = if !new_stones.is_empty() {
            Diff::single(Instruction::Added { coords: new_stones })
        } else {
            let removed = self.removed_segments.iter().flatten().copied().collect();
            Diff {
                instructions: vec![
                    Instruction::BallMovedTo { coord: self.ball },
                    Instruction::MoveTrail {
                        segments: geometry::segments(self.ball, &self.visited_steps),
                    },
                    Instruction::Removed { coords: removed },
                    Instruction::ClearTransient,
                ],
            }
        };

        board.commit(
            self.ball,
            std::mem::take(&mut self.stones),
            std::mem::take(&mut self.legal_moves),
        );
        self.reset(board);
        Some(diff)
    }

    pub fn as_ascii(&self) -> String {
        render_ascii(self.shape, self.ball, &self.stones, &self.legal_moves)
    }

    fn advance(&mut self, dest: Coord, path: &[Coord]) -> Diff {
        let removed = geometry::removed_per_segment(dest, path);
        for coord in removed.iter().flatten() {
            self.stones.remove(coord);
        }
        self.removed_segments.extend(removed);
        self.visited_steps.extend_from_slice(path);
        self.ball = dest;
        self.refresh();
        self.trail()
    }

    fn rewind(&mut self, index: usize) -> Diff {
        self.ball = self.visited_steps[index];
        self.visited_steps.truncate(index);
        for coord in self.removed_segments.drain(index..).flatten() {
            self.stones.insert(coord);
        }
        self.refresh();
        self.trail()
    }

    fn refresh(&mut self) {
        self.legal_moves = movegen::generate(self.ball, &self.stones, self.shape, self.max_depth);
    }

    fn trail(&self) -> Diff {
        Diff::single(Instruction::MoveTrail {
            segments: geometry::segments(self.ball, &self.visited_steps),
        })
    }
}

/// Picks the path to follow when `paths` all reach one destination: the
/// only path if there is one, else the single-jump path if one exists.
/// `None` means the choice is ambiguous and must come from the caller.
pub fn preferred_path(paths: &[Path]) -> Option<&Path> {
    match paths {
        [only] => Some(only),
        _ => paths.iter().find(|path| path.len() == 1),
    }
}
