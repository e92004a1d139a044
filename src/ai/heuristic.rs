//! Rule-of-thumb computer player.
//!
//! It only reads the board and experiments on a private [`Speculation`];
//! the chosen move is played by [`crate::game::GameInstance::do_ai_move`].

use tracing::debug;

use crate::board::BoardState;
use crate::game::{AiMove, MoveSelector};
use crate::speculation::Speculation;
use crate::types::{Coord, Shape, Side};

/// Rows gained by the opponent before a jump counts as a threat.
const THREAT_JUMP: i32 = 6;

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicSelector;

impl MoveSelector for HeuristicSelector {
    fn select_move(&self, board: &BoardState, side: Side) -> Option<AiMove> {
        let shape = board.shape();
        let ball = board.ball();
        let ours = |c: Coord| goal_distance(side, c, shape);
        let theirs = |c: Coord| goal_distance(side.opponent(), c, shape);
        let legal = board.legal_moves();

        let Some(best) = legal.keys().copied().min_by_key(|&c| ours(c)) else {
            debug!("no jump available, placing a stone ahead of the ball");
            return free_cell_toward(board, ball, side).map(AiMove::Play);
        };
        if ours(best) <= 0 {
            debug!(?best, "winning jump");
            return Some(AiMove::Move(best));
        }

        let threat = legal.keys().copied().min_by_key(|&c| theirs(c))?;
        let gain = theirs(ball) - theirs(threat);
        if gain >= THREAT_JUMP && theirs(threat) < gain {
            debug!(?threat, gain, "opponent threatens a long jump");

            let counter = ours(ball) - ours(best);
            if counter >= THREAT_JUMP && ours(best) < theirs(threat) {
                debug!(?best, "counter-jump");
                return Some(AiMove::Move(best));
            }
            if let Some(cell) = parity_block(board, side, threat) {
                debug!(?cell, "flipping parity of the opponent's route");
                return Some(AiMove::Play(cell));
            }
        }

        let anchor = if ours(ball) < ours(best) { ball } else { best };
        debug!(?anchor, "advancing with a stone");
        free_cell_toward(board, anchor, side)
            .or_else(|| free_cell_toward(board, ball, side))
            .map(AiMove::Play)
    }
}

/// Rows the ball at `coord` still has to cover to reach `side`'s goal.
/// Zero or less means it is already there.
fn goal_distance(side: Side, coord: Coord, shape: Shape) -> i32 {
    match side {
        Side::Bottom => coord.y - 1,
        Side::Top => shape.height - 2 - coord.y,
    }
}

/// Tries a stone on every intermediate stop of the opponent's route to
/// `threat` and returns the one that most shortens their best jump.
fn parity_block(board: &BoardState, side: Side, threat: Coord) -> Option<Coord> {
    let shape = board.shape();
    let theirs = |c: Coord| goal_distance(side.opponent(), c, shape);
    let route = board.legal_moves().get(&threat)?.first()?;

    let mut spec = Speculation::from_board(board);
    let mut best: Option<Coord> = None;
    let mut best_distance = theirs(threat);

    for &stop in route.iter().skip(1) {
        if spec.stage_placement(stop).is_some() {
            let distance = spec
                .legal_moves()
                .keys()
                .map(|&c| theirs(c))
                .min()
                .unwrap_or_else(|| theirs(board.ball()));
            if distance > best_distance {
                best_distance = distance;
                best = Some(stop);
            }
        }
        spec.reset(board);
    }

    best
}

/// First empty in-grid cell stepping from `from` toward `side`'s goal.
fn free_cell_toward(board: &BoardState, from: Coord, side: Side) -> Option<Coord> {
    let dy = match side {
        Side::Bottom => -1,
        Side::Top => 1,
    };
    let shape = board.shape();
    let mut cell = from.offset(0, dy);
    while shape.contains(cell) {
        if !board.is_occupied(cell) {
            return Some(cell);
        }
        cell = cell.offset(0, dy);
    }
    None
}
