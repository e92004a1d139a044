use std::collections::BTreeSet;

use crate::geometry::DIRECTIONS;
use crate::types::{Coord, LegalMoves, Path, Shape};

/// Longest jump chain followed by default.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// A landing square waiting to be recorded and expanded.
struct Landing {
    dest: Coord,
    path: Path,
    stones: BTreeSet<Coord>,
    depth: usize,
}

/// Returns every destination reachable from `ball` by one or more jumps,
/// with all paths that reach it.
///
/// Each branch owns its own copy of the stone set. Paths to one destination
/// are listed in depth-first order. A node at depth `d` (the ball itself is
/// depth 1) is expanded only while `d <= max_depth`; deeper chains are
/// dropped without notice. `shape` is not used to filter destinations, so a
/// landing past the goal line is a legal (winning) move.
pub fn generate(
    ball: Coord,
    stones: &BTreeSet<Coord>,
    _shape: Shape,
    max_depth: usize,
) -> LegalMoves {
    let mut legal = LegalMoves::new();
    if max_depth == 0 {
        return legal;
    }

    let mut stack = Vec::new();
    push_landings(&mut stack, ball, &Vec::new(), stones, 2);

    while let Some(Landing {
        dest,
        path,
        stones,
        depth,
    }) = stack.pop()
    {
        legal.entry(dest).or_default().push(path.clone());
        if depth <= max_depth {
            push_landings(&mut stack, dest, &path, &stones, depth + 1);
        }
    }

    legal
}

/// Pushes the landings reachable by a single jump from `from`. They go on the
/// stack in reverse direction order so they pop in direction order.
fn push_landings(
    stack: &mut Vec<Landing>,
    from: Coord,
    path: &Path,
    stones: &BTreeSet<Coord>,
    depth: usize,
) {
    let mut next_path = path.clone();
    next_path.push(from);

    for &(dx, dy) in DIRECTIONS.iter().rev() {
        let mut cell = from.offset(dx, dy);
        if !stones.contains(&cell) {
            continue;
        }

        let mut branch = stones.clone();
        while branch.remove(&cell) {
            cell = cell.offset(dx, dy);
        }

        stack.push(Landing {
            dest: cell,
            path: next_path.clone(),
            stones: branch,
            depth,
        });
    }
}
