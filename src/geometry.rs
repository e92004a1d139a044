use crate::types::{Coord, Segment};

/// Unit steps tried by the move search, in this order.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Returns the cells strictly between `start` and `end` on a straight line.
/// These are the stones jumped by a segment.
pub fn cells_between(start: Coord, end: Coord) -> Vec<Coord> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return Vec::new();
    }

    let (sx, sy) = (dx.signum(), dy.signum());
    (1..steps).map(|i| start.offset(sx * i, sy * i)).collect()
}

/// Stones removed by each segment of a path that ends at `dest`.
pub fn removed_per_segment(dest: Coord, steps: &[Coord]) -> Vec<Vec<Coord>> {
    segments(dest, steps)
        .into_iter()
        .map(|seg| cells_between(seg.from, seg.to))
        .collect()
}

/// Pairs consecutive stops, closing the last one onto `dest`.
pub fn segments(dest: Coord, steps: &[Coord]) -> Vec<Segment> {
    let mut out: Vec<Segment> = steps
        .windows(2)
        .map(|pair| Segment {
            from: pair[0],
            to: pair[1],
        })
        .collect();
    if let Some(&last) = steps.last() {
        out.push(Segment {
            from: last,
            to: dest,
        });
    }
    out
}
