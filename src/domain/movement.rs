/// Movement & collision resolver — truth-table driven.
///
/// Pure function over the wall list and grid bounds. It decides what a move
/// does; it never touches the player, the score, or the step counter.
///
/// ## Resolution order
/// ┌──────────────────────────────┬──────────────┬──────────────────────┐
/// │ Condition (priority order)    │ Result       │ Penalty              │
/// ├──────────────────────────────┼──────────────┼──────────────────────┤
/// │ destination outside [0,W−s]   │ OffGrid      │ −off_grid_val        │
/// │   or outside [0,H−s]          │              │                      │
/// │ a wall threshold is crossed   │ Blocked      │ −hit_wall_val        │
/// │ otherwise                     │ Accepted     │ 0                    │
/// └──────────────────────────────┴──────────────┴──────────────────────┘
///
/// ## Wall threshold test
/// With `cur` the pre-move position, `new` the destination and the wall's
/// edges `(startX, endX, startY, endY)`:
/// ┌────────┬──────────────────────────┬──────────────────────────┐
/// │ Move   │ Threshold crossed        │ Player inside wall span  │
/// ├────────┼──────────────────────────┼──────────────────────────┤
/// │ dx > 0 │ cur.x ≤ startX ≤ new.x   │ startY ≤ cur.y ≤ endY    │
/// │ dx < 0 │ cur.x ≥ startX ≥ new.x   │ startY ≤ cur.y ≤ endY    │
/// │ dy > 0 │ cur.y ≤ startY ≤ new.y   │ startX ≤ cur.x ≤ endX    │
/// │ dy < 0 │ cur.y ≥ startY ≥ new.y   │ startX ≤ cur.x ≤ endX    │
/// └────────┴──────────────────────────┴──────────────────────────┘
///
/// Only the wall's leading edge is tested, against the player's current
/// coordinate. A double-stride move that starts inside a wall's thickness
/// band passes through it. Front-ends only issue single-axis moves.

use crate::config::{GridSpec, ScoringConfig};

use super::entity::Wall;
use super::geometry::Point;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveResolution {
    Accepted(Point),
    Blocked { penalty: i32 },
    OffGrid { penalty: i32 },
}

impl MoveResolution {
    /// Score delta this resolution carries (0 when accepted).
    pub fn penalty(&self) -> i32 {
        match *self {
            MoveResolution::Accepted(_) => 0,
            MoveResolution::Blocked { penalty } | MoveResolution::OffGrid { penalty } => penalty,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveResolution::Accepted(_))
    }
}

pub fn resolve_move(
    cur: Point,
    (dx, dy): (i32, i32),
    walls: &[Wall],
    grid: &GridSpec,
    scoring: &ScoringConfig,
) -> MoveResolution {
    let new = cur.offset(dx, dy);

    if !grid.in_bounds(new) {
        return MoveResolution::OffGrid { penalty: -scoring.off_grid_val };
    }

    if walls.iter().any(|w| crosses(cur, new, dx, dy, w)) {
        return MoveResolution::Blocked { penalty: -scoring.hit_wall_val };
    }

    MoveResolution::Accepted(new)
}

/// Does the move from `cur` to `new` cross this wall's threshold?
/// See the truth table above.
fn crosses(cur: Point, new: Point, dx: i32, dy: i32, wall: &Wall) -> bool {
    let r = &wall.rect;
    let (start_x, end_x, start_y, end_y) = (r.x, r.end_x(), r.y, r.end_y());
    let in_rows = start_y <= cur.y && cur.y <= end_y;
    let in_cols = start_x <= cur.x && cur.x <= end_x;

    if dx > 0 {
        cur.x <= start_x && start_x <= new.x && in_rows
    } else if dx < 0 {
        cur.x >= start_x && start_x >= new.x && in_rows
    } else if dy > 0 {
        cur.y <= start_y && start_y <= new.y && in_cols
    } else if dy < 0 {
        cur.y >= start_y && start_y >= new.y && in_cols
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::wall_at;
    use crate::domain::entity::WallOrientation;

    fn grid() -> GridSpec {
        GridSpec::default()
    }

    fn resolve(cur: (i32, i32), delta: (i32, i32), walls: &[Wall]) -> MoveResolution {
        resolve_move(Point::new(cur.0, cur.1), delta, walls, &grid(), &ScoringConfig::default())
    }

    #[test]
    fn open_move_is_accepted() {
        assert_eq!(resolve((15, 15), (60, 0), &[]), MoveResolution::Accepted(Point::new(75, 15)));
        assert_eq!(resolve((75, 75), (0, -60), &[]), MoveResolution::Accepted(Point::new(75, 15)));
    }

    #[test]
    fn off_grid_each_edge() {
        let off = MoveResolution::OffGrid { penalty: -5 };
        assert_eq!(resolve((15, 15), (-60, 0), &[]), off);
        assert_eq!(resolve((15, 15), (0, -60), &[]), off);
        assert_eq!(resolve((435, 15), (60, 0), &[]), off);
        assert_eq!(resolve((15, 255), (0, 120), &[]), off);
    }

    #[test]
    fn exact_bounds_are_on_grid() {
        assert_eq!(resolve((450, 240), (0, 60), &[]), MoveResolution::Accepted(Point::new(450, 300)));
        assert_eq!(resolve((390, 300), (60, 0), &[]), MoveResolution::Accepted(Point::new(450, 300)));
    }

    #[test]
    fn vertical_wall_blocks_horizontal_moves() {
        // Wall on the right edge of cell (0,0): x = 55..63, y = 0..60
        let walls = [wall_at(&grid(), 0, 0, WallOrientation::Vertical)];
        assert_eq!(resolve((15, 15), (60, 0), &walls), MoveResolution::Blocked { penalty: -5 });
        assert_eq!(resolve((75, 15), (-60, 0), &walls), MoveResolution::Blocked { penalty: -5 });
        // Different row: free
        assert!(resolve((15, 75), (60, 0), &walls).is_accepted());
        // Moving along the wall: free
        assert!(resolve((15, 15), (0, 60), &walls).is_accepted());
    }

    #[test]
    fn horizontal_wall_blocks_vertical_moves() {
        // Wall on the bottom edge of cell (1,0): x = 60..120, y = 55..63
        let walls = [wall_at(&grid(), 1, 0, WallOrientation::Horizontal)];
        assert_eq!(resolve((75, 15), (0, 60), &walls), MoveResolution::Blocked { penalty: -5 });
        assert_eq!(resolve((75, 75), (0, -60), &walls), MoveResolution::Blocked { penalty: -5 });
        assert!(resolve((15, 15), (0, 60), &walls).is_accepted());
    }

    #[test]
    fn double_stride_hits_wall_in_far_cell() {
        // Wall on the right edge of cell (1,0): startX = 115
        let walls = [wall_at(&grid(), 1, 0, WallOrientation::Vertical)];
        assert_eq!(resolve((15, 15), (120, 0), &walls), MoveResolution::Blocked { penalty: -5 });
    }

    #[test]
    fn off_grid_dominates_wall() {
        // Wall right of cell (7,0) at x = 475; moving right from 435 goes off grid
        let walls = [wall_at(&grid(), 7, 0, WallOrientation::Vertical)];
        assert_eq!(resolve((435, 15), (60, 0), &walls), MoveResolution::OffGrid { penalty: -5 });
        // Bottom-row wall at y = 295 lies in the path of a double stride down
        let walls = [wall_at(&grid(), 0, 4, WallOrientation::Horizontal)];
        assert_eq!(resolve((15, 255), (0, 120), &walls), MoveResolution::OffGrid { penalty: -5 });
    }

    #[test]
    fn first_matching_wall_wins() {
        let g = grid();
        let walls = [
            wall_at(&g, 0, 0, WallOrientation::Vertical),
            wall_at(&g, 0, 0, WallOrientation::Vertical),
        ];
        assert_eq!(resolve((15, 15), (60, 0), &walls).penalty(), -5);
    }

    #[test]
    fn accepted_never_leaves_bounds() {
        let g = grid();
        let walls: Vec<Wall> = (0..8)
            .flat_map(|w| (0..5).map(move |h| (w, h)))
            .filter(|(w, h)| (w + h) % 3 == 0)
            .map(|(w, h)| wall_at(&g, w, h, WallOrientation::Vertical))
            .collect();
        for x in (-45..=555).step_by(15) {
            for y in (-45..=405).step_by(15) {
                for delta in [(60, 0), (-60, 0), (0, 60), (0, -60), (120, 0), (0, -120)] {
                    if let MoveResolution::Accepted(p) = resolve((x, y), delta, &walls) {
                        assert!(g.in_bounds(p), "({x},{y}) + {delta:?} -> {p:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn custom_penalties_are_negated() {
        let scoring = ScoringConfig { off_grid_val: 7, hit_wall_val: 3, ..ScoringConfig::default() };
        let g = grid();
        let walls = [wall_at(&g, 0, 0, WallOrientation::Vertical)];
        let r = resolve_move(Point::new(15, 15), (60, 0), &walls, &g, &scoring);
        assert_eq!(r, MoveResolution::Blocked { penalty: -3 });
        let r = resolve_move(Point::new(15, 15), (-60, 0), &walls, &g, &scoring);
        assert_eq!(r, MoveResolution::OffGrid { penalty: -7 });
    }
}
