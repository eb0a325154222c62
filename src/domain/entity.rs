/// Entities: Player, Wall, Token (prize or trap), Decoy.
///
/// Geometry is fixed at generation. The only mutable state is the
/// player's position/steps and the active flags, and those flags only move
/// from active to consumed (Replay is the single way back).

use serde::Serialize;

use super::geometry::{Point, Rect};

/// Cardinal movement direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Down, Direction::Up];

    /// Unit vector in cells (screen y grows downward).
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

/// How many cells a single move covers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stride {
    Single,
    Double,
}

impl Stride {
    pub fn cells(self) -> i32 {
        match self {
            Stride::Single => 1,
            Stride::Double => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Point,
    pub steps: u32,        // every move attempt, accepted or not
    pub facing: Direction, // last attempted direction
}

impl Player {
    pub fn new(pos: Point) -> Self {
        Player {
            pos,
            steps: 0,
            facing: Direction::Right,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WallOrientation {
    Vertical,   // narrow, tall: on the right edge of its cell
    Horizontal, // wide, short: on the bottom edge of its cell
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Wall {
    pub rect: Rect,
    pub orientation: WallOrientation,
    pub col: i32,
    pub row: i32,
}

/// Active/consumed state of a prize or trap.
///
/// A consumed token remembers only its anchor; Replay rebuilds the
/// rectangle at the board's token size.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenState {
    Active(Rect),
    Consumed { anchor: Point },
}

/// A prize or a trap. Both share the same lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub state: TokenState,
}

impl Token {
    pub fn new(rect: Rect) -> Self {
        Token { state: TokenState::Active(rect) }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TokenState::Active(_))
    }

    pub fn anchor(&self) -> Point {
        match self.state {
            TokenState::Active(r) => r.anchor(),
            TokenState::Consumed { anchor } => anchor,
        }
    }

    /// Active and geometrically containing `p`.
    pub fn covers(&self, p: Point) -> bool {
        match self.state {
            TokenState::Active(r) => r.contains(p),
            TokenState::Consumed { .. } => false,
        }
    }

    /// Consume the token. Returns false if it was already consumed.
    pub fn consume(&mut self) -> bool {
        match self.state {
            TokenState::Active(r) => {
                self.state = TokenState::Consumed { anchor: r.anchor() };
                true
            }
            TokenState::Consumed { .. } => false,
        }
    }

    /// Reactivate at full size. Already-active tokens are reset too.
    pub fn restore(&mut self, size: i32) {
        self.state = TokenState::Active(Rect::square(self.anchor(), size));
    }
}

/// The fake coin: looks like a prize, is boolean-active, and can be disarmed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Decoy {
    pub rect: Rect,
    pub active: bool,
}

impl Decoy {
    pub fn new(rect: Rect) -> Self {
        Decoy { rect, active: true }
    }

    pub fn covers(&self, p: Point) -> bool {
        self.active && self.rect.contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lifecycle() {
        let mut t = Token::new(Rect::new(75, 15, 15, 15));
        assert!(t.covers(Point::new(75, 15)));
        assert!(t.consume());
        assert!(!t.is_active());
        assert!(!t.covers(Point::new(75, 15)));
        assert_eq!(t.anchor(), Point::new(75, 15));

        // Second consume is a no-op
        assert!(!t.consume());

        t.restore(15);
        assert_eq!(t.state, TokenState::Active(Rect::new(75, 15, 15, 15)));
    }

    #[test]
    fn inactive_decoy_covers_nothing() {
        let mut d = Decoy::new(Rect::new(195, 135, 15, 15));
        assert!(d.covers(Point::new(195, 135)));
        d.active = false;
        assert!(!d.covers(Point::new(195, 135)));
    }

    #[test]
    fn strides() {
        assert_eq!(Stride::Single.cells(), 1);
        assert_eq!(Stride::Double.cells(), 2);
        assert_eq!(Direction::Up.unit(), (0, -1));
    }
}
