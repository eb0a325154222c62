/// Integer world-space geometry: points and axis-aligned rectangles.

use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn square(anchor: Point, side: i32) -> Self {
        Rect::new(anchor.x, anchor.y, side, side)
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Half-open containment: the left/top edges are inside, the
    /// right/bottom edges are not. An empty rectangle contains nothing.
    pub fn contains(&self, p: Point) -> bool {
        self.w > 0
            && self.h > 0
            && p.x >= self.x
            && p.x < self.x + self.w
            && p.y >= self.y
            && p.y < self.y + self.h
    }

    pub fn end_x(&self) -> i32 {
        self.x + self.w
    }

    pub fn end_y(&self) -> i32 {
        self.y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(15, 15, 15, 15);
        assert!(r.contains(Point::new(15, 15)));
        assert!(r.contains(Point::new(29, 29)));
        assert!(!r.contains(Point::new(30, 15)));
        assert!(!r.contains(Point::new(15, 30)));
        assert!(!r.contains(Point::new(14, 20)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let r = Rect::new(0, 0, 0, 0);
        assert!(!r.contains(Point::new(0, 0)));
    }
}
