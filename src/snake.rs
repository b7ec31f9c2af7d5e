use crate::{Cell, GRID_RADIUS};
use Direction::*;

/// Heading of the snake. `Stationary` is the heading before the first key
/// press and after a restart.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Stationary,
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Stationary => Stationary,
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self != Stationary && self.opposite() == other
    }

    /// Grid delta for one step; y grows upward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Stationary => (0, 0),
            Up => (0, 1),
            Down => (0, -1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn moved(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }

    pub fn in_bounds(self) -> bool {
        self.x.abs() <= GRID_RADIUS && self.y.abs() <= GRID_RADIUS
    }
}

pub struct Snake {
    body: Vec<Cell>,
}

impl Snake {
    pub fn new(head: Cell) -> Self {
        Snake { body: vec![head] }
    }

    /// Segments, head first.
    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Puts the head somewhere else without touching the rest of the body.
    pub fn set_head(&mut self, cell: Cell) {
        self.body[0] = cell;
    }

    /// True if `cell` is taken by any segment other than the head. The tail
    /// counts even though it is about to move.
    pub fn hits_body(&self, cell: Cell) -> bool {
        self.body[1..].iter().rev().any(|seg| *seg == cell)
    }

    /// Shifts every segment behind the head one place forward, with the first
    /// one landing on `old_head`. When `grow` is set the old tail stays put as
    /// a new last segment.
    pub fn drag_body(&mut self, old_head: Cell, grow: bool) {
        self.body.insert(1, old_head);
        if !grow {
            self.body.pop();
        }
    }

    pub fn reset(&mut self, head: Cell) {
        self.body.truncate(1);
        self.body[0] = head;
    }
}
