use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// +1.0 when travelling towards larger coordinates, -1.0 otherwise.
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Right | Direction::Down => 1.0,
            Direction::Left | Direction::Up => -1.0,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn step(&self, direction: Direction, distance: f32) -> Position {
        if direction.is_horizontal() {
            Position::new(self.x + direction.sign() * distance, self.y)
        } else {
            Position::new(self.x, self.y + direction.sign() * distance)
        }
    }
}

/// Axis-aligned rectangle with exclusive bounds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Rect {
    pub const fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Rect { x_min, x_max, y_min, y_max }
    }

    /// Strict containment, so two rectangles sharing an edge never both match.
    pub fn contains(&self, point: &Position) -> bool {
        self.x_min < point.x && point.x < self.x_max && self.y_min < point.y && point.y < self.y_max
    }

    pub fn center(&self) -> Position {
        Position::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }

    pub fn clamp(&self, point: Position) -> Position {
        Position::new(
            point.x.clamp(self.x_min, self.x_max),
            point.y.clamp(self.y_min, self.y_max),
        )
    }
}
