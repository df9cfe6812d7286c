use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::{Direction, FoodItem, Position};

/// One straight, directed leg of the conveyor belt.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub start: Position,
    pub end: Position,
    pub direction: Direction,
}

impl PathSegment {
    pub const fn new(start: Position, end: Position, direction: Direction) -> Self {
        PathSegment { start, end, direction }
    }

    /// Compares x on horizontal legs and y on vertical ones.
    fn is_past_end(&self, position: &Position) -> bool {
        match self.direction {
            Direction::Right => position.x >= self.end.x,
            Direction::Left => position.x <= self.end.x,
            Direction::Down => position.y >= self.end.y,
            Direction::Up => position.y <= self.end.y,
        }
    }

    pub fn contains(&self, position: &Position) -> bool {
        let (x_min, x_max) = (self.start.x.min(self.end.x), self.start.x.max(self.end.x));
        let (y_min, y_max) = (self.start.y.min(self.end.y), self.start.y.max(self.end.y));
        position.x >= x_min && position.x <= x_max && position.y >= y_min && position.y <= y_max
    }

    fn validate(&self, index: usize) -> Result<()> {
        let (along, across) = if self.direction.is_horizontal() {
            (self.end.x - self.start.x, self.end.y - self.start.y)
        } else {
            (self.end.y - self.start.y, self.end.x - self.start.x)
        };
        if across != 0.0 {
            bail!("Belt segment {} is not axis-aligned with its direction {:?}", index, self.direction);
        }
        if along == 0.0 || along.signum() != self.direction.sign() {
            bail!("Belt segment {} does not run in direction {:?}", index, self.direction);
        }
        Ok(())
    }
}

/// What happened to an item during one transport step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeltStep {
    Moved,
    NextSegment,
    ReachedEnd,
}

/// The fixed route items travel along. Read-only once built.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawBeltPath")]
pub struct BeltPath {
    segments: Vec<PathSegment>,
}

/// Unchecked wire form; deserialization goes through [`BeltPath::new`].
#[derive(Deserialize)]
struct RawBeltPath {
    segments: Vec<PathSegment>,
}

impl TryFrom<RawBeltPath> for BeltPath {
    type Error = anyhow::Error;

    fn try_from(raw: RawBeltPath) -> Result<Self> {
        BeltPath::new(raw.segments)
    }
}

impl BeltPath {
    pub fn new(segments: Vec<PathSegment>) -> Result<Self> {
        if segments.is_empty() {
            bail!("Belt path needs at least one segment");
        }
        for (index, segment) in segments.iter().enumerate() {
            segment.validate(index)?;
        }
        for (index, pair) in segments.windows(2).enumerate() {
            if pair[0].end != pair[1].start {
                bail!("Belt segments {} and {} are not connected", index, index + 1);
            }
        }
        Ok(BeltPath { segments })
    }

    /// The route used by the game: across the top, down, back along the
    /// second row, then down the left edge.
    pub fn default_route() -> Self {
        BeltPath {
            segments: vec![
                PathSegment::new(Position::new(0.0, 100.0), Position::new(900.0, 100.0), Direction::Right),
                PathSegment::new(Position::new(900.0, 100.0), Position::new(900.0, 220.0), Direction::Down),
                PathSegment::new(Position::new(900.0, 220.0), Position::new(60.0, 220.0), Direction::Left),
                PathSegment::new(Position::new(60.0, 220.0), Position::new(60.0, 640.0), Direction::Down),
            ],
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn start(&self) -> Position {
        self.segments[0].start
    }

    /// Move `item` by `speed` along its current segment. Crossing a segment end
    /// snaps the item to the next segment's start.
    pub fn advance(&self, item: &mut FoodItem, speed: f32) -> BeltStep {
        let Some(segment) = self.segments.get(item.segment) else {
            return BeltStep::ReachedEnd;
        };

        let moved = item.position.step(segment.direction, speed);
        if !segment.is_past_end(&moved) {
            item.position = moved;
            return BeltStep::Moved;
        }

        match self.segments.get(item.segment + 1) {
            Some(next) => {
                item.segment += 1;
                item.position = next.start;
                BeltStep::NextSegment
            }
            None => {
                item.position = segment.end;
                BeltStep::ReachedEnd
            }
        }
    }
}

impl Default for BeltPath {
    fn default() -> Self {
        BeltPath::default_route()
    }
}
