use serde::{Deserialize, Serialize};

use crate::{
    Direction, FIELD_HEIGHT, FIELD_WIDTH, FoodItem, FoodItemId, PICKUP_RADIUS, PLAYER_START_X,
    PLAYER_START_Y, Position, Rect,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    /// Centre of the player sprite.
    pub position: Position,
    pub carried: Option<FoodItem>,
    pub facing: Direction,
    /// Seconds until the DIY station accepts another repurpose.
    pub repurpose_cooldown: u32,
}

impl PlayerState {
    pub fn new(position: Position) -> Self {
        PlayerState {
            position,
            carried: None,
            facing: Direction::Down,
            repurpose_cooldown: 0,
        }
    }

    pub fn is_carrying(&self) -> bool {
        self.carried.is_some()
    }

    /// Move one step, staying inside `bounds`. Facing follows the input even
    /// when the player is pinned against an edge.
    pub fn step(&mut self, direction: Direction, distance: f32, bounds: &Rect) -> Position {
        self.facing = direction;
        self.position = bounds.clamp(self.position.step(direction, distance));
        self.position
    }

    /// The closest item whose centre is strictly within pickup range.
    pub fn nearest_in_range<'a>(&self, items: &'a [FoodItem]) -> Option<&'a FoodItem> {
        items
            .iter()
            .map(|item| (item, self.position.distance_to(&item.center())))
            .filter(|(_, distance)| *distance < PICKUP_RADIUS)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(item, _)| item)
    }

    pub fn carried_id(&self) -> Option<FoodItemId> {
        self.carried.as_ref().map(|item| item.id)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState::new(Position::new(PLAYER_START_X, PLAYER_START_Y))
    }
}

/// The area the player may walk in.
pub fn play_field() -> Rect {
    Rect::new(0.0, FIELD_WIDTH, 0.0, FIELD_HEIGHT)
}
