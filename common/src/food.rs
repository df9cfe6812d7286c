use serde::{Deserialize, Serialize};

use crate::{FoodCategory, Position, FOOD_SIZE};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodItemId(pub u64);

impl std::fmt::Display for FoodItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spawned food item. Lives either on the belt or in the player's hands.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoodItem {
    pub id: FoodItemId,
    pub name: String,
    pub image: String,
    pub category: FoodCategory,
    pub repurposable: bool,
    /// Top-left corner of the sprite.
    pub position: Position,
    pub segment: usize,
}

impl FoodItem {
    pub fn center(&self) -> Position {
        Position::new(
            self.position.x + FOOD_SIZE / 2.0,
            self.position.y + FOOD_SIZE / 2.0,
        )
    }
}
