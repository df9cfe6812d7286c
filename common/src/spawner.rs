use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Catalog, DEFAULT_REPURPOSABLE_CHANCE, FoodCategory, FoodItem, FoodItemId, MAX_LIVE_ITEMS,
    Position, PseudoRandom,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn spawn_interval_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 3000,
            Difficulty::Normal => 2000,
            Difficulty::Hard => 1200,
        }
    }

    /// Belt distance covered per transport tick, in pixels.
    pub fn belt_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 3.0,
            Difficulty::Normal => 5.0,
            Difficulty::Hard => 7.0,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(anyhow::anyhow!("Unknown difficulty '{}'", other)),
        }
    }
}

/// Creates belt items from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawner {
    rng: PseudoRandom,
    next_id: u64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Spawner {
            rng: PseudoRandom::new(seed),
            next_id: 1,
        }
    }

    /// Pick a random catalog entry and place it at `start`, unless the belt is
    /// already full or there is nothing to pick from.
    pub fn spawn(&mut self, catalog: &Catalog, start: Position, live_count: usize) -> Option<FoodItem> {
        if live_count >= MAX_LIVE_ITEMS || catalog.is_empty() {
            return None;
        }

        let definition = catalog.get(self.rng.next_index(catalog.len()))?;
        let repurposable = match definition.repurposable {
            Some(flag) => flag,
            None if definition.category == FoodCategory::Trash => false,
            None => self.rng.chance(DEFAULT_REPURPOSABLE_CHANCE),
        };

        let id = FoodItemId(self.next_id);
        self.next_id += 1;
        debug!("Spawning {} ({:?}) as item {}", definition.name, definition.category, id);

        Some(FoodItem {
            id,
            name: definition.name.clone(),
            image: definition.image.clone(),
            category: definition.category,
            repurposable,
            position: start,
            segment: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FoodDefinition;

    fn definition(name: &str, category: FoodCategory, repurposable: Option<bool>) -> FoodDefinition {
        FoodDefinition {
            name: name.to_string(),
            image: format!("{}.png", name),
            category,
            repurposable,
        }
    }

    #[test]
    fn respects_live_item_cap() {
        let catalog = Catalog { entries: vec![definition("Apple", FoodCategory::FoodBank, Some(false))] };
        let mut spawner = Spawner::new(1);
        assert!(spawner.spawn(&catalog, Position::default(), MAX_LIVE_ITEMS).is_none());
        assert!(spawner.spawn(&catalog, Position::default(), MAX_LIVE_ITEMS - 1).is_some());
    }

    #[test]
    fn empty_catalog_spawns_nothing() {
        let mut spawner = Spawner::new(1);
        assert!(spawner.spawn(&Catalog::default(), Position::default(), 0).is_none());
    }

    #[test]
    fn ids_are_unique_and_start_at_path_start() {
        let catalog = Catalog { entries: vec![definition("Apple", FoodCategory::FoodBank, Some(true))] };
        let mut spawner = Spawner::new(9);
        let start = Position::new(0.0, 100.0);
        let a = spawner.spawn(&catalog, start, 0).unwrap();
        let b = spawner.spawn(&catalog, start, 1).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.position, start);
        assert_eq!(a.segment, 0);
        assert!(a.repurposable);
    }

    #[test]
    fn missing_flag_never_makes_trash_repurposable() {
        let catalog = Catalog { entries: vec![definition("Wrapper", FoodCategory::Trash, None)] };
        let mut spawner = Spawner::new(3);
        for _ in 0..200 {
            let item = spawner.spawn(&catalog, Position::default(), 0).unwrap();
            assert!(!item.repurposable);
        }
    }

    #[test]
    fn missing_flag_is_sometimes_repurposable() {
        let catalog = Catalog { entries: vec![definition("Peel", FoodCategory::GreenWaste, None)] };
        let mut spawner = Spawner::new(11);
        let repurposable = (0..1000)
            .filter_map(|_| spawner.spawn(&catalog, Position::default(), 0))
            .filter(|item| item.repurposable)
            .count();
        assert!((150..450).contains(&repurposable), "got {}", repurposable);
    }

    #[test]
    fn harder_is_faster() {
        assert!(Difficulty::Hard.spawn_interval_ms() < Difficulty::Easy.spawn_interval_ms());
        assert!(Difficulty::Hard.belt_speed() > Difficulty::Easy.belt_speed());
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
