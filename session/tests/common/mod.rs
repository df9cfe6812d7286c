#![allow(dead_code)]

pub mod mock_api;
pub mod mock_backend;

pub use mock_api::{MOCK_GAME_ID, MockGameApi};
pub use mock_backend::MockBackend;

use ::common::{CatalogEntry, Difficulty, ScoringAction};
use anyhow::Result;
use session::SessionConfig;
use url::Url;

/// Backend scoring rule: correct +10, repurpose +15, incorrect -5, never below zero.
pub fn score_after(score: i32, action: ScoringAction, repurpose: bool) -> i32 {
    let delta = match (action, repurpose) {
        (ScoringAction::Correct, true) => 15,
        (ScoringAction::Correct, false) => 10,
        (ScoringAction::Incorrect, _) => -5,
    };
    (score + delta).max(0)
}

pub fn entry(id: i64, name: &str, category: &str, diy: Option<bool>) -> CatalogEntry {
    CatalogEntry {
        id: Some(id),
        name: name.to_string(),
        category: category.to_string(),
        image: format!("{}.png", name.to_lowercase().replace(' ', "_")),
        description: None,
        diy_option: diy,
        greenhouse_emission: None,
    }
}

pub fn sample_catalog() -> Vec<CatalogEntry> {
    vec![
        entry(1, "Apple", "food bank", Some(false)),
        entry(2, "Banana Peel", "green waste bin", Some(true)),
        entry(3, "Wrapper", "trash", Some(false)),
    ]
}

pub fn food_bank_catalog() -> Vec<CatalogEntry> {
    vec![entry(1, "Apple", "food bank", Some(false))]
}

pub fn test_config(difficulty: Difficulty) -> Result<SessionConfig> {
    let mut config = SessionConfig::new(Url::parse("http://backend.test/api/")?, "tester");
    config.difficulty = difficulty;
    config.seed = Some(7);
    Ok(config)
}
