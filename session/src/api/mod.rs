use async_trait::async_trait;
use common::{CatalogEntry, ResourceEntry, ScoringAction, ScoringRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

mod http;

pub use http::HttpGameApi;

/// Response to `POST game/start/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StartedGame {
    /// Opaque session id; the backend hands out UUID strings.
    pub game_id: String,
    pub score: i32,
    pub time_remaining: u32,
}

/// Response to `POST game/update/`. `score` is the backend's cumulative score.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score: i32,
    pub time_remaining: i32,
    pub is_game_over: bool,
}

/// Response to `POST game/end/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameResult {
    pub score: i32,
    /// Seconds between session start and end as measured by the backend.
    pub time_played: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub score: i32,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StartGameRequest {
    pub player_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UpdateGameRequest {
    pub game_id: String,
    pub action: ScoringAction,
    pub food_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diy_option: Option<bool>,
}

impl UpdateGameRequest {
    pub fn new(game_id: &str, request: &ScoringRequest) -> Self {
        UpdateGameRequest {
            game_id: game_id.to_string(),
            action: request.action,
            food_type: request.category.wire_name().to_string(),
            diy_option: request.repurpose.then_some(true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EndGameRequest {
    pub game_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoodItemsResponse {
    pub food_items: Vec<CatalogEntry>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourcesResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub count: usize,
    pub resources: Vec<ResourceEntry>,
}

/// The backend game-session API.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn start_game(&self, player_id: &str) -> Result<StartedGame, ApiError>;

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError>;

    async fn fetch_resources(&self) -> Result<Vec<ResourceEntry>, ApiError>;

    /// Report one scored event. Never retried by callers.
    async fn submit_score(&self, game_id: &str, request: ScoringRequest) -> Result<ScoreUpdate, ApiError>;

    async fn end_game(&self, game_id: &str) -> Result<GameResult, ApiError>;

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError>;
}
