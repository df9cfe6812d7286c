use ::common::{CatalogEntry, ResourceEntry, ScoringRequest};
use async_trait::async_trait;
use session::ApiError;
use session::api::{GameApi, GameResult, LeaderboardEntry, ScoreUpdate, StartedGame};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{sample_catalog, score_after};

pub const MOCK_GAME_ID: &str = "6f1c2a9e-3b7d-4e0a-9c55-2d8f1e4b7a10";

/// In-process backend that keeps one game's score the way the real one does.
pub struct MockGameApi {
    catalog: Vec<CatalogEntry>,
    start_score: i32,
    start_time: u32,
    score: Mutex<i32>,
    submissions: Mutex<Vec<ScoringRequest>>,
    end_calls: AtomicUsize,
    pub fail_scoring: AtomicBool,
    pub fail_end: AtomicBool,
    pub fail_resources: AtomicBool,
}

impl MockGameApi {
    pub fn new() -> Self {
        MockGameApi {
            catalog: sample_catalog(),
            start_score: 0,
            start_time: 60,
            score: Mutex::new(0),
            submissions: Mutex::new(Vec::new()),
            end_calls: AtomicUsize::new(0),
            fail_scoring: AtomicBool::new(false),
            fail_end: AtomicBool::new(false),
            fail_resources: AtomicBool::new(false),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_start(mut self, score: i32, time_remaining: u32) -> Self {
        self.start_score = score;
        self.start_time = time_remaining;
        self
    }

    pub fn failing_scoring(self) -> Self {
        self.fail_scoring.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_end(self) -> Self {
        self.fail_end.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_resources(self) -> Self {
        self.fail_resources.store(true, Ordering::SeqCst);
        self
    }

    pub fn submissions(&self) -> Vec<ScoringRequest> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn score(&self) -> i32 {
        *self.score.lock().unwrap()
    }

    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    fn unavailable(endpoint: &str) -> ApiError {
        ApiError::Status {
            endpoint: endpoint.to_string(),
            status: 503,
            body: "backend unavailable".to_string(),
        }
    }
}

#[async_trait]
impl GameApi for MockGameApi {
    async fn start_game(&self, _player_id: &str) -> Result<StartedGame, ApiError> {
        *self.score.lock().unwrap() = self.start_score;
        Ok(StartedGame {
            game_id: MOCK_GAME_ID.to_string(),
            score: self.start_score,
            time_remaining: self.start_time,
        })
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_resources(&self) -> Result<Vec<ResourceEntry>, ApiError> {
        if self.fail_resources.load(Ordering::SeqCst) {
            return Err(Self::unavailable("game/resources/"));
        }
        Ok(vec![ResourceEntry {
            id: Some(1),
            name: "Background".to_string(),
            kind: "background".to_string(),
            description: None,
            image: "background.jpg".to_string(),
        }])
    }

    async fn submit_score(&self, _game_id: &str, request: ScoringRequest) -> Result<ScoreUpdate, ApiError> {
        self.submissions.lock().unwrap().push(request);
        if self.fail_scoring.load(Ordering::SeqCst) {
            return Err(Self::unavailable("game/update/"));
        }
        let mut score = self.score.lock().unwrap();
        *score = score_after(*score, request.action, request.repurpose);
        Ok(ScoreUpdate {
            score: *score,
            time_remaining: self.start_time as i32,
            is_game_over: false,
        })
    }

    async fn end_game(&self, _game_id: &str) -> Result<GameResult, ApiError> {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_end.load(Ordering::SeqCst) {
            return Err(Self::unavailable("game/end/"));
        }
        Ok(GameResult {
            score: self.score(),
            time_played: self.start_time as f64,
        })
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        Ok(Vec::new())
    }
}
