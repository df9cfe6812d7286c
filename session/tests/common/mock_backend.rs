use ::common::{CatalogEntry, ScoringAction};
use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use session::api::{EndGameRequest, StartGameRequest, UpdateGameRequest};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

use super::{sample_catalog, score_after};

struct BackendGame {
    player_id: String,
    score: i32,
    time_remaining: i32,
    started: std::time::Instant,
    ended: bool,
}

#[derive(Default)]
pub struct BackendState {
    catalog: Vec<CatalogEntry>,
    games: Mutex<HashMap<String, BackendGame>>,
    updates: Mutex<Vec<UpdateGameRequest>>,
    pub fail_updates: AtomicBool,
    pub garbled_resources: AtomicBool,
}

impl BackendState {
    pub fn updates(&self) -> Vec<UpdateGameRequest> {
        self.updates.lock().unwrap().clone()
    }

    pub fn game_score(&self, game_id: &str) -> Option<i32> {
        self.games.lock().unwrap().get(game_id).map(|game| game.score)
    }

    pub fn is_ended(&self, game_id: &str) -> bool {
        self.games
            .lock()
            .unwrap()
            .get(game_id)
            .is_some_and(|game| game.ended)
    }
}

/// Axum stand-in for the game backend, listening on an ephemeral local port.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(BackendState {
            catalog: sample_catalog(),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/game/start/", post(start_game))
            .route("/api/game/food-items/", get(food_items))
            .route("/api/game/resources/", get(resources))
            .route("/api/game/update/", post(update_game))
            .route("/api/game/end/", post(end_game))
            .route("/api/game/leaderboard/", get(leaderboard))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(MockBackend { addr, state, handle })
    }

    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}/api/", self.addr))?)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_game(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<StartGameRequest>,
) -> Response {
    let game_id = Uuid::new_v4().to_string();
    let mut games = state.games.lock().unwrap();
    games.insert(
        game_id.clone(),
        BackendGame {
            player_id: body.player_id,
            score: 0,
            time_remaining: 60,
            started: std::time::Instant::now(),
            ended: false,
        },
    );
    Json(json!({"game_id": game_id, "score": 0, "time_remaining": 60})).into_response()
}

async fn food_items(State(state): State<Arc<BackendState>>) -> Response {
    Json(json!({"food_items": state.catalog, "count": state.catalog.len()})).into_response()
}

async fn resources(State(state): State<Arc<BackendState>>) -> Response {
    if state.garbled_resources.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    Json(json!({
        "status": "success",
        "count": 2,
        "resources": [
            {"id": 1, "name": "Background", "type": "background", "description": "Game background image", "image": "background.jpg"},
            {"id": 2, "name": "Pickup", "type": "sound", "image": "pickup.mp3"}
        ]
    }))
    .into_response()
}

async fn update_game(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<UpdateGameRequest>,
) -> Response {
    if state.fail_updates.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database is down").into_response();
    }
    state.updates.lock().unwrap().push(body.clone());

    let mut games = state.games.lock().unwrap();
    let Some(game) = games.get_mut(&body.game_id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Game not found"}))).into_response();
    };
    let repurpose = body.diy_option.unwrap_or(false) && body.action == ScoringAction::Correct;
    game.score = score_after(game.score, body.action, repurpose);
    game.time_remaining = (game.time_remaining - 1).max(0);

    Json(json!({
        "score": game.score,
        "time_remaining": game.time_remaining,
        "is_game_over": game.time_remaining <= 0,
    }))
    .into_response()
}

async fn end_game(State(state): State<Arc<BackendState>>, Json(body): Json<EndGameRequest>) -> Response {
    let mut games = state.games.lock().unwrap();
    let Some(game) = games.get_mut(&body.game_id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Game not found"}))).into_response();
    };
    game.ended = true;
    Json(json!({"score": game.score, "time_played": game.started.elapsed().as_secs_f64()})).into_response()
}

async fn leaderboard(State(state): State<Arc<BackendState>>) -> Response {
    let games = state.games.lock().unwrap();
    let mut rows: Vec<_> = games
        .values()
        .filter(|game| game.ended)
        .map(|game| json!({"player_id": game.player_id, "score": game.score, "date": "2026-10-18T12:00:00Z"}))
        .collect();
    rows.sort_by_key(|row| std::cmp::Reverse(row["score"].as_i64().unwrap_or_default()));
    Json(rows).into_response()
}
