use chrono::{DateTime, Utc};
use common::{
    COUNTDOWN_TICK_MS, Catalog, EVENT_LOG_CAPACITY, GameEngine, GameEvent, GameState, PlayerInput,
    ResourceBundle, ScoringRequest, TRANSPORT_TICK_MS,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::GameApi;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::error::SessionError;

/// Final result of a session, published once the countdown runs out.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameSummary {
    pub game_id: String,
    pub player_id: String,
    pub score: i32,
    /// Seconds played.
    pub time_played: f64,
    /// False when the backend could not be reached to end the session and the
    /// score and duration are local figures.
    pub confirmed: bool,
    pub finished_at: DateTime<Utc>,
}

struct Shared {
    engine: Mutex<GameEngine>,
    api: Arc<dyn GameApi>,
    context: SessionContext,
    events: broadcast::Sender<GameEvent>,
    summary_tx: watch::Sender<Option<GameSummary>>,
    started: Instant,
    token: CancellationToken,
    finishing: AtomicBool,
    cooldown_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

/// One running game: the engine plus the spawner, transport and countdown
/// loops that drive it. A cooldown loop runs while the repurpose station recharges.
///
/// Dropping the session cancels every loop.
pub struct GameSession {
    shared: Arc<Shared>,
    summary_rx: watch::Receiver<Option<GameSummary>>,
    tasks: Vec<JoinHandle<()>>,
}

impl GameSession {
    /// Load the catalog and resources, open a backend session and start the
    /// periodic tasks. Must be called inside a tokio runtime.
    pub async fn start(api: Arc<dyn GameApi>, config: &SessionConfig) -> Result<Self, SessionError> {
        let entries = api.fetch_catalog().await.map_err(SessionError::Catalog)?;
        if entries.is_empty() {
            return Err(SessionError::EmptyCatalog);
        }
        let catalog = Catalog::from_entries(&entries);

        let resources = match api.fetch_resources().await {
            Ok(entries) => ResourceBundle::new(entries),
            Err(e) => {
                warn!(error = %e, "Failed to load game resources, continuing without them");
                ResourceBundle::default()
            }
        };

        let started = api
            .start_game(&config.player_id)
            .await
            .map_err(SessionError::Start)?;
        info!(
            game_id = %started.game_id,
            player_id = %config.player_id,
            difficulty = ?config.difficulty,
            "Game session started with {} food items",
            catalog.len()
        );

        let seed = config
            .seed
            .unwrap_or_else(|| Utc::now().timestamp_micros().unsigned_abs());
        let mut state = GameState::new(catalog.clone(), config.difficulty, seed);
        state.score = started.score;
        state.time_remaining = started.time_remaining;

        let context = SessionContext {
            game_id: started.game_id,
            player_id: config.player_id.clone(),
            difficulty: config.difficulty,
            catalog,
            resources,
        };

        Ok(Self::run(api, context, state))
    }

    fn run(api: Arc<dyn GameApi>, context: SessionContext, state: GameState) -> Self {
        let (events, _) = broadcast::channel(EVENT_LOG_CAPACITY);
        let (summary_tx, summary_rx) = watch::channel(None);
        let spawn_interval = Duration::from_millis(context.difficulty.spawn_interval_ms());

        let shared = Arc::new(Shared {
            engine: Mutex::new(GameEngine::new_from_state(state)),
            api,
            context,
            events,
            summary_tx,
            started: Instant::now(),
            token: CancellationToken::new(),
            finishing: AtomicBool::new(false),
            cooldown_task: std::sync::Mutex::new(None),
        });

        let tasks = vec![
            spawn_periodic(&shared, "spawner", spawn_interval, GameEngine::spawn),
            spawn_periodic(&shared, "transport", Duration::from_millis(TRANSPORT_TICK_MS), GameEngine::transport),
            spawn_periodic(&shared, "countdown", Duration::from_millis(COUNTDOWN_TICK_MS), GameEngine::countdown_tick),
        ];

        GameSession {
            shared,
            summary_rx,
            tasks,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.shared.context
    }

    pub fn game_id(&self) -> &str {
        &self.shared.context.game_id
    }

    /// Apply a movement or action input and return the events it produced.
    pub async fn input(&self, input: PlayerInput) -> Vec<GameEvent> {
        let now_ms = self.shared.started.elapsed().as_millis() as i64;
        let events = self.shared.engine.lock().await.handle_input(input, now_ms);
        self.shared.dispatch(&events);
        events
    }

    pub async fn snapshot(&self) -> GameState {
        self.shared.engine.lock().await.state().clone()
    }

    pub async fn snapshot_json(&self) -> anyhow::Result<String> {
        self.shared.engine.lock().await.get_state_json()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.shared.events.subscribe()
    }

    pub fn summary(&self) -> watch::Receiver<Option<GameSummary>> {
        self.summary_rx.clone()
    }

    /// Wait for the countdown to run out and the session-end call to finish.
    pub async fn finished(&self) -> Result<GameSummary, SessionError> {
        let mut rx = self.summary_rx.clone();
        let summary = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SessionError::Closed)?
            .clone();
        summary.ok_or(SessionError::Closed)
    }

    /// True once every periodic task has exited.
    pub fn is_stopped(&self) -> bool {
        let cooldown_done = match self.shared.cooldown_task.lock() {
            Ok(slot) => slot.as_ref().is_none_or(JoinHandle::is_finished),
            Err(_) => true,
        };
        cooldown_done && self.tasks.iter().all(JoinHandle::is_finished)
    }

    /// Cancel the periodic tasks and wait for them to exit. Does not end the
    /// backend session.
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        self.shared.token.cancel();
        for task in std::mem::take(&mut self.tasks) {
            task.await?;
        }
        let cooldown = self.shared.cooldown_task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = cooldown {
            task.await?;
        }
        Ok(())
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.shared.token.cancel();
    }
}

impl Shared {
    /// Publish events and start whatever follow-up work they call for.
    fn dispatch(self: &Arc<Self>, events: &[GameEvent]) {
        let game_id = self.context.game_id.as_str();
        for event in events {
            match event {
                GameEvent::ItemPickedUp { item_id } => debug!(game_id, item_id = %item_id, "Item picked up"),
                GameEvent::ItemDropped { item, outcome, .. } => {
                    info!(game_id, item_id = %item.id, "{}", outcome.message)
                }
                _ => {
                    if let Some(message) = event.notice() {
                        debug!(game_id, "{}", message);
                    }
                }
            }
            self.publish(event.clone());

            if let Some(request) = event.scoring_request() {
                tokio::spawn(self.clone().submit_score(request));
            }
            if let GameEvent::CooldownStarted { seconds } = event {
                debug!(game_id, seconds, "Repurpose station recharging");
                self.start_cooldown();
            }
            if let GameEvent::GameOver { score } = event {
                info!(game_id, score, "Time is up");
                tokio::spawn(self.clone().finish());
            }
        }
    }

    /// Count the cooldown down from now, replacing any previous countdown.
    fn start_cooldown(self: &Arc<Self>) {
        let task = spawn_cooldown(self);
        if let Ok(mut slot) = self.cooldown_task.lock() {
            if let Some(previous) = slot.replace(task) {
                previous.abort();
            }
        }
    }

    fn publish(&self, event: GameEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn submit_score(self: Arc<Self>, request: ScoringRequest) {
        let game_id = self.context.game_id.as_str();
        match self.api.submit_score(game_id, request).await {
            Ok(update) => {
                debug!(
                    game_id,
                    score = update.score,
                    backend_time_remaining = update.time_remaining,
                    "Score confirmed"
                );
                let events = self.engine.lock().await.apply_score(update.score);
                for event in events {
                    self.publish(event);
                }
            }
            Err(e) => {
                error!(game_id, action = request.action.as_str(), error = %e, "Failed to submit score");
            }
        }
    }

    async fn finish(self: Arc<Self>) {
        if self.finishing.swap(true, Ordering::SeqCst) {
            return;
        }
        self.token.cancel();

        let game_id = self.context.game_id.as_str();
        let elapsed = self.started.elapsed().as_secs_f64();
        let summary = match self.api.end_game(game_id).await {
            Ok(result) => GameSummary {
                game_id: game_id.to_string(),
                player_id: self.context.player_id.clone(),
                score: result.score,
                time_played: result.time_played,
                confirmed: true,
                finished_at: Utc::now(),
            },
            Err(e) => {
                let score = self.engine.lock().await.state().score;
                warn!(game_id, score, error = %e, "Failed to end game session, reporting local result");
                GameSummary {
                    game_id: game_id.to_string(),
                    player_id: self.context.player_id.clone(),
                    score,
                    time_played: elapsed,
                    confirmed: false,
                    finished_at: Utc::now(),
                }
            }
        };

        info!(game_id, score = summary.score, confirmed = summary.confirmed, "Game session ended");
        self.summary_tx.send_replace(Some(summary));
    }
}

fn spawn_periodic(
    shared: &Arc<Shared>,
    name: &'static str,
    period: Duration,
    step: fn(&mut GameEngine) -> Vec<GameEvent>,
) -> JoinHandle<()> {
    let shared = shared.clone();
    let token = shared.token.child_token();
    tokio::spawn(async move {
        let game_id = shared.context.game_id.clone();
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    debug!(game_id = %game_id, task = name, "Periodic task stopped");
                    break;
                }

                _ = interval.tick() => {
                    let events = {
                        let mut engine = shared.engine.lock().await;
                        step(&mut *engine)
                    };
                    shared.dispatch(&events);
                }
            }
        }
    })
}

/// Ticks the repurpose cooldown once a second, starting a full second after
/// the repurpose, until it reaches zero.
fn spawn_cooldown(shared: &Arc<Shared>) -> JoinHandle<()> {
    let shared = shared.clone();
    let token = shared.token.child_token();
    tokio::spawn(async move {
        let game_id = shared.context.game_id.clone();
        let period = Duration::from_millis(COUNTDOWN_TICK_MS);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                _ = interval.tick() => {
                    let (events, seconds_left) = {
                        let mut engine = shared.engine.lock().await;
                        let events = engine.cooldown_tick();
                        (events, engine.state().player.repurpose_cooldown)
                    };
                    for event in events {
                        shared.publish(event);
                    }
                    if seconds_left == 0 {
                        debug!(game_id = %game_id, "Repurpose station ready");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GameResult, LeaderboardEntry, ScoreUpdate, StartedGame};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use common::{
        CatalogEntry, Difficulty, FoodCategory, FoodItem, FoodItemId, Position, ResourceEntry,
    };

    struct AcceptingApi;

    #[async_trait]
    impl GameApi for AcceptingApi {
        async fn start_game(&self, _player_id: &str) -> Result<StartedGame, ApiError> {
            Ok(StartedGame {
                game_id: "test-game".to_string(),
                score: 0,
                time_remaining: 60,
            })
        }

        async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_resources(&self) -> Result<Vec<ResourceEntry>, ApiError> {
            Ok(Vec::new())
        }

        async fn submit_score(&self, _game_id: &str, _request: ScoringRequest) -> Result<ScoreUpdate, ApiError> {
            Ok(ScoreUpdate {
                score: 15,
                time_remaining: 60,
                is_game_over: false,
            })
        }

        async fn end_game(&self, _game_id: &str) -> Result<GameResult, ApiError> {
            Ok(GameResult {
                score: 15,
                time_played: 60.0,
            })
        }

        async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn repurpose_ready_session() -> GameSession {
        let catalog = Catalog::from_entries(&[CatalogEntry {
            id: Some(1),
            name: "Banana Peel".to_string(),
            category: "green waste bin".to_string(),
            image: String::new(),
            description: None,
            diy_option: Some(true),
            greenhouse_emission: None,
        }]);
        let mut state = GameState::new(catalog.clone(), Difficulty::Hard, 1);
        state.player.position = Position::new(700.0, 400.0);
        state.player.carried = Some(FoodItem {
            id: FoodItemId(100),
            name: "Banana Peel".to_string(),
            image: String::new(),
            category: FoodCategory::GreenWaste,
            repurposable: true,
            position: Position::default(),
            segment: 0,
        });

        let context = SessionContext {
            game_id: "test-game".to_string(),
            player_id: "tester".to_string(),
            difficulty: Difficulty::Hard,
            catalog,
            resources: ResourceBundle::default(),
        };
        GameSession::run(Arc::new(AcceptingApi), context, state)
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_lasts_five_seconds_from_a_mid_second_repurpose() {
        let session = repurpose_ready_session();

        tokio::time::sleep(Duration::from_millis(2950)).await;
        let events = session.input(PlayerInput::Action).await;
        assert!(events.iter().any(|e| matches!(e, GameEvent::CooldownStarted { seconds: 5 })));

        // 7.05s: only four ticks since the repurpose.
        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(session.snapshot().await.player.repurpose_cooldown, 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(session.snapshot().await.player.repurpose_cooldown, 0);
        assert_eq!(session.snapshot().await.score, 15);

        session.shutdown().await.unwrap();
    }
}
