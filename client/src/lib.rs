use common::{
    CatalogEntry, Difficulty, Direction, GameEngine, GameEvent, GameState, PlayerInput,
    ScoringRequest, calculate_autopilot_input,
};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// Install the panic hook and route `log` output to the browser console.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Browser-facing handle on one game. The host owns the timers and the
/// backend calls; every method returns the produced events as JSON.
#[wasm_bindgen]
pub struct WasmGame {
    engine: GameEngine,
    pending_scores: Vec<ScoringRequest>,
}

#[wasm_bindgen]
impl WasmGame {
    /// `catalog_json` is either the backend's food-items response or a bare
    /// array of its entries.
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, difficulty: &str, seed: u32) -> Result<WasmGame, JsValue> {
        let entries = parse_catalog(catalog_json).map_err(|e| JsValue::from_str(&e))?;
        let difficulty = difficulty
            .parse::<Difficulty>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::from_entries(&entries, difficulty, seed as u64))
    }

    /// Seed the score and countdown from the backend's start response.
    pub fn set_session(&mut self, score: i32, time_remaining: u32) {
        let mut state = self.engine.state().clone();
        state.score = score;
        state.time_remaining = time_remaining;
        self.engine = GameEngine::new_from_state(state);
    }

    pub fn spawn(&mut self) -> Result<String, JsValue> {
        let events = self.engine.spawn();
        self.finish(events)
    }

    pub fn transport(&mut self) -> Result<String, JsValue> {
        let events = self.engine.transport();
        self.finish(events)
    }

    pub fn countdown_tick(&mut self) -> Result<String, JsValue> {
        let events = self.engine.countdown_tick();
        self.finish(events)
    }

    pub fn cooldown_tick(&mut self) -> Result<String, JsValue> {
        let events = self.engine.cooldown_tick();
        self.finish(events)
    }

    /// `direction` is `up`, `down`, `left` or `right` (arrow key names work too).
    pub fn move_player(&mut self, direction: &str, now_ms: f64) -> Result<String, JsValue> {
        let Some(direction) = parse_direction(direction) else {
            return Err(JsValue::from_str(&format!("Unknown direction '{}'", direction)));
        };
        let events = self.engine.handle_input(PlayerInput::Move(direction), now_ms as i64);
        self.finish(events)
    }

    /// Pick up or drop, depending on whether the player is carrying.
    pub fn action(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let events = self.engine.handle_input(PlayerInput::Action, now_ms as i64);
        self.finish(events)
    }

    /// Apply the cumulative score returned by the backend.
    pub fn apply_score(&mut self, score: i32) -> Result<String, JsValue> {
        let events = self.engine.apply_score(score);
        self.finish(events)
    }

    /// Scoring calls the host still has to send, as `game/update/` bodies
    /// without the game id. Clears the queue.
    pub fn drain_scoring_requests(&mut self) -> String {
        let requests: Vec<Value> = self.pending_scores.drain(..).map(|r| update_body(&r)).collect();
        Value::Array(requests).to_string()
    }

    /// Next autopilot input as `"up"`..`"right"` or `"action"`, if any.
    pub fn autopilot_input(&self) -> Option<String> {
        calculate_autopilot_input(self.engine.state()).map(|input| match input {
            PlayerInput::Move(direction) => direction_name(direction).to_string(),
            PlayerInput::Action => "action".to_string(),
        })
    }

    pub fn is_over(&self) -> bool {
        self.engine.state().is_over()
    }

    pub fn score(&self) -> i32 {
        self.engine.state().score
    }

    pub fn time_remaining(&self) -> u32 {
        self.engine.state().time_remaining
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        self.engine
            .get_state_json()
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize state: {}", e)))
    }

    pub fn event_log_json(&self) -> Result<String, JsValue> {
        self.engine
            .get_event_log_json()
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize event log: {}", e)))
    }

    pub fn events_since_json(&self, sequence: f64) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.events_since(sequence as u64))
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize events: {}", e)))
    }
}

impl WasmGame {
    pub fn from_entries(entries: &[CatalogEntry], difficulty: Difficulty, seed: u64) -> Self {
        let catalog = common::Catalog::from_entries(entries);
        log::info!("Starting {:?} game with {} food items", difficulty, catalog.len());
        WasmGame {
            engine: GameEngine::new(catalog, difficulty, seed),
            pending_scores: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    fn finish(&mut self, events: Vec<GameEvent>) -> Result<String, JsValue> {
        self.pending_scores
            .extend(events.iter().filter_map(GameEvent::scoring_request));
        serde_json::to_string(&events)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize events: {}", e)))
    }
}

fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("Invalid catalog JSON: {}", e))?;
    let items = match value {
        Value::Object(mut object) => object
            .remove("food_items")
            .ok_or_else(|| "Catalog object has no food_items".to_string())?,
        other => other,
    };
    let entries: Vec<CatalogEntry> =
        serde_json::from_value(items).map_err(|e| format!("Invalid catalog entry: {}", e))?;
    if entries.is_empty() {
        return Err("Catalog is empty".to_string());
    }
    Ok(entries)
}

fn parse_direction(raw: &str) -> Option<Direction> {
    match raw.trim().to_ascii_lowercase().trim_start_matches("arrow") {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        _ => None,
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Left => "left",
        Direction::Right => "right",
    }
}

fn update_body(request: &ScoringRequest) -> Value {
    let mut body = json!({
        "action": request.action.as_str(),
        "food_type": request.category.wire_name(),
    });
    if request.repurpose {
        body["diy_option"] = Value::Bool(true);
    }
    body
}
