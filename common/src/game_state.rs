use serde::{Deserialize, Serialize};

use crate::belt::BeltStep;
use crate::player::play_field;
use crate::{
    BeltPath, Catalog, Difficulty, Direction, DropOutcome, FoodItem, FoodItemId, INITIAL_TIME_SECS,
    PLAYER_STEP, PlayerState, Position, REPURPOSE_COOLDOWN_SECS, Rect, ScoringRequest, Spawner,
    ZoneKind, ZoneLayout, belt_end_request, cooldown_message, disposed_message, resolve_drop,
    wasted_message,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Move(Direction),
    /// Pick up when empty-handed, drop when carrying.
    Action,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Spawn,
    Transport,
    CountdownTick,
    CooldownTick,
    Input(PlayerInput),
    ApplyScore { score: i32 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum GameEvent {
    ItemSpawned { item: FoodItem },
    ItemWasted { item_id: FoodItemId, name: String, request: ScoringRequest, message: String },
    ItemDisposed { item_id: FoodItemId, name: String, message: String },
    ItemPickedUp { item_id: FoodItemId },
    ItemDropped { item: FoodItem, outcome: DropOutcome, request: ScoringRequest },
    DropBlocked { seconds_left: u32, message: String },
    PlayerMoved { position: Position, facing: Direction },
    CooldownStarted { seconds: u32 },
    CooldownTicked { seconds_left: u32 },
    TimeTicked { time_remaining: u32 },
    ScoreUpdated { score: i32 },
    GameOver { score: i32 },
}

impl GameEvent {
    /// The backend submission this event calls for, if any.
    pub fn scoring_request(&self) -> Option<ScoringRequest> {
        match self {
            GameEvent::ItemWasted { request, .. } | GameEvent::ItemDropped { request, .. } => {
                Some(*request)
            }
            _ => None,
        }
    }

    /// Short text to flash on screen, if the event has one.
    pub fn notice(&self) -> Option<&str> {
        match self {
            GameEvent::ItemWasted { message, .. }
            | GameEvent::ItemDisposed { message, .. }
            | GameEvent::DropBlocked { message, .. } => Some(message.as_str()),
            GameEvent::ItemDropped { outcome, .. } => Some(outcome.message.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameEventMessage {
    pub sequence: u64,
    pub tick: u32,
    pub event: GameEvent,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Running,
    Over,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameState {
    pub tick: u32,
    pub status: GameStatus,
    /// Last score confirmed by the backend.
    pub score: i32,
    pub time_remaining: u32,
    pub difficulty: Difficulty,
    pub belt: BeltPath,
    pub zones: ZoneLayout,
    pub field: Rect,
    pub belt_items: Vec<FoodItem>,
    pub player: PlayerState,

    // Session-local inputs that are not part of snapshots
    #[serde(skip)]
    pub catalog: Catalog,
    #[serde(skip, default = "default_spawner")]
    spawner: Spawner,
}

fn default_spawner() -> Spawner {
    Spawner::new(0)
}

impl GameState {
    pub fn new(catalog: Catalog, difficulty: Difficulty, seed: u64) -> Self {
        Self::with_layout(catalog, difficulty, seed, BeltPath::default_route(), ZoneLayout::default())
    }

    pub fn with_layout(
        catalog: Catalog,
        difficulty: Difficulty,
        seed: u64,
        belt: BeltPath,
        zones: ZoneLayout,
    ) -> Self {
        GameState {
            tick: 0,
            status: GameStatus::Running,
            score: 0,
            time_remaining: INITIAL_TIME_SECS,
            difficulty,
            belt,
            zones,
            field: play_field(),
            belt_items: Vec::new(),
            player: PlayerState::default(),
            catalog,
            spawner: Spawner::new(seed),
        }
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }

    pub fn live_item_count(&self) -> usize {
        self.belt_items.len()
    }

    pub fn belt_item(&self, item_id: FoodItemId) -> Option<&FoodItem> {
        self.belt_items.iter().find(|item| item.id == item_id)
    }

    /// The zone the player is standing in, if any.
    pub fn current_zone(&self) -> Option<ZoneKind> {
        self.zones.zone_at(&self.player.position)
    }

    pub fn exec_command(&mut self, command: GameCommand) -> Vec<GameEvent> {
        let mut out: Vec<GameEvent> = Vec::new();

        if self.is_over() {
            // Late scoring responses still land so the game-over screen shows them.
            if let GameCommand::ApplyScore { score } = command {
                self.apply_event(GameEvent::ScoreUpdated { score }, Some(&mut out));
            }
            return out;
        }

        match command {
            GameCommand::Spawn => {
                let start = self.belt.start();
                if let Some(item) = self.spawner.spawn(&self.catalog, start, self.belt_items.len()) {
                    self.apply_event(GameEvent::ItemSpawned { item }, Some(&mut out));
                }
            }

            GameCommand::Transport => {
                let speed = self.difficulty.belt_speed();
                let mut finished: Vec<FoodItem> = Vec::new();
                for item in self.belt_items.iter_mut() {
                    if self.belt.advance(item, speed) == BeltStep::ReachedEnd {
                        finished.push(item.clone());
                    }
                }

                for item in finished {
                    let event = match belt_end_request(item.category) {
                        Some(request) => GameEvent::ItemWasted {
                            item_id: item.id,
                            message: wasted_message(&item.name),
                            name: item.name,
                            request,
                        },
                        None => GameEvent::ItemDisposed {
                            item_id: item.id,
                            message: disposed_message(&item.name),
                            name: item.name,
                        },
                    };
                    self.apply_event(event, Some(&mut out));
                }

                self.tick += 1;
            }

            GameCommand::CountdownTick => {
                let time_remaining = self.time_remaining.saturating_sub(1);
                self.apply_event(GameEvent::TimeTicked { time_remaining }, Some(&mut out));
                if time_remaining == 0 {
                    self.apply_event(GameEvent::GameOver { score: self.score }, Some(&mut out));
                }
            }

            GameCommand::CooldownTick => {
                if self.player.repurpose_cooldown > 0 {
                    let seconds_left = self.player.repurpose_cooldown - 1;
                    self.apply_event(GameEvent::CooldownTicked { seconds_left }, Some(&mut out));
                }
            }

            GameCommand::Input(PlayerInput::Move(direction)) => {
                let mut player = self.player.clone();
                let position = player.step(direction, PLAYER_STEP, &self.field);
                self.apply_event(GameEvent::PlayerMoved { position, facing: direction }, Some(&mut out));
            }

            GameCommand::Input(PlayerInput::Action) => match &self.player.carried {
                Some(carried) => {
                    // Outside every zone the player just keeps holding the item.
                    let Some(zone) = self.current_zone() else {
                        return out;
                    };

                    let cooldown = self.player.repurpose_cooldown;
                    if zone == ZoneKind::Repurpose && cooldown > 0 {
                        self.apply_event(
                            GameEvent::DropBlocked { seconds_left: cooldown, message: cooldown_message(cooldown) },
                            Some(&mut out),
                        );
                        return out;
                    }

                    let item = carried.clone();
                    let outcome = resolve_drop(zone, item.category, item.repurposable);
                    let request = outcome.request(item.category);
                    let starts_cooldown = zone == ZoneKind::Repurpose && outcome.is_correct();
                    self.apply_event(GameEvent::ItemDropped { item, outcome, request }, Some(&mut out));
                    if starts_cooldown {
                        self.apply_event(
                            GameEvent::CooldownStarted { seconds: REPURPOSE_COOLDOWN_SECS },
                            Some(&mut out),
                        );
                    }
                }
                None => {
                    if let Some(item_id) = self.player.nearest_in_range(&self.belt_items).map(|item| item.id) {
                        self.apply_event(GameEvent::ItemPickedUp { item_id }, Some(&mut out));
                    }
                }
            },

            GameCommand::ApplyScore { score } => {
                self.apply_event(GameEvent::ScoreUpdated { score }, Some(&mut out));
            }
        }

        out
    }

    pub fn apply_event(&mut self, event: GameEvent, out: Option<&mut Vec<GameEvent>>) {
        match &event {
            GameEvent::ItemSpawned { item } => {
                self.belt_items.push(item.clone());
            }

            GameEvent::ItemWasted { item_id, .. } | GameEvent::ItemDisposed { item_id, .. } => {
                self.belt_items.retain(|item| item.id != *item_id);
            }

            GameEvent::ItemPickedUp { item_id } => {
                if self.player.carried.is_none() {
                    if let Some(index) = self.belt_items.iter().position(|item| item.id == *item_id) {
                        self.player.carried = Some(self.belt_items.remove(index));
                    }
                }
            }

            GameEvent::ItemDropped { .. } => {
                self.player.carried = None;
            }

            GameEvent::PlayerMoved { position, facing } => {
                self.player.position = *position;
                self.player.facing = *facing;
            }

            GameEvent::CooldownStarted { seconds } => {
                self.player.repurpose_cooldown = *seconds;
            }

            GameEvent::CooldownTicked { seconds_left } => {
                self.player.repurpose_cooldown = *seconds_left;
            }

            GameEvent::TimeTicked { time_remaining } => {
                self.time_remaining = *time_remaining;
            }

            GameEvent::ScoreUpdated { score } => {
                self.score = *score;
            }

            GameEvent::GameOver { .. } => {
                self.status = GameStatus::Over;
            }

            GameEvent::DropBlocked { .. } => {}
        }

        if let Some(out) = out {
            out.push(event);
        }
    }
}
