/// Belt transport tick interval in milliseconds. Independent of difficulty.
pub const TRANSPORT_TICK_MS: u64 = 50;

/// Interval of the game countdown and the repurpose cooldown countdown.
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Length of a game in seconds when the backend does not say otherwise.
pub const INITIAL_TIME_SECS: u32 = 60;

/// Maximum number of items on the belt at once.
pub const MAX_LIVE_ITEMS: usize = 8;

/// Seconds the repurpose station stays disabled after a successful repurpose.
pub const REPURPOSE_COOLDOWN_SECS: u32 = 5;

/// Action inputs closer together than this are treated as one press.
pub const ACTION_DEBOUNCE_MS: i64 = 300;

/// Distance from the player centre to an item centre that still allows a pickup.
pub const PICKUP_RADIUS: f32 = 100.0;

/// Food sprites are square; positions refer to their top-left corner.
pub const FOOD_SIZE: f32 = 40.0;

/// Distance the player covers per movement input.
pub const PLAYER_STEP: f32 = 10.0;

pub const FIELD_WIDTH: f32 = 1000.0;
pub const FIELD_HEIGHT: f32 = 700.0;

/// Below the drop zones, clear of every zone and the belt.
pub const PLAYER_START_X: f32 = 500.0;
pub const PLAYER_START_Y: f32 = 650.0;

/// Chance that a catalog entry without a DIY flag is treated as repurposable.
pub const DEFAULT_REPURPOSABLE_CHANCE: f32 = 0.3;

pub const CORRECT_ACTION_POINTS: i32 = 10;
pub const REPURPOSE_POINTS: i32 = 15;
pub const INCORRECT_ACTION_POINTS: i32 = -5;

/// Number of events kept in the engine's event log.
pub const EVENT_LOG_CAPACITY: usize = 256;
