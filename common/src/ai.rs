use crate::{Direction, FoodCategory, FoodItem, GameState, PICKUP_RADIUS, PLAYER_STEP, PlayerInput, Position, ZoneKind};

/// Basic autopilot that carries items to the zone they belong in.
///
/// Returns the next input to send, or `None` when there is nothing worth doing
/// (empty belt, or the game is over).
pub fn calculate_autopilot_input(game_state: &GameState) -> Option<PlayerInput> {
    if game_state.is_over() {
        return None;
    }

    let player = &game_state.player;
    let target = match &player.carried {
        Some(item) => {
            let zone = target_zone(item, player.repurpose_cooldown);
            if game_state.current_zone() == Some(zone) {
                return Some(PlayerInput::Action);
            }
            game_state.zones.get(zone)?.area.center()
        }
        None => {
            let item = find_nearest_food(game_state)?;
            // A pickup takes whatever is closest, so only press once the target is.
            let would_pick = player.nearest_in_range(&game_state.belt_items).map(|nearest| nearest.id);
            if would_pick == Some(item.id) && player.position.distance_to(&item.center()) < PICKUP_RADIUS * 0.8 {
                return Some(PlayerInput::Action);
            }
            item.center()
        }
    };

    step_towards(&player.position, &target).map(PlayerInput::Move)
}

/// Zone an item should be dropped in. Trash has no good zone; the food bank
/// is the least bad place to get rid of it.
pub fn target_zone(item: &FoodItem, repurpose_cooldown: u32) -> ZoneKind {
    if item.repurposable && repurpose_cooldown == 0 {
        return ZoneKind::Repurpose;
    }
    ZoneKind::for_category(item.category).unwrap_or(ZoneKind::FoodBank)
}

/// Closest on-belt item that is worth picking up. Trash is left to ride off the belt.
fn find_nearest_food(game_state: &GameState) -> Option<&FoodItem> {
    let position = game_state.player.position;
    game_state
        .belt_items
        .iter()
        .filter(|item| item.category != FoodCategory::Trash)
        .min_by(|a, b| {
            position
                .distance_to(&a.center())
                .total_cmp(&position.distance_to(&b.center()))
        })
}

/// One step along the axis with the larger gap.
fn step_towards(from: &Position, to: &Position) -> Option<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() < PLAYER_STEP / 2.0 && dy.abs() < PLAYER_STEP / 2.0 {
        return None;
    }

    if dx.abs() >= dy.abs() {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}
