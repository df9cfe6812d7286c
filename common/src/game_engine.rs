use anyhow::Result;
use log::debug;
use std::collections::VecDeque;

use crate::{
    ACTION_DEBOUNCE_MS, Catalog, Difficulty, EVENT_LOG_CAPACITY, GameCommand, GameEvent,
    GameEventMessage, GameState, PlayerInput, ScoringRequest,
};

/// Drives a [`GameState`] from timer callbacks and player input.
///
/// Keeps what the pure state machine should not know about: wall-clock
/// debounce of the action button and a bounded log of recent events.
pub struct GameEngine {
    state: GameState,
    last_action_ms: Option<i64>,
    event_log: VecDeque<GameEventMessage>,
    sequence: u64,
}

impl GameEngine {
    pub fn new(catalog: Catalog, difficulty: Difficulty, seed: u64) -> Self {
        Self::new_from_state(GameState::new(catalog, difficulty, seed))
    }

    pub fn new_from_state(state: GameState) -> Self {
        GameEngine {
            state,
            last_action_ms: None,
            event_log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
            sequence: 0,
        }
    }

    pub fn exec(&mut self, command: GameCommand) -> Vec<GameEvent> {
        let events = self.state.exec_command(command);
        for event in &events {
            self.record(event.clone());
        }
        events
    }

    /// Apply player input received at `now_ms`. An action pressed within the
    /// debounce window of the last processed action is dropped.
    pub fn handle_input(&mut self, input: PlayerInput, now_ms: i64) -> Vec<GameEvent> {
        if input == PlayerInput::Action {
            if let Some(last) = self.last_action_ms {
                if now_ms - last < ACTION_DEBOUNCE_MS {
                    debug!("Ignoring action {}ms after the previous one", now_ms - last);
                    return Vec::new();
                }
            }
            if self.state.is_over() {
                return Vec::new();
            }
            self.last_action_ms = Some(now_ms);
        }
        self.exec(GameCommand::Input(input))
    }

    pub fn spawn(&mut self) -> Vec<GameEvent> {
        self.exec(GameCommand::Spawn)
    }

    pub fn transport(&mut self) -> Vec<GameEvent> {
        self.exec(GameCommand::Transport)
    }

    pub fn countdown_tick(&mut self) -> Vec<GameEvent> {
        self.exec(GameCommand::CountdownTick)
    }

    pub fn cooldown_tick(&mut self) -> Vec<GameEvent> {
        self.exec(GameCommand::CooldownTick)
    }

    pub fn apply_score(&mut self, score: i32) -> Vec<GameEvent> {
        self.exec(GameCommand::ApplyScore { score })
    }

    fn record(&mut self, event: GameEvent) {
        if self.event_log.len() == EVENT_LOG_CAPACITY {
            self.event_log.pop_front();
        }
        self.sequence += 1;
        self.event_log.push_back(GameEventMessage {
            sequence: self.sequence,
            tick: self.state.current_tick(),
            event,
        });
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_tick(&self) -> u32 {
        self.state.current_tick()
    }

    pub fn event_log(&self) -> impl Iterator<Item = &GameEventMessage> {
        self.event_log.iter()
    }

    /// Events recorded after `sequence`, oldest first.
    pub fn events_since(&self, sequence: u64) -> Vec<GameEventMessage> {
        self.event_log
            .iter()
            .filter(|message| message.sequence > sequence)
            .cloned()
            .collect()
    }

    // --- JSON Getters for WASM ---
    pub fn get_state_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    pub fn get_event_log_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.event_log)?)
    }
}

/// Backend submissions required by a batch of events, in order.
pub fn scoring_requests(events: &[GameEvent]) -> Vec<ScoringRequest> {
    events.iter().filter_map(GameEvent::scoring_request).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogEntry, EVENT_LOG_CAPACITY};

    fn engine() -> GameEngine {
        let catalog = Catalog::from_entries(&[CatalogEntry {
            id: Some(1),
            name: "Apple".to_string(),
            category: "food bank".to_string(),
            image: String::new(),
            description: None,
            diy_option: Some(false),
            greenhouse_emission: None,
        }]);
        GameEngine::new(catalog, Difficulty::Normal, 1)
    }

    #[test]
    fn event_log_is_bounded_and_sequenced() {
        let mut engine = engine();
        for _ in 0..(EVENT_LOG_CAPACITY + 10) {
            engine.apply_score(1);
        }
        let log: Vec<_> = engine.event_log().collect();
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.last().unwrap().sequence, (EVENT_LOG_CAPACITY + 10) as u64);
        assert_eq!(engine.events_since(log.last().unwrap().sequence - 2).len(), 2);
    }

    #[test]
    fn debounce_only_applies_to_actions() {
        let mut engine = engine();
        engine.handle_input(PlayerInput::Action, 1_000);
        let moved = engine.handle_input(PlayerInput::Move(crate::Direction::Up), 1_010);
        assert_eq!(moved.len(), 1);
        assert_eq!(engine.last_action_ms, Some(1_000));
        engine.handle_input(PlayerInput::Action, 1_100);
        assert_eq!(engine.last_action_ms, Some(1_000));
        engine.handle_input(PlayerInput::Action, 1_300);
        assert_eq!(engine.last_action_ms, Some(1_300));
    }
}
