use serde::{Deserialize, Serialize};

use crate::{
    CORRECT_ACTION_POINTS, FoodCategory, INCORRECT_ACTION_POINTS, REPURPOSE_POINTS, ZoneKind,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoringAction {
    Correct,
    Incorrect,
}

impl ScoringAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringAction::Correct => "correct",
            ScoringAction::Incorrect => "incorrect",
        }
    }
}

/// What gets submitted to the backend for one scored event. The backend
/// answers with the authoritative cumulative score.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRequest {
    pub action: ScoringAction,
    pub category: FoodCategory,
    pub repurpose: bool,
}

/// Result of dropping a carried item in a zone.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    pub zone: ZoneKind,
    pub action: ScoringAction,
    /// Expected score change, only used for message text.
    pub delta: i32,
    pub message: String,
}

impl DropOutcome {
    pub fn is_correct(&self) -> bool {
        self.action == ScoringAction::Correct
    }

    pub fn request(&self, category: FoodCategory) -> ScoringRequest {
        ScoringRequest {
            action: self.action,
            category,
            repurpose: self.zone == ZoneKind::Repurpose,
        }
    }
}

pub fn resolve_drop(zone: ZoneKind, category: FoodCategory, repurposable: bool) -> DropOutcome {
    let (action, delta, message) = match zone {
        ZoneKind::FoodBank if category == FoodCategory::FoodBank => (
            ScoringAction::Correct,
            CORRECT_ACTION_POINTS,
            format!("Correct! Food donated. {}", points(CORRECT_ACTION_POINTS)),
        ),
        ZoneKind::GreenWaste if category == FoodCategory::GreenWaste => (
            ScoringAction::Correct,
            CORRECT_ACTION_POINTS,
            format!("Correct! Food composted. {}", points(CORRECT_ACTION_POINTS)),
        ),
        ZoneKind::FoodBank | ZoneKind::GreenWaste => (
            ScoringAction::Incorrect,
            INCORRECT_ACTION_POINTS,
            wrong_zone_message(zone, category),
        ),
        ZoneKind::Repurpose if repurposable => (
            ScoringAction::Correct,
            REPURPOSE_POINTS,
            format!("Amazing! Great DIY creation! {}", points(REPURPOSE_POINTS)),
        ),
        ZoneKind::Repurpose => (
            ScoringAction::Incorrect,
            INCORRECT_ACTION_POINTS,
            format!("This item cannot be repurposed. {}", points(INCORRECT_ACTION_POINTS)),
        ),
    };

    DropOutcome { zone, action, delta, message }
}

/// Scoring request for an item that rode off the end of the belt, or `None`
/// when letting it go was the right call.
pub fn belt_end_request(category: FoodCategory) -> Option<ScoringRequest> {
    match category {
        FoodCategory::Trash => None,
        FoodCategory::FoodBank | FoodCategory::GreenWaste => Some(ScoringRequest {
            action: ScoringAction::Incorrect,
            category,
            repurpose: false,
        }),
    }
}

pub fn wasted_message(name: &str) -> String {
    format!("{}, food wasted: {}", points(INCORRECT_ACTION_POINTS), name)
}

pub fn disposed_message(name: &str) -> String {
    format!("{} disposed of properly", name)
}

pub fn cooldown_message(seconds_left: u32) -> String {
    format!("DIY station is recharging, {}s left", seconds_left)
}

fn wrong_zone_message(zone: ZoneKind, category: FoodCategory) -> String {
    let zone_name = match zone {
        ZoneKind::FoodBank => "food bank",
        ZoneKind::GreenWaste => "green waste bin",
        ZoneKind::Repurpose => "DIY station",
    };
    format!(
        "Wrong zone! {} items don't belong in the {}. {}",
        capitalize(category.wire_name()),
        zone_name,
        points(INCORRECT_ACTION_POINTS)
    )
}

fn points(delta: i32) -> String {
    format!("{:+} points", delta)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
