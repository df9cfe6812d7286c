use serde::{Deserialize, Serialize};

use crate::{FoodCategory, Position, Rect};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneKind {
    FoodBank,
    GreenWaste,
    Repurpose,
}

impl ZoneKind {
    /// The zone an item of this category is sorted into, ignoring repurposing.
    pub fn for_category(category: FoodCategory) -> Option<ZoneKind> {
        match category {
            FoodCategory::FoodBank => Some(ZoneKind::FoodBank),
            FoodCategory::GreenWaste => Some(ZoneKind::GreenWaste),
            FoodCategory::Trash => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DropZone {
    pub kind: ZoneKind,
    pub area: Rect,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ZoneLayout {
    pub zones: Vec<DropZone>,
}

impl ZoneLayout {
    /// First zone containing `point`, if any.
    pub fn zone_at(&self, point: &Position) -> Option<ZoneKind> {
        self.zones
            .iter()
            .find(|zone| zone.area.contains(point))
            .map(|zone| zone.kind)
    }

    pub fn get(&self, kind: ZoneKind) -> Option<&DropZone> {
        self.zones.iter().find(|zone| zone.kind == kind)
    }
}

impl Default for ZoneLayout {
    fn default() -> Self {
        ZoneLayout {
            zones: vec![
                DropZone { kind: ZoneKind::FoodBank, area: Rect::new(200.0, 450.0, 350.0, 600.0) },
                DropZone { kind: ZoneKind::GreenWaste, area: Rect::new(450.0, 600.0, 400.0, 550.0) },
                DropZone { kind: ZoneKind::Repurpose, area: Rect::new(650.0, 800.0, 300.0, 450.0) },
            ],
        }
    }
}
