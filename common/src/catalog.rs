use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Where a food item belongs. Decided once, when the backend catalog is ingested.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FoodCategory {
    FoodBank,
    GreenWaste,
    Trash,
}

impl FoodCategory {
    /// Normalise a backend category string. Unknown strings fall back to
    /// `FoodBank` with a warning.
    pub fn from_wire(raw: &str) -> FoodCategory {
        match Self::parse(raw) {
            Some(category) => category,
            None => {
                warn!("Unrecognized food category {:?}, defaulting to food bank", raw);
                FoodCategory::FoodBank
            }
        }
    }

    /// Strict parse without the fallback.
    pub fn parse(raw: &str) -> Option<FoodCategory> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "food bank" | "foodbank" | "donate" => Some(FoodCategory::FoodBank),
            "green waste" | "green waste bin" | "green bin" | "compost" => {
                Some(FoodCategory::GreenWaste)
            }
            "trash" => Some(FoodCategory::Trash),
            _ => None,
        }
    }

    /// The spelling the backend uses for `food_type`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FoodCategory::FoodBank => "food bank",
            FoodCategory::GreenWaste => "green waste bin",
            FoodCategory::Trash => "trash",
        }
    }
}

/// One row of the backend's `food_items` list, as sent over the wire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub diy_option: Option<bool>,
    #[serde(default, rename = "greengas_emession")]
    pub greenhouse_emission: Option<serde_json::Value>,
}

/// A catalog entry after ingestion: the category is a closed enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoodDefinition {
    pub name: String,
    pub image: String,
    pub category: FoodCategory,
    pub repurposable: Option<bool>,
}

impl From<&CatalogEntry> for FoodDefinition {
    fn from(entry: &CatalogEntry) -> Self {
        FoodDefinition {
            name: entry.name.clone(),
            image: entry.image.clone(),
            category: FoodCategory::from_wire(&entry.category),
            repurposable: entry.diy_option,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Catalog {
    pub entries: Vec<FoodDefinition>,
}

impl Catalog {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Catalog {
            entries: entries.iter().map(FoodDefinition::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FoodDefinition> {
        self.entries.get(index)
    }
}

/// The backend sends the DIY flag as `"1"`/`"0"`, `1`/`0`, a bool, or not at all.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => None,
        Some(Flag::Bool(b)) => Some(b),
        Some(Flag::Int(i)) => Some(i != 0),
        Some(Flag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            "" => None,
            other => {
                warn!("Unrecognized diy_option value {:?}, treating as unknown", other);
                None
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_spellings_normalize() {
        assert_eq!(FoodCategory::from_wire("food bank"), FoodCategory::FoodBank);
        assert_eq!(FoodCategory::from_wire("Green Waste Bin"), FoodCategory::GreenWaste);
        assert_eq!(FoodCategory::from_wire("green-waste"), FoodCategory::GreenWaste);
        assert_eq!(FoodCategory::from_wire("compost"), FoodCategory::GreenWaste);
        assert_eq!(FoodCategory::from_wire(" trash "), FoodCategory::Trash);
    }

    #[test]
    fn unknown_category_defaults_to_food_bank() {
        assert_eq!(FoodCategory::parse("landfill"), None);
        assert_eq!(FoodCategory::from_wire("landfill"), FoodCategory::FoodBank);
        assert_eq!(FoodCategory::from_wire(""), FoodCategory::FoodBank);
    }

    #[test]
    fn diy_option_accepts_backend_shapes() {
        let json = r#"[
            {"id": 1, "name": "Apple", "type": "food bank", "image": "apple.jpg", "diy_option": "0"},
            {"id": 2, "name": "Banana Peel", "type": "green waste bin", "image": "peel.jpg", "diy_option": "1"},
            {"name": "Crust", "type": "green waste bin", "diy_option": true},
            {"name": "Wrapper", "type": "trash", "diy_option": null},
            {"name": "Can", "type": "food bank"}
        ]"#;
        let entries: Vec<CatalogEntry> = serde_json::from_str(json).unwrap();
        let flags: Vec<_> = entries.iter().map(|e| e.diy_option).collect();
        assert_eq!(flags, vec![Some(false), Some(true), Some(true), None, None]);

        let catalog = Catalog::from_entries(&entries);
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.entries[1].category, FoodCategory::GreenWaste);
        assert_eq!(catalog.entries[3].category, FoodCategory::Trash);
    }
}
