use serde::{Deserialize, Serialize};

/// One row of the backend's game resources list (background art, zone icons, sounds).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
}

/// Presentation assets for one session. Never consulted by game rules.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ResourceBundle {
    pub entries: Vec<ResourceEntry>,
}

impl ResourceBundle {
    pub fn new(entries: Vec<ResourceEntry>) -> Self {
        ResourceBundle { entries }
    }

    pub fn by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ResourceEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.kind.eq_ignore_ascii_case(kind))
    }

    pub fn find(&self, name: &str) -> Option<&ResourceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn background(&self) -> Option<&str> {
        self.by_kind("background").next().map(|entry| entry.image.as_str())
    }

    /// Sound effect URLs keyed by resource name.
    pub fn sounds(&self) -> Vec<(&str, &str)> {
        self.by_kind("sound")
            .map(|entry| (entry.name.as_str(), entry.image.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
