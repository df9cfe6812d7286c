use common::{Catalog, Difficulty, ResourceBundle};

/// Everything one session knows about itself. Created when the backend
/// confirms the session and dropped with the [`GameSession`](crate::GameSession).
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub game_id: String,
    pub player_id: String,
    pub difficulty: Difficulty,
    pub catalog: Catalog,
    pub resources: ResourceBundle,
}
