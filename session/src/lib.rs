pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod game_session;

pub use api::{GameApi, HttpGameApi};
pub use config::SessionConfig;
pub use context::SessionContext;
pub use error::{ApiError, SessionError};
pub use game_session::{GameSession, GameSummary};
