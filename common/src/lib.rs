mod ai;
mod belt;
mod catalog;
mod constants;
mod food;
mod game_engine;
mod game_state;
mod geometry;
mod player;
mod resources;
mod scoring;
mod spawner;
mod zones;

pub mod util;

pub use ai::*;
pub use belt::{BeltPath, BeltStep, PathSegment};
pub use catalog::*;
pub use constants::*;
pub use food::*;
pub use game_engine::*;
pub use game_state::*;
pub use geometry::*;
pub use player::{PlayerState, play_field};
pub use resources::*;
pub use scoring::*;
pub use spawner::*;
pub use util::PseudoRandom;
pub use zones::*;
