pub mod aggregate;
pub mod box_score;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod matchup;
pub mod periods;
pub mod persist;
pub mod segments;
pub mod sources;
pub mod starters;

pub use error::{MatchupError, Result};
