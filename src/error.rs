use thiserror::Error;

use crate::matchup::MatchupId;

pub type Result<T> = std::result::Result<T, MatchupError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchupError {
    #[error("schema error in game {game_id}: {detail}")]
    Schema { game_id: String, detail: String },

    #[error("game {game_id} has no period-end markers")]
    MissingPeriodBoundary { game_id: String },

    #[error(
        "game {game_id} period {period}: team {team_id} resolved {found} starters, need 5"
    )]
    IncompleteLineup {
        game_id: String,
        team_id: u64,
        period: u32,
        found: usize,
    },

    #[error("cannot merge matchup {left} with matchup {right}")]
    IdentityMismatch { left: MatchupId, right: MatchupId },

    #[error("external source unavailable: {0}")]
    ExternalSourceUnavailable(String),
}

impl MatchupError {
    pub fn schema(game_id: &str, detail: impl Into<String>) -> Self {
        MatchupError::Schema {
            game_id: game_id.to_string(),
            detail: detail.into(),
        }
    }

    /// Only collaborator failures are worth retrying; everything else is a
    /// property of the data or of the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MatchupError::ExternalSourceUnavailable(_))
    }
}
