use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{MatchupError, Result};
use crate::event::{Event, EventType, RowSchema, TeamId};
use crate::matchup::MatchupRecord;
use crate::periods::split_periods;
use crate::segments::run_period;
use crate::starters::{LineupSource, resolve_starters};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayByPlay {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl PlayByPlay {
    pub fn schema(&self) -> RowSchema {
        if self.headers.is_empty() {
            RowSchema::default()
        } else {
            RowSchema::from_headers(&self.headers)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeriodOutcome {
    pub period: u32,
    pub result: Result<Vec<MatchupRecord>>,
}

#[derive(Debug, Clone)]
pub struct GameMatchups {
    pub game_id: String,
    pub team_1_id: TeamId,
    pub team_2_id: TeamId,
    pub periods: Vec<PeriodOutcome>,
}

impl GameMatchups {
    pub fn records(&self) -> impl Iterator<Item = &MatchupRecord> {
        self.periods
            .iter()
            .filter_map(|p| p.result.as_ref().ok())
            .flatten()
    }

    pub fn into_records(self) -> Vec<MatchupRecord> {
        self.periods
            .into_iter()
            .filter_map(|p| p.result.ok())
            .flatten()
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (u32, &MatchupError)> {
        self.periods
            .iter()
            .filter_map(|p| p.result.as_ref().err().map(|err| (p.period, err)))
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// The game's two teams: the distinct primary team ids, in order of first
/// appearance.
pub fn detect_teams<I>(game_id: &str, team_ids: I) -> Result<(TeamId, TeamId)>
where
    I: IntoIterator<Item = Option<TeamId>>,
{
    let mut seen: Vec<TeamId> = Vec::with_capacity(2);
    for id in team_ids.into_iter().flatten() {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    match seen.as_slice() {
        [a, b] => Ok((*a, *b)),
        other => Err(MatchupError::schema(
            game_id,
            format!("expected two teams, found {}", other.len()),
        )),
    }
}

pub fn process_period(
    game_id: &str,
    period: u32,
    events: &[Event],
    team_1_id: TeamId,
    team_2_id: TeamId,
    source: &dyn LineupSource,
) -> Result<Vec<MatchupRecord>> {
    let starters = resolve_starters(game_id, period, events, team_1_id, team_2_id, source)?;
    run_period(game_id, period, events, starters)
}

/// Reconstructs every pairing of a game from raw rows. A row that cannot be
/// read, or a lineup that cannot be resolved, fails only its own period.
pub fn process_game(
    game_id: &str,
    pbp: &PlayByPlay,
    source: &dyn LineupSource,
) -> Result<GameMatchups> {
    let schema = pbp.schema();
    let (team_1_id, team_2_id) =
        detect_teams(game_id, pbp.rows.iter().map(|row| schema.primary_team_id(row)))?;
    let periods = split_periods(game_id, &pbp.rows, |row| {
        schema.event_type(row) == Some(EventType::PeriodEnd)
    })?;

    let periods = periods
        .into_iter()
        .enumerate()
        .map(|(idx, rows)| {
            let period = idx as u32 + 1;
            let result = rows
                .iter()
                .map(|row| schema.parse(row))
                .collect::<Result<Vec<_>>>()
                .and_then(|events| {
                    process_period(game_id, period, &events, team_1_id, team_2_id, source)
                });
            PeriodOutcome { period, result }
        })
        .collect();

    Ok(finish(game_id, team_1_id, team_2_id, periods))
}

/// Same as [`process_game`] for events that are already parsed.
pub fn process_events(
    game_id: &str,
    events: &[Event],
    source: &dyn LineupSource,
) -> Result<GameMatchups> {
    let (team_1_id, team_2_id) = detect_teams(game_id, events.iter().map(|e| e.primary_team_id))?;
    let periods = split_periods(game_id, events, |e| e.event_type == EventType::PeriodEnd)?
        .into_iter()
        .enumerate()
        .map(|(idx, events)| {
            let period = idx as u32 + 1;
            PeriodOutcome {
                period,
                result: process_period(game_id, period, events, team_1_id, team_2_id, source),
            }
        })
        .collect();

    Ok(finish(game_id, team_1_id, team_2_id, periods))
}

fn finish(
    game_id: &str,
    team_1_id: TeamId,
    team_2_id: TeamId,
    periods: Vec<PeriodOutcome>,
) -> GameMatchups {
    let game = GameMatchups {
        game_id: game_id.to_string(),
        team_1_id,
        team_2_id,
        periods,
    };
    for (period, err) in game.failures() {
        warn!(game_id, period, error = %err, "period skipped");
    }
    info!(
        game_id,
        periods = game.periods.len(),
        matchups = game.records().count(),
        "game processed"
    );
    game
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teams_in_order_of_appearance() {
        let ids = [None, Some(7), Some(7), None, Some(3), Some(7)];
        assert_eq!(detect_teams("g", ids).unwrap(), (7, 3));
    }

    #[test]
    fn one_team_is_a_schema_error() {
        let err = detect_teams("g", [Some(7), None]).unwrap_err();
        assert!(matches!(err, MatchupError::Schema { .. }));
    }

    #[test]
    fn three_teams_is_a_schema_error() {
        assert!(detect_teams("g", [Some(1), Some(2), Some(3)]).is_err());
    }
}
