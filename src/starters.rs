use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{MatchupError, Result};
use crate::event::{Event, EventType, PlayerId, TeamId};
use crate::matchup::{MatchupRecord, PLAYERS_PER_SIDE};

/// Five-player combinations a team used during one period, each as a
/// delimited string of player ids (`"1 - 2 - 3 - 4 - 5"` or `"-1-2-3-4-5-"`).
pub trait LineupSource {
    fn lineup_combinations(
        &self,
        game_id: &str,
        team_id: TeamId,
        period: u32,
    ) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoLineupSource;

impl LineupSource for NoLineupSource {
    fn lineup_combinations(&self, game_id: &str, team_id: TeamId, period: u32) -> Result<Vec<String>> {
        Err(MatchupError::ExternalSourceUnavailable(format!(
            "no lineup data for game {game_id} team {team_id} period {period}"
        )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticLineupSource {
    combinations: HashMap<(String, TeamId, u32), Vec<String>>,
}

impl StaticLineupSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, game_id: &str, team_id: TeamId, period: u32, groups: &[&str]) {
        self.combinations.insert(
            (game_id.to_string(), team_id, period),
            groups.iter().map(|g| g.to_string()).collect(),
        );
    }
}

impl LineupSource for StaticLineupSource {
    fn lineup_combinations(&self, game_id: &str, team_id: TeamId, period: u32) -> Result<Vec<String>> {
        self.combinations
            .get(&(game_id.to_string(), team_id, period))
            .cloned()
            .ok_or_else(|| {
                MatchupError::ExternalSourceUnavailable(format!(
                    "no lineup data for game {game_id} team {team_id} period {period}"
                ))
            })
    }
}

pub fn parse_lineup_group(raw: &str) -> Option<Vec<PlayerId>> {
    let ids = raw
        .split('-')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<PlayerId>().ok())
        .collect::<Option<Vec<_>>>()?;
    if ids.is_empty() { None } else { Some(ids) }
}

/// Players present in every combination, in the order of the first one.
pub fn common_players(game_id: &str, groups: &[String]) -> Result<Vec<PlayerId>> {
    let parsed = groups
        .iter()
        .map(|g| {
            parse_lineup_group(g)
                .ok_or_else(|| MatchupError::schema(game_id, format!("bad lineup group {g:?}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let Some((first, rest)) = parsed.split_first() else {
        return Ok(Vec::new());
    };
    let rest = rest
        .iter()
        .map(|ids| ids.iter().copied().collect::<HashSet<_>>())
        .collect::<Vec<_>>();

    let mut out = Vec::new();
    for id in first {
        if rest.iter().all(|set| set.contains(id)) && !out.contains(id) {
            out.push(*id);
        }
    }
    Ok(out)
}

/// Works out the ten players on the floor when a period begins.
///
/// A player who is subbed out before ever being subbed in during the period
/// must have started it. Teams with fewer than five such players are topped up
/// from the players common to every lineup the source lists for that period.
pub fn resolve_starters(
    game_id: &str,
    period: u32,
    events: &[Event],
    team_1_id: TeamId,
    team_2_id: TeamId,
    source: &dyn LineupSource,
) -> Result<MatchupRecord> {
    let mut team_1 = Vec::new();
    let mut team_2 = Vec::new();
    let mut subbed_in = HashSet::new();

    for sub in events
        .iter()
        .filter(|e| e.event_type == EventType::Substitution)
    {
        let (Some(out_id), Some(in_id)) = (sub.primary_player_id, sub.secondary_player_id) else {
            return Err(MatchupError::schema(
                game_id,
                format!("substitution at {} is missing a player", sub.game_clock),
            ));
        };
        let starters = match sub.primary_team_id {
            Some(id) if id == team_1_id => &mut team_1,
            Some(id) if id == team_2_id => &mut team_2,
            other => {
                return Err(MatchupError::schema(
                    game_id,
                    format!("substitution for unknown team {other:?}"),
                ));
            }
        };
        if !subbed_in.contains(&out_id) && !starters.contains(&out_id) {
            starters.push(out_id);
        }
        subbed_in.insert(in_id);
    }

    for (team_id, starters) in [(team_1_id, &mut team_1), (team_2_id, &mut team_2)] {
        if starters.len() < PLAYERS_PER_SIDE {
            debug!(
                game_id,
                team_id,
                period,
                inferred = starters.len(),
                "filling starters from lineup combinations"
            );
            let groups = source.lineup_combinations(game_id, team_id, period)?;
            for id in common_players(game_id, &groups)? {
                if !starters.contains(&id) {
                    starters.push(id);
                }
            }
        }
        if starters.len() != PLAYERS_PER_SIDE {
            return Err(MatchupError::IncompleteLineup {
                game_id: game_id.to_string(),
                team_id,
                period,
                found: starters.len(),
            });
        }
    }

    let record = MatchupRecord::new(game_id, team_1_id, team_1, team_2_id, team_2);
    if !record.has_full_rosters() {
        return Err(MatchupError::schema(
            game_id,
            format!("period {period} starters appear on both teams"),
        ));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: &str = "0021600001";

    fn sub(team: TeamId, out_id: PlayerId, in_id: PlayerId, clock: &str) -> Event {
        Event::new(G, EventType::Substitution, clock)
            .unwrap()
            .with_primary(out_id, team)
            .with_secondary(in_id, team)
    }

    #[test]
    fn parses_both_group_formats() {
        assert_eq!(parse_lineup_group("1 - 2 - 3 - 4 - 5"), Some(vec![1, 2, 3, 4, 5]));
        assert_eq!(parse_lineup_group("-1-2-3-4-5-"), Some(vec![1, 2, 3, 4, 5]));
        assert_eq!(parse_lineup_group("1 - x"), None);
        assert_eq!(parse_lineup_group(""), None);
    }

    #[test]
    fn intersection_keeps_players_in_every_group() {
        let groups = vec![
            "1 - 2 - 3 - 4 - 5".to_string(),
            "1 - 2 - 3 - 4 - 6".to_string(),
            "2 - 3 - 1 - 7 - 8".to_string(),
        ];
        assert_eq!(common_players(G, &groups).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn later_entrants_are_never_starters() {
        let events = vec![
            sub(100, 1, 11, "10:00"),
            sub(100, 11, 12, "9:00"),
            sub(100, 2, 13, "8:00"),
            sub(100, 3, 14, "7:00"),
            sub(100, 4, 15, "6:00"),
            sub(100, 5, 16, "5:00"),
            sub(200, 6, 21, "10:00"),
            sub(200, 7, 22, "9:00"),
            sub(200, 8, 23, "8:00"),
            sub(200, 9, 24, "7:00"),
            sub(200, 10, 25, "6:00"),
        ];
        let record = resolve_starters(G, 1, &events, 100, 200, &NoLineupSource).unwrap();
        assert_eq!(record.team_1_players(), &[1, 2, 3, 4, 5]);
        assert_eq!(record.team_2_players(), &[6, 7, 8, 9, 10]);
    }

    #[test]
    fn short_team_is_filled_from_source() {
        let events = vec![
            sub(100, 1, 11, "10:00"),
            sub(100, 2, 12, "9:00"),
            sub(100, 3, 13, "9:00"),
            sub(100, 4, 14, "8:00"),
            sub(100, 5, 15, "8:00"),
            sub(200, 6, 21, "7:00"),
        ];
        let mut source = StaticLineupSource::new();
        source.insert(
            G,
            200,
            1,
            &["6 - 7 - 8 - 9 - 10", "21 - 7 - 8 - 9 - 10"],
        );
        let record = resolve_starters(G, 1, &events, 100, 200, &source).unwrap();
        assert_eq!(record.team_2_players(), &[6, 7, 8, 9, 10]);
        assert!(record.has_full_rosters());
    }

    #[test]
    fn thin_intersection_is_an_incomplete_lineup() {
        let events = vec![sub(100, 1, 11, "10:00")];
        let mut source = StaticLineupSource::new();
        source.insert(G, 100, 2, &["1 - 2 - 3 - 4 - 5", "11 - 2 - 3 - 6 - 7"]);
        source.insert(G, 200, 2, &["21 - 22 - 23 - 24 - 25"]);
        let err = resolve_starters(G, 2, &events, 100, 200, &source).unwrap_err();
        assert_eq!(
            err,
            MatchupError::IncompleteLineup {
                game_id: G.to_string(),
                team_id: 100,
                period: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn missing_source_data_is_retryable() {
        let err = resolve_starters(G, 3, &[], 100, 200, &NoLineupSource).unwrap_err();
        assert!(err.is_retryable());
    }
}
