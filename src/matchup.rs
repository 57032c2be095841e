use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::box_score::{BoxScoreStats, recompute_plus_minus};
use crate::error::{MatchupError, Result};
use crate::event::{PlayerId, TeamId};

pub const PLAYERS_PER_SIDE: usize = 5;

/// SHA-256 over the sorted ids of all ten players, first 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupId(pub u64);

impl MatchupId {
    pub fn from_players<I>(players: I) -> Self
    where
        I: IntoIterator<Item = PlayerId>,
    {
        let mut sorted = players.into_iter().collect::<Vec<_>>();
        sorted.sort_unstable();
        let mut hasher = Sha256::new();
        for id in sorted {
            hasher.update(id.to_be_bytes());
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        MatchupId(u64::from_be_bytes(head))
    }
}

impl fmt::Display for MatchupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    matchup_id: MatchupId,
    team_1_id: TeamId,
    team_1_player_ids: Vec<PlayerId>,
    team_2_id: TeamId,
    team_2_player_ids: Vec<PlayerId>,
    team_1_stats: BoxScoreStats,
    team_2_stats: BoxScoreStats,
    game_ids: BTreeSet<String>,
    games_played: usize,
    seconds_played: f64,
    minutes_played: f64,
}

impl MatchupRecord {
    pub fn new(
        game_id: &str,
        team_1_id: TeamId,
        team_1_player_ids: Vec<PlayerId>,
        team_2_id: TeamId,
        team_2_player_ids: Vec<PlayerId>,
    ) -> Self {
        let matchup_id = MatchupId::from_players(
            team_1_player_ids
                .iter()
                .chain(team_2_player_ids.iter())
                .copied(),
        );
        Self {
            matchup_id,
            team_1_id,
            team_1_player_ids,
            team_2_id,
            team_2_player_ids,
            team_1_stats: BoxScoreStats::default(),
            team_2_stats: BoxScoreStats::default(),
            game_ids: BTreeSet::from([game_id.to_string()]),
            games_played: 1,
            seconds_played: 0.0,
            minutes_played: 0.0,
        }
    }

    pub fn matchup_id(&self) -> MatchupId {
        self.matchup_id
    }

    pub fn team_1_id(&self) -> TeamId {
        self.team_1_id
    }

    pub fn team_2_id(&self) -> TeamId {
        self.team_2_id
    }

    pub fn team_1_players(&self) -> &[PlayerId] {
        &self.team_1_player_ids
    }

    pub fn team_2_players(&self) -> &[PlayerId] {
        &self.team_2_player_ids
    }

    pub fn team_1_stats(&self) -> &BoxScoreStats {
        &self.team_1_stats
    }

    pub fn team_2_stats(&self) -> &BoxScoreStats {
        &self.team_2_stats
    }

    pub fn players_for(&self, team_id: TeamId) -> Option<&[PlayerId]> {
        if team_id == self.team_1_id {
            Some(&self.team_1_player_ids)
        } else if team_id == self.team_2_id {
            Some(&self.team_2_player_ids)
        } else {
            None
        }
    }

    pub fn stats_for(&self, team_id: TeamId) -> Option<&BoxScoreStats> {
        if team_id == self.team_1_id {
            Some(&self.team_1_stats)
        } else if team_id == self.team_2_id {
            Some(&self.team_2_stats)
        } else {
            None
        }
    }

    // Call refresh_derived after editing counters.
    pub fn stats_for_mut(&mut self, team_id: TeamId) -> Option<&mut BoxScoreStats> {
        if team_id == self.team_1_id {
            Some(&mut self.team_1_stats)
        } else if team_id == self.team_2_id {
            Some(&mut self.team_2_stats)
        } else {
            None
        }
    }

    pub(crate) fn sides_mut(
        &mut self,
        team_id: TeamId,
    ) -> Option<(&mut BoxScoreStats, &mut BoxScoreStats)> {
        if team_id == self.team_1_id {
            Some((&mut self.team_1_stats, &mut self.team_2_stats))
        } else if team_id == self.team_2_id {
            Some((&mut self.team_2_stats, &mut self.team_1_stats))
        } else {
            None
        }
    }

    pub fn game_ids(&self) -> &BTreeSet<String> {
        &self.game_ids
    }

    pub fn games_played(&self) -> usize {
        self.games_played
    }

    pub fn seconds_played(&self) -> f64 {
        self.seconds_played
    }

    pub fn minutes_played(&self) -> f64 {
        self.minutes_played
    }

    pub(crate) fn add_seconds(&mut self, seconds: f64) {
        self.seconds_played += seconds;
        self.minutes_played = round_minutes(self.seconds_played);
    }

    pub fn has_full_rosters(&self) -> bool {
        let team_1 = self.team_1_player_ids.iter().collect::<HashSet<_>>();
        let team_2 = self.team_2_player_ids.iter().collect::<HashSet<_>>();
        self.team_1_player_ids.len() == PLAYERS_PER_SIDE
            && self.team_2_player_ids.len() == PLAYERS_PER_SIDE
            && team_1.len() == PLAYERS_PER_SIDE
            && team_2.len() == PLAYERS_PER_SIDE
            && team_1.is_disjoint(&team_2)
    }

    pub fn is_on_floor(&self, player_id: PlayerId) -> bool {
        self.team_1_player_ids.contains(&player_id) || self.team_2_player_ids.contains(&player_id)
    }

    /// `None` when `out_id` is not on the floor or `in_id` already is.
    pub fn substitute(&self, out_id: PlayerId, in_id: PlayerId) -> Option<MatchupRecord> {
        if self.is_on_floor(in_id) {
            return None;
        }
        let mut team_1 = self.team_1_player_ids.clone();
        let mut team_2 = self.team_2_player_ids.clone();
        let roster = if team_1.contains(&out_id) {
            &mut team_1
        } else if team_2.contains(&out_id) {
            &mut team_2
        } else {
            return None;
        };
        let slot = roster.iter().position(|id| *id == out_id)?;
        roster[slot] = in_id;

        let game_id = self.game_ids.iter().next().map(String::as_str).unwrap_or_default();
        Some(MatchupRecord::new(
            game_id,
            self.team_1_id,
            team_1,
            self.team_2_id,
            team_2,
        ))
    }

    pub fn refresh_derived(&mut self) {
        self.team_1_stats.recompute_rates();
        self.team_2_stats.recompute_rates();
        recompute_plus_minus(&mut self.team_1_stats, &mut self.team_2_stats);
        self.games_played = self.game_ids.len();
        self.minutes_played = round_minutes(self.seconds_played);
    }

    /// Sides are matched by team id, not by position.
    pub fn absorb(&mut self, other: &MatchupRecord) -> Result<()> {
        if self.matchup_id != other.matchup_id {
            return Err(MatchupError::IdentityMismatch {
                left: self.matchup_id,
                right: other.matchup_id,
            });
        }

        if other.team_1_id == self.team_1_id {
            self.team_1_stats.absorb(&other.team_1_stats);
            self.team_2_stats.absorb(&other.team_2_stats);
        } else {
            self.team_1_stats.absorb(&other.team_2_stats);
            self.team_2_stats.absorb(&other.team_1_stats);
        }

        self.game_ids.extend(other.game_ids.iter().cloned());
        self.seconds_played += other.seconds_played;
        self.refresh_derived();
        Ok(())
    }

    pub fn merge(mut self, other: &MatchupRecord) -> Result<MatchupRecord> {
        self.absorb(other)?;
        Ok(self)
    }

    pub fn possessions(&self) -> f64 {
        (self.team_1_stats.possessions_used() + self.team_2_stats.possessions_used()) / 2.0
    }
}

fn round_minutes(seconds: f64) -> f64 {
    (seconds / 60.0 * 10.0).round() / 10.0
}
