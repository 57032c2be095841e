use tracing::debug;

use crate::box_score::{BoxScoreStats, recompute_plus_minus};
use crate::error::{MatchupError, Result};
use crate::event::{Event, EventType, TeamId};
use crate::matchup::MatchupRecord;

/// The pairing currently on the floor, plus the running state only needed
/// while it is still being built.
#[derive(Debug, Clone)]
struct OpenSegment {
    record: MatchupRecord,
    last_event_clock_seconds: Option<f64>,
    last_team_with_shot_attempt: Option<TeamId>,
}

impl OpenSegment {
    fn new(record: MatchupRecord, clock: Option<f64>) -> Self {
        Self {
            record,
            last_event_clock_seconds: clock,
            last_team_with_shot_attempt: None,
        }
    }

    fn advance_clock(&mut self, clock: f64) {
        if let Some(prev) = self.last_event_clock_seconds {
            let elapsed = prev - clock;
            if elapsed > 0.0 {
                self.record.add_seconds(elapsed);
            } else if elapsed < 0.0 {
                debug!(prev, clock, "game clock moved backwards; no time charged");
            }
        }
        self.last_event_clock_seconds = Some(clock);
    }

    fn apply(&mut self, event: &Event) {
        let team_1 = self.record.team_1_id();
        let team_2 = self.record.team_2_id();
        if let Some(team_id) = acting_team(event, team_1, team_2)
            && let Some((acting, other)) = self.record.sides_mut(team_id)
        {
            accumulate(
                event,
                team_id,
                acting,
                other,
                &mut self.last_team_with_shot_attempt,
            );
        }

        if event.event_type == EventType::PeriodStart {
            self.last_event_clock_seconds = Some(event.clock_seconds);
        } else {
            self.advance_clock(event.clock_seconds);
        }
    }

    fn close(self, out: &mut Vec<MatchupRecord>) {
        let record = self.record;
        if record.seconds_played() > 0.0 {
            debug!(
                matchup = %record.matchup_id(),
                seconds = record.seconds_played(),
                "segment closed"
            );
            out.push(record);
        }
    }
}

/// The team an event is credited to. Team-level rows (a team rebound, a
/// team turnover) carry the team id in the player slot and no team id.
pub fn acting_team(event: &Event, team_1: TeamId, team_2: TeamId) -> Option<TeamId> {
    let is_team = |id: &TeamId| *id == team_1 || *id == team_2;
    event
        .primary_team_id
        .filter(is_team)
        .or_else(|| event.primary_player_id.filter(is_team))
}

pub fn accumulate(
    event: &Event,
    acting_id: TeamId,
    acting: &mut BoxScoreStats,
    other: &mut BoxScoreStats,
    last_team_with_shot_attempt: &mut Option<TeamId>,
) {
    match event.event_type {
        EventType::MadeShot => {
            acting.fgm += 1;
            acting.fga += 1;
            if event.is_three_point_attempt() {
                acting.fg3m += 1;
                acting.fg3a += 1;
                acting.pts += 3;
            } else {
                acting.pts += 2;
            }
            if event.has_secondary_actor() {
                acting.ast += 1;
            }
            acting.recompute_rates();
            recompute_plus_minus(acting, other);
        }
        EventType::MissedShot => {
            acting.fga += 1;
            if event.is_three_point_attempt() {
                acting.fg3a += 1;
            }
            if event.is_blocked() {
                acting.blka += 1;
                other.blk += 1;
            }
            acting.recompute_rates();
            *last_team_with_shot_attempt = Some(acting_id);
        }
        EventType::FreeThrow => {
            acting.fta += 1;
            if !event.is_miss() {
                acting.ftm += 1;
                acting.pts += 1;
                recompute_plus_minus(acting, other);
            }
            acting.recompute_rates();
            *last_team_with_shot_attempt = Some(acting_id);
        }
        EventType::Rebound => {
            acting.reb += 1;
            // Not reset by made baskets: a rebound after the shooting team
            // scores still compares against the last miss or free throw.
            if *last_team_with_shot_attempt == Some(acting_id) {
                acting.oreb += 1;
            } else {
                acting.dreb += 1;
            }
        }
        EventType::Turnover => {
            acting.tov += 1;
            if event.has_secondary_actor() {
                other.stl += 1;
            }
        }
        EventType::Foul => {
            acting.pf += 1;
            other.pfd += 1;
        }
        EventType::Violation
        | EventType::Substitution
        | EventType::Timeout
        | EventType::JumpBall
        | EventType::Ejection
        | EventType::PeriodStart
        | EventType::PeriodEnd
        | EventType::Other(_) => {}
    }
}

/// Walks one period's events from the starting pairing and returns every
/// pairing that was on the floor for a positive amount of time, in order.
pub fn run_period(
    game_id: &str,
    period: u32,
    events: &[Event],
    starters: MatchupRecord,
) -> Result<Vec<MatchupRecord>> {
    let mut closed = Vec::new();
    let mut segment = OpenSegment::new(starters, None);

    for event in events {
        if event.event_type != EventType::Substitution {
            segment.apply(event);
            continue;
        }

        let (Some(out_id), Some(in_id)) = (event.primary_player_id, event.secondary_player_id)
        else {
            return Err(MatchupError::schema(
                game_id,
                format!(
                    "period {period} substitution at {} is missing a player",
                    event.game_clock
                ),
            ));
        };
        segment.advance_clock(event.clock_seconds);
        let next = segment.record.substitute(out_id, in_id).ok_or_else(|| {
            MatchupError::schema(
                game_id,
                format!(
                    "period {period} substitution at {}: {out_id} out, {in_id} in does not fit the floor",
                    event.game_clock
                ),
            )
        })?;
        segment.close(&mut closed);
        segment = OpenSegment::new(next, Some(event.clock_seconds));
    }

    segment.close(&mut closed);
    Ok(closed)
}
