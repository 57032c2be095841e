use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MatchupError, Result};

pub type PlayerId = u64;
pub type TeamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    MadeShot,
    MissedShot,
    FreeThrow,
    Rebound,
    Turnover,
    Foul,
    Violation,
    Substitution,
    Timeout,
    JumpBall,
    Ejection,
    PeriodStart,
    PeriodEnd,
    Other(i64),
}

impl EventType {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => EventType::MadeShot,
            2 => EventType::MissedShot,
            3 => EventType::FreeThrow,
            4 => EventType::Rebound,
            5 => EventType::Turnover,
            6 => EventType::Foul,
            7 => EventType::Violation,
            8 => EventType::Substitution,
            9 => EventType::Timeout,
            10 => EventType::JumpBall,
            11 => EventType::Ejection,
            12 => EventType::PeriodStart,
            13 => EventType::PeriodEnd,
            other => EventType::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            EventType::MadeShot => 1,
            EventType::MissedShot => 2,
            EventType::FreeThrow => 3,
            EventType::Rebound => 4,
            EventType::Turnover => 5,
            EventType::Foul => 6,
            EventType::Violation => 7,
            EventType::Substitution => 8,
            EventType::Timeout => 9,
            EventType::JumpBall => 10,
            EventType::Ejection => 11,
            EventType::PeriodStart => 12,
            EventType::PeriodEnd => 13,
            EventType::Other(code) => code,
        }
    }
}

// Substitutions: primary leaves, secondary enters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub game_id: String,
    pub event_type: EventType,
    pub primary_player_id: Option<PlayerId>,
    pub primary_team_id: Option<TeamId>,
    pub secondary_player_id: Option<PlayerId>,
    pub secondary_team_id: Option<TeamId>,
    pub game_clock: String,
    pub clock_seconds: f64,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
}

impl Event {
    pub fn new(game_id: &str, event_type: EventType, game_clock: &str) -> Option<Self> {
        let clock_seconds = parse_clock(game_clock)?;
        Some(Self {
            game_id: game_id.to_string(),
            event_type,
            primary_player_id: None,
            primary_team_id: None,
            secondary_player_id: None,
            secondary_team_id: None,
            game_clock: game_clock.to_string(),
            clock_seconds,
            description_primary: None,
            description_secondary: None,
        })
    }

    pub fn with_primary(mut self, player_id: PlayerId, team_id: TeamId) -> Self {
        self.primary_player_id = Some(player_id);
        self.primary_team_id = Some(team_id);
        self
    }

    pub fn with_secondary(mut self, player_id: PlayerId, team_id: TeamId) -> Self {
        self.secondary_player_id = Some(player_id);
        self.secondary_team_id = Some(team_id);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description_primary = Some(text.to_string());
        self
    }

    pub fn with_secondary_description(mut self, text: &str) -> Self {
        self.description_secondary = Some(text.to_string());
        self
    }

    // Shooter and defender text sit in different columns depending on who is home.
    pub fn mentions(&self, marker: &str) -> bool {
        [&self.description_primary, &self.description_secondary]
            .into_iter()
            .flatten()
            .any(|text| text.contains(marker))
    }

    pub fn is_three_point_attempt(&self) -> bool {
        self.mentions("3PT")
    }

    pub fn is_miss(&self) -> bool {
        self.mentions("MISS")
    }

    pub fn is_blocked(&self) -> bool {
        self.mentions("BLK")
    }

    pub fn has_secondary_actor(&self) -> bool {
        self.secondary_player_id.is_some() && self.secondary_team_id.is_some()
    }
}

/// `m:ss` or `m:ss.s` to seconds remaining.
pub fn parse_clock(raw: &str) -> Option<f64> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes = minutes.trim().parse::<u32>().ok()?;
    let seconds = seconds.trim().parse::<f64>().ok()?;
    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let total = f64::from(minutes) * 60.0 + seconds;
    Some((total * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSchema {
    pub game_id: usize,
    pub event_type: usize,
    pub clock: usize,
    pub home_description: usize,
    pub visitor_description: usize,
    pub player_1_id: usize,
    pub player_1_team_id: usize,
    pub player_2_id: usize,
    pub player_2_team_id: usize,
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            game_id: 0,
            event_type: 2,
            clock: 6,
            home_description: 7,
            visitor_description: 9,
            player_1_id: 13,
            player_1_team_id: 15,
            player_2_id: 20,
            player_2_team_id: 22,
        }
    }
}

impl RowSchema {
    /// Missing headers keep their default position.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut schema = Self::default();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let slots: [(&str, &mut usize); 9] = [
            ("GAME_ID", &mut schema.game_id),
            ("EVENTMSGTYPE", &mut schema.event_type),
            ("PCTIMESTRING", &mut schema.clock),
            ("HOMEDESCRIPTION", &mut schema.home_description),
            ("VISITORDESCRIPTION", &mut schema.visitor_description),
            ("PLAYER1_ID", &mut schema.player_1_id),
            ("PLAYER1_TEAM_ID", &mut schema.player_1_team_id),
            ("PLAYER2_ID", &mut schema.player_2_id),
            ("PLAYER2_TEAM_ID", &mut schema.player_2_team_id),
        ];
        for (name, slot) in slots {
            if let Some(idx) = find(name) {
                *slot = idx;
            }
        }
        schema
    }

    fn width(&self) -> usize {
        [
            self.game_id,
            self.event_type,
            self.clock,
            self.home_description,
            self.visitor_description,
            self.player_1_id,
            self.player_1_team_id,
            self.player_2_id,
            self.player_2_team_id,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }

    pub fn event_type(&self, row: &[Value]) -> Option<EventType> {
        row.get(self.event_type)
            .and_then(as_i64_any)
            .map(EventType::from_code)
    }

    pub fn primary_team_id(&self, row: &[Value]) -> Option<TeamId> {
        row.get(self.player_1_team_id).and_then(as_id)
    }

    pub fn parse(&self, row: &[Value]) -> Result<Event> {
        let game_id = row
            .get(self.game_id)
            .and_then(as_string_any)
            .unwrap_or_default();
        if row.len() < self.width() {
            return Err(MatchupError::schema(
                &game_id,
                format!("row has {} columns, expected {}", row.len(), self.width()),
            ));
        }
        if game_id.is_empty() {
            return Err(MatchupError::schema(&game_id, "row has no game id"));
        }

        let event_type = self
            .event_type(row)
            .ok_or_else(|| MatchupError::schema(&game_id, "event type is not an integer"))?;

        let game_clock = row[self.clock].as_str().unwrap_or_default().to_string();
        let clock_seconds = parse_clock(&game_clock).ok_or_else(|| {
            MatchupError::schema(&game_id, format!("unreadable game clock {:?}", row[self.clock]))
        })?;

        let id_at = |idx: usize, label: &str| -> Result<Option<u64>> {
            let value = &row[idx];
            if value.is_null() {
                return Ok(None);
            }
            match as_u64_any(value) {
                Some(0) => Ok(None),
                Some(id) => Ok(Some(id)),
                None => Err(MatchupError::schema(
                    &game_id,
                    format!("{label} is not an id: {value}"),
                )),
            }
        };

        let primary_player_id = id_at(self.player_1_id, "player 1 id")?;
        let primary_team_id = id_at(self.player_1_team_id, "player 1 team id")?;
        let secondary_player_id = id_at(self.player_2_id, "player 2 id")?;
        let secondary_team_id = id_at(self.player_2_team_id, "player 2 team id")?;

        Ok(Event {
            primary_player_id,
            primary_team_id,
            secondary_player_id,
            secondary_team_id,
            description_primary: non_empty_str(&row[self.home_description]),
            description_secondary: non_empty_str(&row[self.visitor_description]),
            game_id,
            event_type,
            game_clock,
            clock_seconds,
        })
    }
}

fn non_empty_str(v: &Value) -> Option<String> {
    let s = v.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

fn as_u64_any(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 {
            return Some(f as u64);
        }
        return None;
    }
    v.as_str()?.trim().parse::<u64>().ok()
}

fn as_id(v: &Value) -> Option<u64> {
    as_u64_any(v).filter(|id| *id != 0)
}

fn as_string_any(v: &Value) -> Option<String> {
    if let Some(s) = v.as_str() {
        return Some(s.trim().to_string());
    }
    v.as_u64().map(|n| n.to_string())
}
