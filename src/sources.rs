use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{MatchupError, Result};
use crate::event::TeamId;
use crate::game::PlayByPlay;
use crate::starters::LineupSource;

const PBP_DIR: &str = "pbp";
const LINEUP_DIR: &str = "lineups";
const PBP_RESULT_SET: usize = 0;
const LINEUP_RESULT_SET: usize = 1;
const LINEUP_GROUP_COLUMN: usize = 1;

pub trait PlayByPlaySource {
    fn play_by_play(&self, game_id: &str) -> Result<PlayByPlay>;
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

fn parse_result_set(raw: &str, index: usize) -> anyhow::Result<ResultSet> {
    let resp: StatsResponse = serde_json::from_str(raw).context("invalid stats json")?;
    resp.result_sets
        .into_iter()
        .nth(index)
        .ok_or_else(|| anyhow!("missing result set {index}"))
}

/// Play-by-play from a saved `playbyplayv2` response body.
pub fn parse_play_by_play_json(raw: &str) -> anyhow::Result<PlayByPlay> {
    let set = parse_result_set(raw, PBP_RESULT_SET)?;
    Ok(PlayByPlay {
        headers: set.headers,
        rows: set.row_set,
    })
}

/// Lineup group ids from a saved `teamdashlineups` response body.
pub fn parse_lineup_groups_json(raw: &str) -> anyhow::Result<Vec<String>> {
    let set = parse_result_set(raw, LINEUP_RESULT_SET)?;
    let column = set
        .headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("GROUP_ID"))
        .unwrap_or(LINEUP_GROUP_COLUMN);
    set.row_set
        .iter()
        .map(|row| {
            row.get(column)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("lineup row without group id"))
        })
        .collect()
}

/// Saved service responses laid out as
/// `<root>/pbp/<game_id>.json` and
/// `<root>/lineups/<game_id>_<team_id>_<period>.json`.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pbp_path(&self, game_id: &str) -> PathBuf {
        self.root.join(PBP_DIR).join(format!("{game_id}.json"))
    }

    pub fn lineup_path(&self, game_id: &str, team_id: TeamId, period: u32) -> PathBuf {
        self.root
            .join(LINEUP_DIR)
            .join(format!("{game_id}_{team_id}_{period}.json"))
    }

    pub fn game_ids(&self) -> anyhow::Result<Vec<String>> {
        let dir = self.root.join(PBP_DIR);
        let entries =
            fs::read_dir(&dir).with_context(|| format!("read play-by-play dir {}", dir.display()))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.context("read dir entry")?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read(path: &Path) -> anyhow::Result<String> {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
    }
}

impl PlayByPlaySource for DataDir {
    fn play_by_play(&self, game_id: &str) -> Result<PlayByPlay> {
        Self::read(&self.pbp_path(game_id))
            .and_then(|raw| parse_play_by_play_json(&raw))
            .map_err(|err| MatchupError::ExternalSourceUnavailable(format!("{err:#}")))
    }
}

impl LineupSource for DataDir {
    fn lineup_combinations(&self, game_id: &str, team_id: TeamId, period: u32) -> Result<Vec<String>> {
        Self::read(&self.lineup_path(game_id, team_id, period))
            .and_then(|raw| parse_lineup_groups_json(&raw))
            .map_err(|err| MatchupError::ExternalSourceUnavailable(format!("{err:#}")))
    }
}
