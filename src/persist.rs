use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Collection, Failure};
use crate::matchup::MatchupRecord;

const SNAPSHOT_VERSION: u32 = 1;

/// Per-segment records collected so far, plus which games they cover so a
/// rerun can pick up where the last one stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub processed_games: BTreeSet<String>,
    #[serde(default)]
    pub records: Vec<MatchupRecord>,
    #[serde(default)]
    pub failures: Vec<Failure>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            generated_at: None,
            processed_games: BTreeSet::new(),
            records: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn pending(&self, game_ids: &[String]) -> Vec<String> {
        game_ids
            .iter()
            .filter(|id| !self.processed_games.contains(*id))
            .cloned()
            .collect()
    }

    /// Adds a collection run over `attempted`. Earlier failures for those
    /// games are replaced by the run's own.
    pub fn extend(&mut self, attempted: &[String], collection: Collection) {
        self.failures
            .retain(|f| !attempted.iter().any(|id| *id == f.game_id));
        self.failures.extend(collection.failures);
        for game_id in collection.processed {
            self.processed_games.insert(game_id);
        }
        self.records.extend(collection.records);
    }
}

pub fn load(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw).context("parse snapshot")?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(anyhow!(
            "snapshot {} has version {}, expected {}",
            path.display(),
            snapshot.version,
            SNAPSHOT_VERSION
        ));
    }
    Ok(Some(snapshot))
}

pub fn save(path: &Path, snapshot: &mut Snapshot) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    snapshot.version = SNAPSHOT_VERSION;
    snapshot.generated_at = Some(Utc::now().to_rfc3339());
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(snapshot).context("serialize snapshot")?;
    fs::write(&tmp, json).context("write snapshot")?;
    fs::rename(&tmp, path).context("swap snapshot")?;
    Ok(())
}
