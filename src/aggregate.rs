use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MatchupError, Result};
use crate::game::process_game;
use crate::matchup::{MatchupId, MatchupRecord};
use crate::sources::PlayByPlaySource;
use crate::starters::LineupSource;

/// A game or period that produced no records, kept for reporting and retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub game_id: String,
    pub period: Option<u32>,
    pub error: String,
    pub retryable: bool,
}

impl Failure {
    fn new(game_id: &str, period: Option<u32>, err: &MatchupError) -> Self {
        Self {
            game_id: game_id.to_string(),
            period,
            error: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub records: Vec<MatchupRecord>,
    pub failures: Vec<Failure>,
    /// Games whose records are final. A game with any retryable failure is
    /// left out entirely so a later run can redo it without double counting.
    pub processed: Vec<String>,
}

struct GameResult {
    game_id: String,
    records: Vec<MatchupRecord>,
    failures: Vec<Failure>,
    done: bool,
}

fn collect_one<P, L>(game_id: &str, pbp_source: &P, lineup_source: &L) -> GameResult
where
    P: PlayByPlaySource + ?Sized,
    L: LineupSource,
{
    let failed = |err: MatchupError| GameResult {
        game_id: game_id.to_string(),
        records: Vec::new(),
        done: !err.is_retryable(),
        failures: vec![Failure::new(game_id, None, &err)],
    };

    let pbp = match pbp_source.play_by_play(game_id) {
        Ok(pbp) => pbp,
        Err(err) => return failed(err),
    };
    let game = match process_game(game_id, &pbp, lineup_source) {
        Ok(game) => game,
        Err(err) => return failed(err),
    };

    let failures = game
        .failures()
        .map(|(period, err)| Failure::new(game_id, Some(period), err))
        .collect::<Vec<_>>();
    let done = failures.iter().all(|f| !f.retryable);
    let records = if done { game.into_records() } else { Vec::new() };
    GameResult {
        game_id: game_id.to_string(),
        records,
        failures,
        done,
    }
}

/// Processes each game once, in parallel. Duplicate ids are ignored.
pub fn collect_games<P, L>(game_ids: &[String], pbp_source: &P, lineup_source: &L) -> Collection
where
    P: PlayByPlaySource + Sync + ?Sized,
    L: LineupSource + Sync,
{
    let mut unique = game_ids.to_vec();
    unique.sort();
    unique.dedup();

    let results: Vec<GameResult> = unique
        .par_iter()
        .map(|game_id| collect_one(game_id, pbp_source, lineup_source))
        .collect();

    let mut out = Collection::default();
    for result in results {
        for failure in &result.failures {
            warn!(
                game_id = %failure.game_id,
                period = ?failure.period,
                retryable = failure.retryable,
                "{}",
                failure.error
            );
        }
        out.failures.extend(result.failures);
        out.records.extend(result.records);
        if result.done {
            out.processed.push(result.game_id);
        }
    }
    info!(
        games = unique.len(),
        processed = out.processed.len(),
        records = out.records.len(),
        failures = out.failures.len(),
        "collection finished"
    );
    out
}

fn fold_into(acc: &mut HashMap<MatchupId, MatchupRecord>, record: MatchupRecord) -> Result<()> {
    match acc.entry(record.matchup_id()) {
        Entry::Occupied(mut slot) => slot.get_mut().absorb(&record),
        Entry::Vacant(slot) => {
            slot.insert(record);
            Ok(())
        }
    }
}

/// Merges every record sharing a matchup id. The result is ordered by id.
pub fn aggregate_by_matchup(records: &[MatchupRecord]) -> Result<Vec<MatchupRecord>> {
    let merged = records
        .par_iter()
        .try_fold(HashMap::new, |mut acc, record| {
            fold_into(&mut acc, record.clone())?;
            Ok::<_, MatchupError>(acc)
        })
        .try_reduce(HashMap::new, |mut left, right| {
            for record in right.into_values() {
                fold_into(&mut left, record)?;
            }
            Ok(left)
        })?;

    let mut out = merged.into_values().collect::<Vec<_>>();
    out.sort_by_key(MatchupRecord::matchup_id);
    Ok(out)
}

pub fn rank_by_seconds(mut records: Vec<MatchupRecord>, top: usize) -> Vec<MatchupRecord> {
    records.sort_by(|a, b| {
        b.seconds_played()
            .total_cmp(&a.seconds_played())
            .then(a.matchup_id().cmp(&b.matchup_id()))
    });
    records.truncate(top);
    records
}

pub fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

pub fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(game_id: &str, fifth: u64, seconds: f64) -> MatchupRecord {
        let mut r = MatchupRecord::new(game_id, 1, vec![1, 2, 3, 4, fifth], 2, vec![6, 7, 8, 9, 10]);
        r.add_seconds(seconds);
        r
    }

    #[test]
    fn groups_by_identity() {
        let records = vec![
            rec("g1", 5, 60.0),
            rec("g2", 5, 30.0),
            rec("g1", 11, 10.0),
            rec("g3", 5, 15.0),
        ];
        let merged = aggregate_by_matchup(&records).unwrap();
        assert_eq!(merged.len(), 2);
        let big = merged.iter().find(|r| r.games_played() == 3).unwrap();
        assert_eq!(big.seconds_played(), 105.0);
    }

    #[test]
    fn ranking_orders_by_time() {
        let ranked = rank_by_seconds(vec![rec("g", 5, 10.0), rec("g", 11, 50.0)], 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].seconds_played(), 50.0);
    }
}
