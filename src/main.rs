use anyhow::{Context, Result, anyhow};
use tracing::info;

use lineup_matchups::aggregate::{build_pool, collect_games, with_pool};
use lineup_matchups::config::{self, Config};
use lineup_matchups::persist;
use lineup_matchups::sources::DataDir;

fn main() -> Result<()> {
    config::init();

    let mut cfg = Config::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    cfg.apply_args(&args);

    let data = DataDir::new(&cfg.data_dir);
    let requested = if cfg.games.is_empty() {
        data.game_ids()
            .context("no --games given and play-by-play dir unreadable")?
    } else {
        cfg.games.clone()
    };
    if requested.is_empty() {
        return Err(anyhow!("no games to process in {}", cfg.data_dir.display()));
    }

    let mut snapshot = persist::load(&cfg.snapshot_path)?.unwrap_or_default();
    let pending = snapshot.pending(&requested);
    info!(
        requested = requested.len(),
        pending = pending.len(),
        snapshot = %cfg.snapshot_path.display(),
        "collecting matchups"
    );

    let pool = build_pool(cfg.parallelism);
    let collection = with_pool(&pool, || collect_games(&pending, &data, &data));
    let new_records = collection.records.len();
    snapshot.extend(&pending, collection);
    persist::save(&cfg.snapshot_path, &mut snapshot)?;

    println!("Matchup collection complete");
    println!("Snapshot: {}", cfg.snapshot_path.display());
    println!(
        "Games: {}/{} processed",
        snapshot.processed_games.len(),
        requested.len()
    );
    println!("Records added: {new_records}");
    println!("Records total: {}", snapshot.records.len());
    if !snapshot.failures.is_empty() {
        println!("Failures: {}", snapshot.failures.len());
        for failure in snapshot.failures.iter().take(10) {
            let period = failure
                .period
                .map(|p| format!(" period {p}"))
                .unwrap_or_default();
            let retry = if failure.retryable { " (retryable)" } else { "" };
            println!("  - {}{period}: {}{retry}", failure.game_id, failure.error);
        }
    }

    Ok(())
}
