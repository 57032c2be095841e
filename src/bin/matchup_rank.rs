use anyhow::{Context, Result};

use lineup_matchups::aggregate::{aggregate_by_matchup, rank_by_seconds};
use lineup_matchups::box_score::BoxScoreStats;
use lineup_matchups::config::{self, Config};
use lineup_matchups::persist;

fn main() -> Result<()> {
    config::init();

    let mut cfg = Config::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    cfg.apply_args(&args);

    let snapshot = persist::load(&cfg.snapshot_path)?
        .with_context(|| format!("no snapshot at {}", cfg.snapshot_path.display()))?;

    let merged = aggregate_by_matchup(&snapshot.records).context("merge matchups")?;
    println!(
        "{} segment records -> {} distinct matchups over {} games",
        snapshot.records.len(),
        merged.len(),
        snapshot.processed_games.len()
    );
    println!();

    for (rank, m) in rank_by_seconds(merged, cfg.top).iter().enumerate() {
        println!(
            "#{} matchup {}  {:.1} min  {} games  {:.1} poss",
            rank + 1,
            m.matchup_id(),
            m.minutes_played(),
            m.games_played(),
            m.possessions()
        );
        print_side(m.team_1_id(), m.team_1_players(), m.team_1_stats());
        print_side(m.team_2_id(), m.team_2_players(), m.team_2_stats());
        println!();
    }

    Ok(())
}

fn print_side(team_id: u64, players: &[u64], s: &BoxScoreStats) {
    let players = players
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" - ");
    println!("  team {team_id} [{players}]");
    println!(
        "    PTS {} ({:+})  FG {}/{} {:.3}  3P {}/{} {:.3}  FT {}/{} {:.3}",
        s.pts, s.plus_minus, s.fgm, s.fga, s.fg_pct, s.fg3m, s.fg3a, s.fg3_pct, s.ftm, s.fta, s.ft_pct
    );
    println!(
        "    REB {} (O {} D {})  AST {}  TOV {}  STL {}  BLK {}  BLKA {}  PF {}  PFD {}",
        s.reb, s.oreb, s.dreb, s.ast, s.tov, s.stl, s.blk, s.blka, s.pf, s.pfd
    );
}
