use std::collections::HashSet;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "lineup_matchups";
const SNAPSHOT_FILE: &str = "matchups.json";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TOP_N: usize = 5;
const DEFAULT_PARALLELISM: usize = 6;

/// Settings shared by the binaries. Environment first, then flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub games: Vec<String>,
    pub top: usize,
    pub parallelism: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = env_non_empty("MATCHUPS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let snapshot_path = env_non_empty("MATCHUPS_SNAPSHOT")
            .map(PathBuf::from)
            .or_else(default_snapshot_path)
            .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE));
        let games = env_non_empty("MATCHUPS_GAMES")
            .map(|raw| parse_game_ids(&raw))
            .unwrap_or_default();
        let top = env_non_empty("MATCHUPS_TOP_N")
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N);
        let parallelism = env_non_empty("MATCHUPS_PARALLELISM")
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARALLELISM)
            .clamp(1, 32);
        Self {
            data_dir,
            snapshot_path,
            games,
            top,
            parallelism,
        }
    }

    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(dir) = arg_value(args, "--data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = arg_value(args, "--snapshot") {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(raw) = arg_value(args, "--games") {
            let games = parse_game_ids(&raw);
            if !games.is_empty() {
                self.games = games;
            }
        }
        if let Some(top) = arg_value(args, "--top").and_then(|raw| raw.parse::<usize>().ok()) {
            self.top = top;
        }
    }
}

/// `--name=value` or `--name value`; blank values are ignored.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn parse_game_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', ';', ' '])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| seen.insert(part.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn default_snapshot_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(SNAPSHOT_FILE))
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loads `.env.local` then `.env` and installs the stderr log subscriber.
/// `RUST_LOG` selects the level, `info` by default.
pub fn init() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_value_in_both_forms() {
        let a = args(&["--top=3", "--data-dir", "/tmp/pbp"]);
        assert_eq!(arg_value(&a, "--top").as_deref(), Some("3"));
        assert_eq!(arg_value(&a, "--data-dir").as_deref(), Some("/tmp/pbp"));
        assert_eq!(arg_value(&a, "--snapshot"), None);
    }

    #[test]
    fn game_ids_are_split_and_deduped() {
        assert_eq!(
            parse_game_ids("0021600001, 0021600002;0021600001 "),
            vec!["0021600001".to_string(), "0021600002".to_string()]
        );
    }

    #[test]
    fn flags_override_settings() {
        let mut cfg = Config {
            data_dir: PathBuf::from("data"),
            snapshot_path: PathBuf::from("snap.json"),
            games: Vec::new(),
            top: 5,
            parallelism: 2,
        };
        cfg.apply_args(&args(&["--games=1,2", "--top", "10", "--snapshot=out.json"]));
        assert_eq!(cfg.games, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(cfg.top, 10);
        assert_eq!(cfg.snapshot_path, PathBuf::from("out.json"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }
}
