use tracing::warn;

use crate::error::{MatchupError, Result};

/// Splits a game's rows into periods. Each period runs from the row after the
/// previous end marker through its own end marker, inclusive. Rows after the
/// last marker belong to no period and are dropped.
pub fn split_periods<'a, T>(
    game_id: &str,
    rows: &'a [T],
    is_period_end: impl Fn(&T) -> bool,
) -> Result<Vec<&'a [T]>> {
    let ends = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| is_period_end(row))
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();

    if ends.is_empty() {
        return Err(MatchupError::MissingPeriodBoundary {
            game_id: game_id.to_string(),
        });
    }

    let mut periods = Vec::with_capacity(ends.len());
    let mut start = 0usize;
    for end in ends {
        periods.push(&rows[start..=end]);
        start = end + 1;
    }

    if start < rows.len() {
        warn!(
            game_id,
            dropped = rows.len() - start,
            "rows after the final period end"
        );
    }

    Ok(periods)
}
