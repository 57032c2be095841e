use lineup_matchups::MatchupError;
use lineup_matchups::aggregate::aggregate_by_matchup;
use lineup_matchups::matchup::{MatchupId, MatchupRecord};

const HOME: u64 = 1610612744;
const AWAY: u64 = 1610612739;

fn record(game_id: &str, fga: u32, fgm: u32) -> MatchupRecord {
    let mut r = MatchupRecord::new(
        game_id,
        HOME,
        vec![201939, 203110, 2738, 201142, 202691],
        AWAY,
        vec![2544, 202681, 201567, 202684, 2747],
    );
    let stats = r.stats_for_mut(HOME).expect("home side");
    stats.fga = fga;
    stats.fgm = fgm;
    stats.pts = fgm * 2;
    r.refresh_derived();
    r
}

/// Same players with the teams and roster order flipped.
fn flipped(game_id: &str, fta: u32, ftm: u32) -> MatchupRecord {
    let mut r = MatchupRecord::new(
        game_id,
        AWAY,
        vec![2747, 202684, 201567, 202681, 2544],
        HOME,
        vec![202691, 201142, 2738, 203110, 201939],
    );
    let stats = r.stats_for_mut(AWAY).expect("away side");
    stats.fta = fta;
    stats.ftm = ftm;
    stats.pts = ftm;
    r.refresh_derived();
    r
}

#[test]
fn merging_two_games_rederives_percentages() {
    let a = record("0021600001", 10, 4);
    let b = record("0021600002", 8, 5);
    assert_eq!(a.stats_for(HOME).unwrap().fg_pct, 0.4);
    assert_eq!(b.stats_for(HOME).unwrap().fg_pct, 0.625);

    let merged = a.merge(&b).expect("same matchup");
    let home = merged.stats_for(HOME).unwrap();
    assert_eq!(home.fga, 18);
    assert_eq!(home.fgm, 9);
    assert_eq!(home.fg_pct, 0.5);
    assert_eq!(merged.games_played(), 2);
    assert_eq!(merged.game_ids().len(), 2);
}

#[test]
fn merge_is_commutative_per_team() {
    let a = record("0021600001", 10, 4);
    let b = flipped("0021600002", 7, 5);

    let ab = a.clone().merge(&b).expect("same matchup");
    let ba = b.merge(&a).expect("same matchup");

    for team in [HOME, AWAY] {
        let left = ab.stats_for(team).unwrap();
        let right = ba.stats_for(team).unwrap();
        assert_eq!(left, right);
    }
    assert_eq!(ab.stats_for(AWAY).unwrap().ft_pct, 5.0 / 7.0);
    assert_eq!(ab.stats_for(HOME).unwrap().plus_minus, 8 - 5);
    assert_eq!(ab.games_played(), ba.games_played());
    assert_eq!(ab.seconds_played(), ba.seconds_played());
}

#[test]
fn merge_is_associative_over_counters() {
    let a = record("g1", 10, 4);
    let b = flipped("g2", 4, 3);
    let c = record("g3", 6, 1);

    let left = a.clone().merge(&b).unwrap().merge(&c).unwrap();
    let right = a.merge(&b.merge(&c).unwrap()).unwrap();
    for team in [HOME, AWAY] {
        assert_eq!(left.stats_for(team), right.stats_for(team));
    }
    assert_eq!(left.games_played(), 3);
}

#[test]
fn identity_ignores_order_and_side() {
    assert_eq!(
        record("g1", 0, 0).matchup_id(),
        flipped("g2", 0, 0).matchup_id()
    );
    assert_eq!(
        MatchupId::from_players([5, 4, 3, 2, 1, 10, 9, 8, 7, 6]),
        MatchupId::from_players(1..=10)
    );
}

#[test]
fn different_players_never_merge() {
    let a = record("g1", 1, 1);
    let other = MatchupRecord::new("g2", HOME, vec![1, 2, 3, 4, 5], AWAY, vec![6, 7, 8, 9, 10]);
    let err = a.merge(&other).unwrap_err();
    assert!(matches!(err, MatchupError::IdentityMismatch { .. }));
    assert!(!err.is_retryable());
}

#[test]
fn records_round_trip_through_json() {
    let merged = record("g1", 10, 4).merge(&flipped("g2", 3, 2)).unwrap();
    let json = serde_json::to_string(&merged).expect("serialize");
    let back: MatchupRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, merged);
}

#[test]
fn corpus_aggregation_matches_pairwise_merge() {
    let records = vec![
        record("g1", 10, 4),
        flipped("g2", 3, 2),
        record("g3", 8, 5),
    ];
    let aggregated = aggregate_by_matchup(&records).unwrap();
    assert_eq!(aggregated.len(), 1);
    let home = aggregated[0].stats_for(HOME).unwrap();
    assert_eq!((home.fga, home.fgm, home.fg_pct), (18, 9, 0.5));
    assert_eq!(aggregated[0].stats_for(AWAY).unwrap().ftm, 2);
    assert_eq!(aggregated[0].games_played(), 3);
}
