use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use lineup_matchups::aggregate::aggregate_by_matchup;
use lineup_matchups::event::{Event, EventType, TeamId};
use lineup_matchups::game::process_events;
use lineup_matchups::matchup::MatchupRecord;
use lineup_matchups::sources::parse_play_by_play_json;
use lineup_matchups::starters::StaticLineupSource;

const GAME: &str = "0021600999";
const HOME: TeamId = 1610612744;
const AWAY: TeamId = 1610612739;

fn clock(seconds_left: u32) -> String {
    format!("{}:{:02}", seconds_left / 60, seconds_left % 60)
}

fn event(kind: EventType, seconds_left: u32) -> Event {
    Event::new(GAME, kind, &clock(seconds_left)).unwrap()
}

/// Four periods with a possession every 20 seconds and a rotation every two minutes.
fn synthetic_game() -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..4 {
        events.push(event(EventType::PeriodStart, 720));
        let mut bench_in = false;
        let mut left = 720;
        while left > 20 {
            left -= 20;
            match (left / 20) % 3 {
                0 => events.push(
                    event(EventType::MadeShot, left)
                        .with_primary(2, HOME)
                        .with_secondary(3, HOME)
                        .with_description("Curry 26' 3PT Jump Shot (3 PTS) (Green 1 AST)"),
                ),
                1 => events.push(
                    event(EventType::MissedShot, left)
                        .with_primary(12, AWAY)
                        .with_secondary_description("MISS James 10' Jump Shot"),
                ),
                _ => events.push(event(EventType::Rebound, left).with_primary(4, HOME)),
            }
            if left % 120 == 0 {
                let (out_id, in_id) = if bench_in { (6, 1) } else { (1, 6) };
                events.push(
                    event(EventType::Substitution, left)
                        .with_primary(out_id, HOME)
                        .with_secondary(in_id, HOME),
                );
                bench_in = !bench_in;
            }
        }
        events.push(event(EventType::PeriodEnd, 0));
    }
    events
}

fn lineups() -> StaticLineupSource {
    let mut source = StaticLineupSource::new();
    for period in 1..=4 {
        source.insert(GAME, HOME, period, &["1 - 2 - 3 - 4 - 5"]);
        source.insert(GAME, AWAY, period, &["11 - 12 - 13 - 14 - 15"]);
    }
    source
}

fn bench_process_game(c: &mut Criterion) {
    let events = synthetic_game();
    let source = lineups();
    c.bench_function("process_synthetic_game", |b| {
        b.iter(|| {
            let game = process_events(GAME, black_box(&events), &source).unwrap();
            black_box(game.records().count());
        })
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let source = lineups();
    let game = process_events(GAME, &synthetic_game(), &source).unwrap();
    let one_game: Vec<MatchupRecord> = game.into_records();
    let records: Vec<MatchupRecord> = (0..200).flat_map(|_| one_game.iter().cloned()).collect();
    c.bench_function("aggregate_by_matchup", |b| {
        b.iter(|| {
            let merged = aggregate_by_matchup(black_box(&records)).unwrap();
            black_box(merged.len());
        })
    });
}

fn bench_play_by_play_parse(c: &mut Criterion) {
    c.bench_function("play_by_play_parse", |b| {
        b.iter(|| {
            let pbp = parse_play_by_play_json(black_box(PBP_JSON)).unwrap();
            black_box(pbp.rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_process_game,
    bench_aggregate,
    bench_play_by_play_parse
);
criterion_main!(perf);

static PBP_JSON: &str = include_str!("../tests/fixtures/data/pbp/0021600001.json");
