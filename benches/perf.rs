use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_terminal::api::{parse_player_json, parse_similarity_json};
use scout_terminal::demo_source::DemoSource;
use scout_terminal::memo::SimilarityMemo;
use scout_terminal::provider::PlayerSource;
use scout_terminal::radar::{self, RadarSeries};
use scout_terminal::state::Algorithm;

fn similarity_json(rows: usize) -> String {
    let players = (0..rows)
        .map(|i| {
            format!(
                r#"{{"id":{},"name":"Player {i}","height":{},"weight":70,"similarity":"0.{:03}"}}"#,
                1000 + i,
                165 + (i % 30),
                999 - (i % 999)
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"id":42,"name":"Alice Moreau","similarPlayer":[{players}],"graphURL":null,"executionProc":[{{"executionName":"KMeans","executionTime":912}}]}}"#
    )
}

const PLAYER_JSON: &str = r#"{
  "id": 42, "name": "Alice Moreau", "positions": ["ST","LW"], "birth": "1998-04-12",
  "height": "171", "weight": 63,
  "attributes": {"pace": 88, "shooting": "84", "passing": 72, "dribbling": 86, "defending": 35, "physical": 70}
}"#;

fn bench_similarity_parse(c: &mut Criterion) {
    let raw = similarity_json(200);
    c.bench_function("similarity_parse_200", |b| {
        b.iter(|| {
            let result = parse_similarity_json(black_box(&raw)).unwrap();
            black_box(result.similar_players.len());
        })
    });
}

fn bench_player_parse(c: &mut Criterion) {
    c.bench_function("player_detail_parse", |b| {
        b.iter(|| {
            let player = parse_player_json(black_box(PLAYER_JSON)).unwrap();
            black_box(player.attributes.len());
        })
    });
}

fn bench_memo_record(c: &mut Criterion) {
    let result = parse_similarity_json(&similarity_json(50)).unwrap();
    c.bench_function("memo_record_all_algorithms", |b| {
        b.iter(|| {
            let mut memo = SimilarityMemo::new();
            for alg in Algorithm::ALL {
                memo.record(42, alg, black_box(&result));
                memo.record(42, alg, black_box(&result));
            }
            black_box(memo.called().len());
        })
    });
}

fn bench_radar_geometry(c: &mut Criterion) {
    let player = parse_player_json(PLAYER_JSON).unwrap();
    let series = RadarSeries::from_attributes(&player.attributes);
    c.bench_function("radar_polygon", |b| {
        b.iter(|| {
            let pts = radar::polygon_points(black_box(&series.values), series.scale(), 1.0);
            black_box(radar::outline(&pts).len());
        })
    });
}

fn bench_demo_similarity(c: &mut Criterion) {
    c.bench_function("demo_similarity_louvain", |b| {
        let mut demo = DemoSource::new();
        b.iter(|| {
            let res = demo.similar_players(black_box(42), Algorithm::Louvain).unwrap();
            black_box(res.similar_players.len());
        })
    });
}

criterion_group!(
    perf,
    bench_similarity_parse,
    bench_player_parse,
    bench_memo_record,
    bench_radar_geometry,
    bench_demo_similarity
);
criterion_main!(perf);
