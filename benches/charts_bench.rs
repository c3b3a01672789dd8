//! Benchmarks for feed preparation and chart rendering
//!
//! Run with: cargo bench

use chrono::{Days, NaiveDate};
use covid_dash::charts::{render, ChartId};
use covid_dash::config::ChartConfig;
use covid_dash::ingest::FeedSpec;
use covid_dash::snapshot::{SeriesTable, Snapshot, StateRecord, WorldRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const STATES: [&str; 10] = ["AK", "CA", "FL", "MA", "NY", "OH", "TX", "UT", "WA", "WY"];
const COUNTRIES: [&str; 5] = ["Brazil", "Hungary", "India", "Italy", "United Kingdom"];

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 1).unwrap() + Days::new(offset)
}

fn create_snapshot(days: u64) -> Snapshot {
    let mut states = Vec::new();
    for code in STATES {
        for i in 0..days {
            let positive = (i * 10) as f64;
            let negative = (i * 90) as f64;
            let total = positive + negative;
            states.push(StateRecord {
                state: code.to_string(),
                date: day(i),
                positive: Some(positive),
                negative: Some(negative),
                total_tests: Some(total),
                pos_per_tests: (total != 0.0).then(|| positive / total),
            });
        }
    }

    let mut world = Vec::new();
    for location in COUNTRIES {
        for i in 0..days {
            world.push(WorldRecord {
                location: location.to_string(),
                date: day(i),
                new_cases: Some(i as f64),
                new_deaths: Some((i / 10) as f64),
                new_tests: Some((i * 20) as f64),
                new_cases_per_million: Some(i as f64 / 9.7),
                deaths_per_pos: None,
                pos_per_tests: None,
            });
        }
    }

    Snapshot::new(SeriesTable::from_records(states), SeriesTable::from_records(world))
}

fn states_csv(days: u64) -> String {
    let mut csv = String::from("date,state,positive,negative\n");
    for code in STATES {
        for i in 0..days {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                day(i).format("%Y%m%d"),
                code,
                i * 10,
                i * 90
            ));
        }
    }
    csv
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let snapshot = create_snapshot(240);
    let theme = ChartConfig::default();
    let states: Vec<String> = STATES.iter().map(|s| s.to_string()).collect();
    let countries: Vec<String> = COUNTRIES.iter().map(|s| s.to_string()).collect();

    for chart in ChartId::ALL {
        let selection = match chart {
            ChartId::WorldCaseRate => &countries,
            _ => &states,
        };
        group.bench_function(chart.element_id(), |b| {
            b.iter(|| render(chart, black_box(&snapshot), &theme, black_box(selection)))
        });
    }

    group.bench_function("pos_per_case_to_json", |b| {
        b.iter(|| {
            let figure = render(ChartId::PositivityRatio, &snapshot, &theme, &states);
            serde_json::to_vec(black_box(&figure)).unwrap()
        })
    });

    group.finish();
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");
    let feed = FeedSpec::states("http://localhost/states.csv");

    for days in [30, 240] {
        let csv = states_csv(days);
        group.throughput(Throughput::Elements(days * STATES.len() as u64));

        group.bench_function(format!("states_{}_days", days), |b| {
            b.iter(|| {
                let mut frame = feed.parse(black_box(&csv)).unwrap();
                feed.prepare(&mut frame).unwrap();
                frame
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_prepare);
criterion_main!(benches);
