//! Criterion benchmarks for candlecross hot paths.
//!
//! Benchmarks:
//! 1. SMA over the tail of a long series
//! 2. Single-bar evaluation against a long in-memory history
//! 3. Full replay of a synthetic series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use candlecross_core::indicators::average;
use candlecross_core::memory::{InMemoryHistory, InMemoryPortfolio};
use candlecross_core::replay::Replay;
use candlecross_core::{Bar, BarEvent, CrossoverSignalEngine, StrategyConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = 100.0 + ((i as f64 - 1.0) * 0.1).sin() * 10.0;
            Bar {
                symbol: "BENCH".to_string(),
                timestamp: base + chrono::Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.5,
                low: open.min(close) - 1.5,
                close,
            }
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_sma(c: &mut Criterion) {
    let bars = make_bars(10_000);
    let mut group = c.benchmark_group("sma_tail");
    for window in [10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| average(black_box(w), black_box(&bars)))
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let bars = make_bars(10_000);
    let mut history = InMemoryHistory::new();
    for bar in &bars {
        history.push(bar.clone()).unwrap();
    }
    let portfolio = InMemoryPortfolio::new();
    let engine = CrossoverSignalEngine::new(StrategyConfig::with_windows(20, 50)).unwrap();
    let last = bars.last().unwrap().clone();

    c.bench_function("evaluate_single_bar", |b| {
        b.iter(|| {
            let mut event = BarEvent::new(last.clone());
            let _ = engine.evaluate(black_box(&mut event), &history, &portfolio);
        })
    });
}

fn bench_replay(c: &mut Criterion) {
    let bars = make_bars(2_000);
    c.bench_function("replay_2000_bars", |b| {
        b.iter(|| {
            let engine =
                CrossoverSignalEngine::new(StrategyConfig::with_windows(10, 30)).unwrap();
            let mut replay = Replay::new(engine);
            black_box(replay.run(bars.clone()).unwrap())
        })
    });
}

criterion_group!(benches, bench_sma, bench_evaluate, bench_replay);
criterion_main!(benches);
