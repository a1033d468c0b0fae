//! Benchmarks for VCP detection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vcpd::prelude::*;
use vcpd::vcp::{calculate_atr, detect_swing_points};

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
  h: f64,
  l: f64,
  c: f64,
}

impl OHLCV for TestBar {
  fn open(&self) -> f64 {
    self.c
  }

  fn high(&self) -> f64 {
    self.h
  }

  fn low(&self) -> f64 {
    self.l
  }

  fn close(&self) -> f64 {
    self.c
  }

  fn volume(&self) -> f64 {
    1000.0
  }
}

/// Generate a deterministic oscillating series with shrinking swings
fn generate_bars(n: usize) -> Vec<TestBar> {
  let mut bars = Vec::with_capacity(n);

  for i in 0..n {
    let t = i as f64;
    let amplitude = 12.0 / (1.0 + t / 60.0);
    let c = 100.0 + amplitude * (t / 6.0).sin() + ((i * 7 + 13) % 10) as f64 / 10.0;
    let volatility = 0.8 + ((i * 3) % 10) as f64 / 10.0;

    bars.push(TestBar { h: c + volatility, l: c - volatility, c });
  }

  bars
}

fn bench_analyze(c: &mut Criterion) {
  let bars = generate_bars(250);
  let detector = VcpDetector::default();

  c.bench_function("analyze_250_bars", |b| {
    b.iter(|| {
      let _ = black_box(detector.analyze(black_box(&bars)));
    })
  });
}

fn bench_lookback_scaling(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let mut group = c.benchmark_group("lookback");

  for lookback in [60usize, 120, 250, 500, 1000].iter() {
    let detector = VcpDetectorBuilder::new().lookback_days(*lookback).build().unwrap();

    group.bench_with_input(BenchmarkId::new("analyze", lookback), lookback, |b, _| {
      b.iter(|| {
        let _ = black_box(detector.analyze(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_swing_detection(c: &mut Criterion) {
  let bars = generate_bars(500);
  let highs: Vec<f64> = bars.iter().map(|b| b.h).collect();
  let lows: Vec<f64> = bars.iter().map(|b| b.l).collect();
  let closes: Vec<f64> = bars.iter().map(|b| b.c).collect();

  c.bench_function("atr_500_bars", |b| {
    b.iter(|| black_box(calculate_atr(black_box(&highs), &lows, &closes, 14)))
  });

  c.bench_function("swings_500_bars", |b| {
    b.iter(|| black_box(detect_swing_points(black_box(&highs), &lows, &closes, 1.5, 14, 5)))
  });
}

fn bench_parallel_scan(c: &mut Criterion) {
  let series: Vec<Vec<TestBar>> = (0..64).map(|k| generate_bars(120 + k)).collect();
  let names: Vec<String> = (0..series.len()).map(|k| format!("SYM{k}")).collect();
  let instruments: Vec<(&str, &[TestBar])> =
    names.iter().map(String::as_str).zip(series.iter().map(Vec::as_slice)).collect();

  let detector = VcpDetector::default();

  c.bench_function("parallel_scan_64_instruments", |b| {
    b.iter(|| {
      let _ = black_box(scan_parallel(black_box(&detector), black_box(instruments.clone())));
    })
  });
}

criterion_group!(
  benches,
  bench_analyze,
  bench_lookback_scaling,
  bench_swing_detection,
  bench_parallel_scan,
);

criterion_main!(benches);
