//! Simulation benchmarks: per-frame tick, level generation, replay

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use neon_runner::core::rng::DeterministicRng;
use neon_runner::game::config::{GameConfig, Viewport};
use neon_runner::game::input::PointerEvent;
use neon_runner::game::platform::{generate_platforms, starting_platform};
use neon_runner::game::replay::{replay_run, InputRecording};
use neon_runner::game::state::RunState;
use neon_runner::game::tick::tick;

const FRAME_MS: f64 = 1000.0 / 60.0;

/// Pointer events for `frames` frames: random taps, swipes and holds.
fn random_input(seed: u64, frames: usize) -> Vec<Vec<PointerEvent>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut down = false;

    (0..frames)
        .map(|i| {
            let now = i as f64 * FRAME_MS;
            let x = rng.gen_range(100.0..1100.0);
            if down {
                if rng.gen_bool(0.05) {
                    down = false;
                    let dx = if rng.gen_bool(0.3) { 120.0 } else { 0.0 };
                    return vec![PointerEvent::Up { x: x + dx, time_ms: now }];
                }
                return Vec::new();
            }
            if rng.gen_bool(0.1) {
                down = true;
                return vec![PointerEvent::Down { x, y: 360.0, time_ms: now }];
            }
            Vec::new()
        })
        .collect()
}

/// One run stepped for `frames` frames, stopping at game over.
fn play(seed: u64, input: &[Vec<PointerEvent>], config: &GameConfig) -> RunState {
    let mut state = RunState::new(seed, Viewport::default(), config);
    for (i, events) in input.iter().enumerate() {
        for event in events {
            state.apply_pointer(*event, config);
        }
        let result = tick(&mut state, 1.0 / 60.0, i as f64 * FRAME_MS, config);
        if result.game_over.is_some() {
            break;
        }
    }
    state
}

fn bench_tick(c: &mut Criterion) {
    let config = GameConfig::default();
    let input = random_input(7, 600);

    c.bench_function("run_600_frames", |b| {
        b.iter(|| play(black_box(42), &input, &config))
    });

    c.bench_function("single_tick", |b| {
        b.iter_batched(
            || RunState::new(42, Viewport::default(), &config),
            |mut state| {
                tick(&mut state, 1.0 / 60.0, 0.0, &config);
                state
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_generation(c: &mut Criterion) {
    let config = GameConfig::default();
    let viewport = Viewport::default();

    c.bench_function("generate_level_ahead", |b| {
        b.iter_batched(
            || (vec![starting_platform(&config.generator)], DeterministicRng::new(9)),
            |(mut platforms, mut rng)| {
                generate_platforms(&mut platforms, 0.0, 250, 500.0, viewport, &config, &mut rng);
                platforms
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_replay(c: &mut Criterion) {
    let config = GameConfig::default();
    let viewport = Viewport::default();
    let mut recording = InputRecording::new(3, viewport);
    for (i, events) in random_input(3, 300).into_iter().enumerate() {
        for event in events {
            recording.record_pointer(event);
        }
        recording.record_frame(i as f64 * FRAME_MS);
    }

    c.bench_function("replay_300_frames", |b| {
        b.iter(|| replay_run(black_box(&recording), &config))
    });
}

criterion_group!(benches, bench_tick, bench_generation, bench_replay);
criterion_main!(benches);
