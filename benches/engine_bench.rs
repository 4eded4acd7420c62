use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;

use shutbox::board::{AtomicBoard, Board, DiceModel, MAX_ROLL, MIN_ROLL};
use shutbox::game::{BoardUpdate, Game, GameMode};
use shutbox::sim::{run_single, SimulationConfig};
use shutbox::strategy::StrategyKind;

fn bench_subset_sums_full_board(c: &mut Criterion) {
    c.bench_function("subset_sums_full_board_all_rolls", |b| {
        b.iter(|| {
            let mut total = 0;
            for roll in MIN_ROLL..=MAX_ROLL {
                total += Board::FULL.subset_sum_candidates(black_box(roll)).len();
            }
            total
        })
    });
}

fn bench_dice(c: &mut Criterion) {
    let mut group = c.benchmark_group("dice");
    for model in [DiceModel::TwoDice, DiceModel::Weighted] {
        let dice = model.sampler();
        let mut rng = SmallRng::seed_from_u64(1);
        group.bench_function(model.name(), |b| b.iter(|| dice.roll(&mut rng)));
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let boards: Vec<Board> = (0..64u16).map(|i| Board::new(i.wrapping_mul(0x3D) & 0xFFF)).collect();
    let mut group = c.benchmark_group("choose_move");
    for kind in StrategyKind::ALL {
        let mut strategy = kind.build(7);
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                for &board in &boards {
                    for roll in MIN_ROLL..=MAX_ROLL {
                        black_box(strategy.choose_move(black_box(board), roll));
                    }
                }
            })
        });
    }
    group.finish();
}

fn bench_atomic_board(c: &mut Criterion) {
    let mut strategy = StrategyKind::HighestValue.build(0);
    c.bench_function("atomic_board_cas_round", |b| {
        b.iter(|| {
            let board = AtomicBoard::new(Board::FULL);
            for roll in [12, 11, 10, 9, 8, 7] {
                black_box(board.apply_clear(roll, |bd, r| strategy.choose_move(bd, r)));
            }
        })
    });
}

fn bench_games(c: &mut Criterion) {
    let dice = DiceModel::TwoDice.sampler();
    let mut group = c.benchmark_group("game");
    for (mode, update) in [
        (GameMode::Base, BoardUpdate::Sequential),
        (GameMode::Base, BoardUpdate::Atomic),
        (GameMode::Extended, BoardUpdate::Sequential),
    ] {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = StrategyKind::Random.build(1);
        let mut b = StrategyKind::Balanced.build(2);
        group.bench_function(format!("{mode}_{update:?}"), |bench| {
            bench.iter(|| {
                Game::with_update(mode, update).play(a.as_mut(), b.as_mut(), &dice, &mut rng)
            })
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("base_10k_adaptive_vs_random", |b| {
        b.iter(|| {
            let config = SimulationConfig::new(10_000, GameMode::Base, "Adaptive", "Random", 12345);
            run_single(black_box(config))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_subset_sums_full_board,
    bench_dice,
    bench_strategies,
    bench_atomic_board,
    bench_games,
    bench_batch,
);
criterion_main!(benches);
