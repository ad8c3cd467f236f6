use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use rust_2048::{
    Board, Environment, ExploreConfig, Explorer, Game2048, GameConfig, GameRng, SolverConfig,
    StateTable, ValueSolver,
};

fn explored(bound: usize) -> (StateTable, Game2048) {
    let mut env = Game2048::new(GameConfig::default()).unwrap();
    let mut rng = GameRng::new(42);
    let mut table = StateTable::new();
    Explorer::new(ExploreConfig::default().with_bound(bound))
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();
    (table, env)
}

fn bench_explore(c: &mut Criterion) {
    c.bench_function("explore_2x2_400", |b| {
        b.iter(|| black_box(explored(400)))
    });
}

fn bench_solve(c: &mut Criterion) {
    let (table, env) = explored(400);
    let start = env.canonical_start_state().cloned().unwrap();
    let solver = ValueSolver::new(env.config(), SolverConfig::default());

    c.bench_function("solve_2x2_400", |b| {
        b.iter_batched(
            || table.clone(),
            |mut t| {
                solver.solve(&mut t, &start).unwrap();
                t
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_encode(c: &mut Criterion) {
    let board = Board::from_rows(&[
        vec![2, 4, 8, 16],
        vec![32, 64, 128, 256],
        vec![512, 1024, 2048, 0],
        vec![0, 2, 0, 4],
    ])
    .unwrap();
    let id = board.encode().unwrap();

    c.bench_function("encode_4x4", |b| b.iter(|| black_box(&board).encode()));
    c.bench_function("decode_4x4", |b| b.iter(|| black_box(&id).decode(4, 4)));
}

criterion_group!(benches, bench_explore, bench_solve, bench_encode);
criterion_main!(benches);
