use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridnav::{coord, Algorithm, DStarLite, DirMode, Finder, NavGrid};

/// A 64×64 grid with a wall at x = 32, open only at (32, 0).
fn wall_grid() -> NavGrid {
    let mut grid = NavGrid::with_size(64, 64, DirMode::Dir8);
    for y in 1..64 {
        grid.block(32, y);
    }
    grid
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");
    group.sample_size(50);

    group.bench_function("dstar_lite_find", |b| {
        b.iter(|| {
            let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(63, 63));
            black_box(dsl.find());
        });
    });

    group.bench_function("dstar_lite_incremental_replan", |b| {
        let mut dsl = DStarLite::new(wall_grid(), coord(0, 0), coord(63, 63));
        assert!(dsl.find_proto());
        b.iter(|| {
            dsl.grid_mut().block(10, 50);
            dsl.update_vertex_range(black_box(coord(10, 50)), 1);
            dsl.compute_shortest_path();
            dsl.grid_mut().unblock(10, 50);
            dsl.update_vertex_range(black_box(coord(10, 50)), 1);
            dsl.compute_shortest_path();
        });
    });

    group.bench_function("astar_find", |b| {
        let finder = Finder::new(wall_grid(), coord(0, 0), coord(63, 63));
        b.iter(|| {
            black_box(finder.run());
        });
    });

    group.bench_function("bfs_find", |b| {
        let mut finder = Finder::new(wall_grid(), coord(0, 0), coord(63, 63));
        finder.set_algorithm(Algorithm::Bfs);
        b.iter(|| {
            black_box(finder.run());
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
