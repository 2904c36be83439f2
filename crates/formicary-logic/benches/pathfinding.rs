use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formicary_logic::config::ColonyConfig;
use formicary_logic::{Cell, Grid, Pathfinder, TerrainKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default-sized colony with everything below the surface hollowed out
/// except for scattered rock.
fn open_colony() -> Grid {
    let config = ColonyConfig::default();
    let bounds = config.grid.bounds();
    let mut rng = StdRng::seed_from_u64(0xA17);
    Grid::from_fn(bounds, |cell| {
        if cell.y < bounds.entrance_row {
            TerrainKind::Sky
        } else if cell.y > bounds.entrance_row && rng.gen_bool(0.2) {
            TerrainKind::Rock
        } else {
            TerrainKind::Empty
        }
    })
}

fn bench_find_path(c: &mut Criterion) {
    let grid = open_colony();
    let bounds = *grid.bounds();
    let start = Cell::new(0, bounds.entrance_row);
    let deep = Cell::new(bounds.max_x - 1, bounds.max_y - 1);

    let mut group = c.benchmark_group("find_path");
    group.bench_function("surface_to_deep_corner", |b| {
        let mut pathfinder = Pathfinder::default();
        b.iter(|| pathfinder.find_path(&grid, black_box(start), black_box(deep), false))
    });
    group.bench_function("short_hop", |b| {
        let mut pathfinder = Pathfinder::default();
        let goal = Cell::new(6, bounds.entrance_row);
        b.iter(|| pathfinder.find_path(&grid, black_box(start), black_box(goal), true))
    });
    group.finish();
}

criterion_group!(benches, bench_find_path);
criterion_main!(benches);
