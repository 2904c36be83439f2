//! Pathfinder behaviour on whole grids.
//!
//! Pure logic; no engine involved.

use std::collections::{HashSet, VecDeque};

use formicary_logic::pathfinding::is_valid_path;
use formicary_logic::{Cell, Grid, GridBounds, Pathfinder, TerrainKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

/// Square grid with no entrance row inside it.
fn empty_grid(size: i32) -> Grid {
    Grid::new(GridBounds::new(0, size, 0, size, -1), TerrainKind::Empty)
}

fn scattered_grid(rng: &mut StdRng, size: i32, rock_chance: f64) -> Grid {
    Grid::from_fn(GridBounds::new(0, size, 0, size, -1), |_| {
        if rng.gen_bool(rock_chance) {
            TerrainKind::Rock
        } else {
            TerrainKind::Empty
        }
    })
}

fn random_cell(rng: &mut StdRng, size: i32) -> Cell {
    Cell::new(rng.gen_range(0..size), rng.gen_range(0..size))
}

/// Reference breadth-first step count over walkable cells.
fn bfs_steps(grid: &Grid, start: Cell, goal: Cell) -> Option<usize> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((cell, steps)) = queue.pop_front() {
        if cell == goal {
            return Some(steps);
        }
        for n in cell.neighbors() {
            if grid.is_walkable(n) && seen.insert(n) {
                queue.push_back((n, steps + 1));
            }
        }
    }
    None
}

// ── Fixed layouts ──────────────────────────────────────────────────────

#[test]
fn test_routes_around_single_rock() {
    let mut grid = empty_grid(10);
    grid.replace_tile(Cell::new(5, 5), TerrainKind::Rock);
    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 9);

    let mut pathfinder = Pathfinder::default();
    let path = pathfinder.find_path(&grid, start, goal, true).unwrap();

    assert!(!path.contains(&Cell::new(5, 5)));
    // one cell per step plus the start
    assert_eq!(path.len() as u32, start.manhattan_distance(goal) + 1);
    assert!(is_valid_path(&grid, &path, start, goal));
}

#[test]
fn test_disconnected_region_degrades_to_no_path() {
    let mut grid = empty_grid(12);
    for y in 0..12 {
        grid.replace_tile(Cell::new(6, y), TerrainKind::Rock);
    }
    let mut pathfinder = Pathfinder::default();
    assert_eq!(
        pathfinder.find_path(&grid, Cell::new(0, 0), Cell::new(11, 11), true),
        None
    );
    assert_eq!(pathfinder.overruns(), 0);
}

#[test]
fn test_dig_target_is_reached_from_tunnel() {
    // A dirt block with a single tunnel running into it.
    let mut grid = Grid::new(GridBounds::new(0, 8, 0, 8, 0), TerrainKind::Dirt);
    for y in 1..5 {
        grid.replace_tile(Cell::new(3, y), TerrainKind::Empty);
    }
    let start = Cell::new(0, 0);
    let target = Cell::new(3, 5);
    let mut pathfinder = Pathfinder::default();

    assert_eq!(pathfinder.find_path(&grid, start, target, true), None);
    let path = pathfinder.find_path(&grid, start, target, false).unwrap();
    assert_eq!(path.last(), Some(&target));
    assert_eq!(path.len(), 9);
    assert!(is_valid_path(&grid, &path, start, target));
    assert!(!grid.is_walkable(target));
}

// ── Randomized ─────────────────────────────────────────────────────────

#[test]
fn test_random_paths_are_valid_and_shortest() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut pathfinder = Pathfinder::default();
    let mut found = 0;

    for _ in 0..200 {
        let grid = scattered_grid(&mut rng, 24, 0.25);
        let start = random_cell(&mut rng, 24);
        let goal = random_cell(&mut rng, 24);
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            continue;
        }
        let path = pathfinder.find_path(&grid, start, goal, true);
        let expected = bfs_steps(&grid, start, goal);
        assert_eq!(path.as_ref().map(|p| p.len() - 1), expected);
        if let Some(path) = path {
            found += 1;
            assert!(is_valid_path(&grid, &path, start, goal));
            assert!(path.iter().all(|c| grid.is_walkable(*c)));
        }
    }

    assert!(found > 0, "expected at least some reachable pairs");
}

#[test]
fn test_reused_pathfinder_matches_fresh_one() {
    let mut rng = StdRng::seed_from_u64(7);
    let grid = scattered_grid(&mut rng, 20, 0.2);
    let mut reused = Pathfinder::default();

    for _ in 0..50 {
        let start = random_cell(&mut rng, 20);
        let goal = random_cell(&mut rng, 20);
        let a = reused.find_path(&grid, start, goal, false).map(|p| p.len());
        let b = Pathfinder::default()
            .find_path(&grid, start, goal, false)
            .map(|p| p.len());
        assert_eq!(a, b);
    }
    assert_eq!(reused.searches(), 50);
}
