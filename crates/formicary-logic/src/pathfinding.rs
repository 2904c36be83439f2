//! Shortest walkable route between two grid cells.
//!
//! `Pathfinder` runs an iterative A* (Manhattan heuristic, uniform step
//! cost, 4-directional adjacency) over the grid's walkability matrix. Search
//! state lives in reusable dense buffers stamped per search, so repeated
//! queries during a scheduling pass do not reallocate.
//!
//! In "exclude destination" mode the goal cell is treated as open for the
//! duration of the search even if its terrain blocks; agents walk *toward*
//! an obstacle they are going to work on. The override is applied through
//! the passability check itself, so the walkability matrix is never touched.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::cell::Cell;
use crate::grid::Grid;

/// Default hard cap on node expansions per search.
pub const DEFAULT_ITERATION_CAP: usize = 99_999;

#[derive(Debug)]
pub struct Pathfinder {
    max_iterations: usize,
    stamp: u32,
    seen: Vec<u32>,
    cost: Vec<u32>,
    parent: Vec<usize>,
    /// (f, h, g, index); ties on f prefer cells nearer the goal.
    open: BinaryHeap<Reverse<(u32, u32, u32, usize)>>,
    searches: u64,
    overruns: u64,
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATION_CAP)
    }
}

impl Pathfinder {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            stamp: 0,
            seen: Vec::new(),
            cost: Vec::new(),
            parent: Vec::new(),
            open: BinaryHeap::new(),
            searches: 0,
            overruns: 0,
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Number of searches run so far.
    pub fn searches(&self) -> u64 {
        self.searches
    }

    /// Number of searches abandoned at the iteration cap.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Find a shortest 4-connected route from `start` to `goal`.
    ///
    /// The returned path includes both endpoints. With
    /// `include_destination == false` the goal is enterable regardless of its
    /// terrain. Returns `None` when the goal is unreachable, either endpoint is
    /// out of bounds, or the iteration cap is hit.
    pub fn find_path(
        &mut self,
        grid: &Grid,
        start: Cell,
        goal: Cell,
        include_destination: bool,
    ) -> Option<Vec<Cell>> {
        let bounds = *grid.bounds();
        let start_index = bounds.index(start)?;
        let goal_index = bounds.index(goal)?;
        self.searches += 1;

        if start == goal {
            return Some(vec![start]);
        }
        if include_destination && !grid.is_walkable(goal) {
            return None;
        }

        self.begin(bounds.cell_count());
        let stamp = self.stamp;
        let passable = |cell: Cell| grid.is_walkable(cell) || (!include_destination && cell == goal);

        self.seen[start_index] = stamp;
        self.cost[start_index] = 0;
        self.parent[start_index] = start_index;
        let h = start.manhattan_distance(goal);
        self.open.push(Reverse((h, h, 0, start_index)));

        let mut iterations = 0usize;
        while let Some(Reverse((_, _, g, index))) = self.open.pop() {
            if g > self.cost[index] {
                continue;
            }
            if index == goal_index {
                return Some(self.reconstruct(grid, goal_index));
            }

            iterations += 1;
            if iterations > self.max_iterations {
                self.overruns += 1;
                log::warn!(
                    "path search {:?} -> {:?} exceeded {} iterations",
                    start,
                    goal,
                    self.max_iterations
                );
                return None;
            }

            let Some(cell) = bounds.cell_at(index) else {
                continue;
            };
            let next_cost = g + 1;
            for neighbor in cell.neighbors() {
                let Some(n) = bounds.index(neighbor) else {
                    continue;
                };
                if !passable(neighbor) {
                    continue;
                }
                if self.seen[n] == stamp && self.cost[n] <= next_cost {
                    continue;
                }
                self.seen[n] = stamp;
                self.cost[n] = next_cost;
                self.parent[n] = index;
                let h = neighbor.manhattan_distance(goal);
                self.open.push(Reverse((next_cost + h, h, next_cost, n)));
            }
        }

        None
    }

    fn begin(&mut self, cell_count: usize) {
        if self.seen.len() != cell_count {
            self.seen = vec![0; cell_count];
            self.cost = vec![0; cell_count];
            self.parent = vec![0; cell_count];
            self.stamp = 0;
        }
        if self.stamp == u32::MAX {
            self.seen.fill(0);
            self.stamp = 0;
        }
        self.stamp += 1;
        self.open.clear();
    }

    fn reconstruct(&self, grid: &Grid, goal_index: usize) -> Vec<Cell> {
        let bounds = grid.bounds();
        let mut path = Vec::new();
        let mut index = goal_index;
        loop {
            if let Some(cell) = bounds.cell_at(index) {
                path.push(cell);
            }
            let parent = self.parent[index];
            if parent == index {
                break;
            }
            index = parent;
        }
        path.reverse();
        path
    }
}

/// Check that `path` is a valid route on `grid` from `start` to `goal`:
/// consecutive cells are 4-adjacent and every interior cell is walkable.
pub fn is_valid_path(grid: &Grid, path: &[Cell], start: Cell, goal: Cell) -> bool {
    if path.first() != Some(&start) || path.last() != Some(&goal) {
        return false;
    }
    if !path.windows(2).all(|pair| pair[0].is_adjacent(pair[1])) {
        return false;
    }
    let interior = path.len().saturating_sub(1);
    path.iter()
        .take(interior)
        .skip(1)
        .all(|cell| grid.is_walkable(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridBounds, TerrainKind};

    fn open_grid(size: i32) -> Grid {
        Grid::new(GridBounds::new(0, size, 0, size, -1), TerrainKind::Empty)
    }

    #[test]
    fn test_same_cell() {
        let grid = open_grid(4);
        let mut pf = Pathfinder::default();
        let path = pf.find_path(&grid, Cell::new(1, 1), Cell::new(1, 1), true);
        assert_eq!(path, Some(vec![Cell::new(1, 1)]));
    }

    #[test]
    fn test_straight_line() {
        let grid = open_grid(5);
        let mut pf = Pathfinder::default();
        let path = pf
            .find_path(&grid, Cell::new(0, 2), Cell::new(4, 2), true)
            .unwrap();
        assert_eq!(path.len(), 5);
        assert!(is_valid_path(&grid, &path, Cell::new(0, 2), Cell::new(4, 2)));
    }

    #[test]
    fn test_wall_forces_detour() {
        let mut grid = open_grid(5);
        for y in 0..4 {
            grid.replace_tile(Cell::new(2, y), TerrainKind::Rock);
        }
        let mut pf = Pathfinder::default();
        let path = pf
            .find_path(&grid, Cell::new(0, 0), Cell::new(4, 0), true)
            .unwrap();
        // down to row 4, across, back up
        assert_eq!(path.len(), 4 + 8 + 1);
        assert!(path.contains(&Cell::new(2, 4)));
    }

    #[test]
    fn test_blocked_goal_needs_exclude_mode() {
        let mut grid = open_grid(5);
        let goal = Cell::new(3, 3);
        grid.replace_tile(goal, TerrainKind::Dirt);
        let mut pf = Pathfinder::default();

        assert_eq!(pf.find_path(&grid, Cell::new(0, 0), goal, true), None);

        let path = pf.find_path(&grid, Cell::new(0, 0), goal, false).unwrap();
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), 7);
        // the override never leaks into the matrix
        assert!(!grid.is_walkable(goal));
        assert!(grid.walkability_consistent());
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        let mut grid = open_grid(5);
        for n in Cell::new(2, 2).neighbors() {
            grid.replace_tile(n, TerrainKind::Rock);
        }
        let mut pf = Pathfinder::default();
        assert_eq!(pf.find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), true), None);
        assert_eq!(pf.find_path(&grid, Cell::new(0, 0), Cell::new(2, 2), false), None);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let grid = open_grid(3);
        let mut pf = Pathfinder::default();
        assert_eq!(pf.find_path(&grid, Cell::new(-1, 0), Cell::new(2, 2), true), None);
        assert_eq!(pf.find_path(&grid, Cell::new(0, 0), Cell::new(3, 0), true), None);
    }

    #[test]
    fn test_iteration_cap_yields_no_path() {
        let grid = open_grid(30);
        let mut pf = Pathfinder::new(5);
        assert_eq!(pf.find_path(&grid, Cell::new(0, 0), Cell::new(29, 29), true), None);
        assert_eq!(pf.overruns(), 1);

        // the same pathfinder keeps working after an overrun
        let path = pf.find_path(&grid, Cell::new(0, 0), Cell::new(1, 0), true);
        assert_eq!(path.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_buffers_reset_between_grids() {
        let mut pf = Pathfinder::default();
        let small = open_grid(3);
        let large = open_grid(8);
        assert!(pf.find_path(&small, Cell::new(0, 0), Cell::new(2, 2), true).is_some());
        let path = pf
            .find_path(&large, Cell::new(0, 0), Cell::new(7, 7), true)
            .unwrap();
        assert_eq!(path.len(), 15);
    }
}
