//! Tile grid with a dense, always-in-sync walkability matrix.
//!
//! The grid owns every tile's terrain kind and a boolean walkability cache
//! sized to the static bounds. The only way to change terrain is
//! [`Grid::replace_tile`], which re-derives the cached entry in the same call,
//! so no reader can observe terrain and walkability out of step.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Terrain kinds a tile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open air above the surface. Nothing walks here.
    Sky,
    /// Dug-out tunnel or open surface.
    Empty,
    Dirt,
    Rock,
    /// Chamber where the queen lives.
    RoyalRoom,
    /// Colony entrance on the surface row.
    Entrance,
    /// Tile holding harvestable food.
    ResourceBearing,
}

impl TerrainKind {
    pub fn is_diggable(self) -> bool {
        matches!(self, TerrainKind::Dirt)
    }

    pub fn is_harvestable(self) -> bool {
        matches!(self, TerrainKind::ResourceBearing)
    }
}

/// Walkability rule for a terrain kind at row `y`.
///
/// The entrance row is always walkable; elsewhere sky, dirt and rock block.
pub fn is_walkable(kind: TerrainKind, y: i32, entrance_row: i32) -> bool {
    if y == entrance_row {
        return true;
    }
    !matches!(kind, TerrainKind::Sky | TerrainKind::Dirt | TerrainKind::Rock)
}

/// Static, half-open bounds of the grid plus the entrance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub entrance_row: i32,
}

impl GridBounds {
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32, entrance_row: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            entrance_row,
        }
    }

    pub fn width(&self) -> usize {
        usize::try_from(i64::from(self.max_x) - i64::from(self.min_x)).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        usize::try_from(i64::from(self.max_y) - i64::from(self.min_y)).unwrap_or(0)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min_x && cell.x < self.max_x && cell.y >= self.min_y && cell.y < self.max_y
    }

    /// Row-major dense index, `None` when out of bounds.
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.x - self.min_x).ok()?;
        let row = usize::try_from(cell.y - self.min_y).ok()?;
        row.checked_mul(self.width())?.checked_add(column)
    }

    /// Inverse of [`GridBounds::index`].
    pub fn cell_at(&self, index: usize) -> Option<Cell> {
        let width = self.width();
        if width == 0 || index >= width * self.height() {
            return None;
        }
        let x = i32::try_from(index % width).ok()? + self.min_x;
        let y = i32::try_from(index / width).ok()? + self.min_y;
        Some(Cell::new(x, y))
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }
}

/// A single terrain tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TerrainKind,
    /// Remaining material, 1.0 when fresh; dig and harvest work erode it.
    pub integrity: f32,
}

impl Tile {
    pub fn new(kind: TerrainKind) -> Self {
        Self {
            kind,
            integrity: 1.0,
        }
    }
}

/// Terrain state for the whole colony.
#[derive(Debug, Clone)]
pub struct Grid {
    bounds: GridBounds,
    tiles: Vec<Tile>,
    walkable: Vec<bool>,
}

impl Grid {
    /// Grid where every tile holds `fill`.
    pub fn new(bounds: GridBounds, fill: TerrainKind) -> Self {
        Self::from_fn(bounds, |_| fill)
    }

    /// Grid whose terrain is supplied per cell by an external source.
    pub fn from_fn(bounds: GridBounds, mut kind_at: impl FnMut(Cell) -> TerrainKind) -> Self {
        let count = bounds.cell_count();
        let mut tiles = Vec::with_capacity(count);
        let mut walkable = Vec::with_capacity(count);
        for index in 0..count {
            let cell = bounds.cell_at(index).unwrap_or(Cell::new(bounds.min_x, bounds.min_y));
            let kind = kind_at(cell);
            tiles.push(Tile::new(kind));
            walkable.push(is_walkable(kind, cell.y, bounds.entrance_row));
        }
        Self {
            bounds,
            tiles,
            walkable,
        }
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.bounds.contains(cell)
    }

    pub fn tile(&self, cell: Cell) -> Option<&Tile> {
        self.bounds.index(cell).and_then(|i| self.tiles.get(i))
    }

    pub fn terrain(&self, cell: Cell) -> Option<TerrainKind> {
        self.tile(cell).map(|t| t.kind)
    }

    /// O(1) lookup in the walkability matrix. Out of bounds is never walkable.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.bounds
            .index(cell)
            .and_then(|i| self.walkable.get(i).copied())
            .unwrap_or(false)
    }

    /// Replace the terrain of a cell, re-deriving its walkability entry.
    ///
    /// Returns the previous kind, or `None` when the cell is out of bounds.
    pub fn replace_tile(&mut self, cell: Cell, kind: TerrainKind) -> Option<TerrainKind> {
        let index = self.bounds.index(cell)?;
        let previous = self.tiles[index].kind;
        self.tiles[index] = Tile::new(kind);
        self.walkable[index] = is_walkable(kind, cell.y, self.bounds.entrance_row);
        Some(previous)
    }

    pub fn integrity(&self, cell: Cell) -> Option<f32> {
        self.tile(cell).map(|t| t.integrity)
    }

    /// Erode a tile by `amount`, returning the remaining integrity.
    pub fn wear(&mut self, cell: Cell, amount: f32) -> Option<f32> {
        let index = self.bounds.index(cell)?;
        let tile = &mut self.tiles[index];
        tile.integrity = (tile.integrity - amount).max(0.0);
        Some(tile.integrity)
    }

    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.neighbors()
            .into_iter()
            .filter(move |n| self.is_walkable(*n))
    }

    /// Cheap accessibility pre-filter: at least one 4-neighbour is open.
    pub fn has_open_neighbor(&self, cell: Cell) -> bool {
        self.open_neighbors(cell).next().is_some()
    }

    /// Walkable cells of a row, left to right.
    pub fn walkable_in_row(&self, y: i32) -> Vec<Cell> {
        (self.bounds.min_x..self.bounds.max_x)
            .map(|x| Cell::new(x, y))
            .filter(|c| self.is_walkable(*c))
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Cell, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(move |(i, tile)| self.bounds.cell_at(i).map(|c| (c, tile)))
    }

    pub fn count_kind(&self, kind: TerrainKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// True when every cached entry matches the terrain rule.
    pub fn walkability_consistent(&self) -> bool {
        self.cells().all(|(cell, tile)| {
            self.is_walkable(cell) == is_walkable(tile.kind, cell.y, self.bounds.entrance_row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_bounds() -> GridBounds {
        GridBounds::new(-2, 3, -1, 4, 0)
    }

    #[test]
    fn test_index_round_trips_through_cell_at() {
        let bounds = small_bounds();
        for index in 0..bounds.cell_count() {
            let cell = bounds.cell_at(index).unwrap();
            assert_eq!(bounds.index(cell), Some(index));
        }
        assert_eq!(bounds.index(Cell::new(3, 0)), None);
        assert_eq!(bounds.index(Cell::new(0, -2)), None);
    }

    #[test]
    fn test_walkability_rule() {
        assert!(is_walkable(TerrainKind::Dirt, 0, 0));
        assert!(!is_walkable(TerrainKind::Dirt, 1, 0));
        assert!(!is_walkable(TerrainKind::Rock, 5, 0));
        assert!(!is_walkable(TerrainKind::Sky, -1, 0));
        assert!(is_walkable(TerrainKind::Empty, 3, 0));
        assert!(is_walkable(TerrainKind::RoyalRoom, 3, 0));
        assert!(is_walkable(TerrainKind::ResourceBearing, 3, 0));
        assert!(is_walkable(TerrainKind::Entrance, 0, 0));
    }

    #[test]
    fn test_out_of_bounds_is_not_walkable() {
        let grid = Grid::new(small_bounds(), TerrainKind::Empty);
        assert!(!grid.is_walkable(Cell::new(3, 1)));
        assert!(!grid.is_walkable(Cell::new(-3, 1)));
        assert!(grid.is_walkable(Cell::new(2, 3)));
    }

    #[test]
    fn test_replace_tile_updates_walkability() {
        let mut grid = Grid::new(small_bounds(), TerrainKind::Dirt);
        let cell = Cell::new(1, 2);
        assert!(!grid.is_walkable(cell));

        assert_eq!(grid.replace_tile(cell, TerrainKind::Empty), Some(TerrainKind::Dirt));
        assert!(grid.is_walkable(cell));

        grid.replace_tile(cell, TerrainKind::Rock);
        assert!(!grid.is_walkable(cell));
        assert!(grid.walkability_consistent());
    }

    #[test]
    fn test_entrance_row_stays_walkable() {
        let mut grid = Grid::new(small_bounds(), TerrainKind::Empty);
        let cell = Cell::new(0, 0);
        grid.replace_tile(cell, TerrainKind::Rock);
        assert!(grid.is_walkable(cell));
    }

    #[test]
    fn test_replace_out_of_bounds_is_noop() {
        let mut grid = Grid::new(small_bounds(), TerrainKind::Empty);
        assert_eq!(grid.replace_tile(Cell::new(10, 10), TerrainKind::Rock), None);
        assert!(grid.walkability_consistent());
    }

    #[test]
    fn test_wear_clamps_and_replace_resets() {
        let mut grid = Grid::new(small_bounds(), TerrainKind::Dirt);
        let cell = Cell::new(0, 1);
        assert_eq!(grid.wear(cell, 0.25), Some(0.75));
        assert_eq!(grid.wear(cell, 5.0), Some(0.0));
        grid.replace_tile(cell, TerrainKind::Empty);
        assert_eq!(grid.integrity(cell), Some(1.0));
    }

    #[test]
    fn test_has_open_neighbor() {
        let mut grid = Grid::new(GridBounds::new(0, 5, 0, 5, -10), TerrainKind::Dirt);
        let target = Cell::new(2, 2);
        assert!(!grid.has_open_neighbor(target));
        grid.replace_tile(Cell::new(2, 1), TerrainKind::Empty);
        assert!(grid.has_open_neighbor(target));
    }
}
