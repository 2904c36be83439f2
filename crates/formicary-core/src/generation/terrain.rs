//! Nest terrain generation

use formicary_logic::config::GridConfig;
use formicary_logic::{Cell, Grid, TerrainKind};
use rand::Rng;

/// Generate the starting nest.
///
/// Sky above the entrance row, an open surface row with the entrance tile,
/// and dirt below it sprinkled with rock and resource-bearing tiles. A
/// vertical shaft runs from the entrance down to a 3x2 royal room.
pub fn generate_terrain(config: &GridConfig, rng: &mut impl Rng) -> Grid {
    let bounds = config.bounds();
    let entrance = entrance_cell(config);
    let mut grid = Grid::from_fn(bounds, |cell| {
        if cell.y < bounds.entrance_row {
            TerrainKind::Sky
        } else if cell == entrance {
            TerrainKind::Entrance
        } else if cell.y == bounds.entrance_row {
            TerrainKind::Empty
        } else {
            let roll: f32 = rng.gen();
            if roll < config.rock_chance {
                TerrainKind::Rock
            } else if roll < config.rock_chance + config.resource_chance {
                TerrainKind::ResourceBearing
            } else {
                TerrainKind::Dirt
            }
        }
    });

    let room = royal_room_cells(config);
    let room_top = room.iter().map(|c| c.y).min().unwrap_or(entrance.y);
    for y in (entrance.y + 1)..room_top {
        grid.replace_tile(Cell::new(entrance.x, y), TerrainKind::Empty);
    }
    for cell in room {
        grid.replace_tile(cell, TerrainKind::RoyalRoom);
    }
    grid
}

pub fn entrance_cell(config: &GridConfig) -> Cell {
    Cell::new(config.entrance_x, config.entrance_row)
}

/// The six royal room cells, centred under the entrance.
pub fn royal_room_cells(config: &GridConfig) -> Vec<Cell> {
    let top = config.entrance_row + config.royal_room_depth;
    let mut cells = Vec::with_capacity(6);
    for y in top..top + 2 {
        for x in (config.entrance_x - 1)..=(config.entrance_x + 1) {
            cells.push(Cell::new(x, y));
        }
    }
    cells.retain(|c| config.bounds().contains(*c));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use formicary_logic::Pathfinder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_terrain_layers() {
        let config = GridConfig::default();
        let grid = generate_terrain(&config, &mut StdRng::seed_from_u64(1));

        assert_eq!(grid.terrain(Cell::new(5, -3)), Some(TerrainKind::Sky));
        assert_eq!(grid.terrain(entrance_cell(&config)), Some(TerrainKind::Entrance));
        assert!(grid.walkable_in_row(config.entrance_row).len() == grid.bounds().width());
        assert_eq!(grid.count_kind(TerrainKind::RoyalRoom), 6);
        assert!(grid.count_kind(TerrainKind::Dirt) > grid.count_kind(TerrainKind::Rock));
        assert!(grid.walkability_consistent());
    }

    #[test]
    fn test_royal_room_reachable_from_entrance() {
        let config = GridConfig::default();
        let grid = generate_terrain(&config, &mut StdRng::seed_from_u64(9));
        let room = royal_room_cells(&config);
        let mut pathfinder = Pathfinder::default();
        for cell in room {
            let path = pathfinder.find_path(&grid, entrance_cell(&config), cell, true);
            assert!(path.is_some(), "room cell {:?} unreachable", cell);
        }
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let config = GridConfig::default();
        let a = generate_terrain(&config, &mut StdRng::seed_from_u64(5));
        let b = generate_terrain(&config, &mut StdRng::seed_from_u64(5));
        assert!(a.cells().zip(b.cells()).all(|((_, x), (_, y))| x.kind == y.kind));
    }
}
