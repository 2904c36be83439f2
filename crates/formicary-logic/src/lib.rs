//! Pure colony logic for Formicary.
//!
//! This crate contains the parts of the colony simulation that do not need
//! an ECS or a driver: the tile grid and its walkability matrix, the grid
//! pathfinder, the shared food pool, job/task tables, the colony clock and
//! configuration. Functions take plain data and return results, so every
//! piece is unit-testable on its own.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cell`] | Integer grid coordinates and 4-neighbourhoods |
//! | [`grid`] | Terrain tiles, dense walkability matrix, tile integrity |
//! | [`pathfinding`] | Bounded A* search with an "exclude destination" mode |
//! | [`economy`] | Shared food pool and feeding semantics |
//! | [`jobs`] | Jobs, task kinds, specialization and job profiles |
//! | [`clock`] | Elapsed time, interval timers, day count |
//! | [`config`] | Serde configuration and validation |

pub mod cell;
pub mod clock;
pub mod config;
pub mod economy;
pub mod grid;
pub mod jobs;
pub mod pathfinding;

pub use cell::Cell;
pub use grid::{Grid, GridBounds, TerrainKind};
pub use pathfinding::Pathfinder;
