//! Simulation state shared by every system.
//!
//! Everything that is not an entity lives here: the grid, the task
//! registry, the food pool, the clock, population counters, the pending
//! event list, the pathfinder's buffers and the seeded random source. The
//! engine owns one `SimulationState` and passes it by reference into each
//! system.

use formicary_logic::clock::ColonyClock;
use formicary_logic::config::ColonyConfig;
use formicary_logic::economy::FoodStore;
use formicary_logic::jobs::{JobCounts, TaskKind};
use formicary_logic::{Cell, Grid, Pathfinder, TerrainKind};
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::events::ColonyEvent;
use crate::tasks::{Task, TaskId, TaskRegistry, TaskTarget};

/// Lifetime totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyCounters {
    pub births: u64,
    pub deaths: u64,
    pub tasks_completed: u64,
    pub tiles_dug: u64,
    pub food_spawned: u64,
}

#[derive(Debug)]
pub struct SimulationState {
    pub grid: Grid,
    pub tasks: TaskRegistry,
    pub food: FoodStore,
    pub clock: ColonyClock,
    pub population: JobCounts,
    pub counters: ColonyCounters,
    pub events: Vec<ColonyEvent>,
    pub pathfinder: Pathfinder,
    pub rng: StdRng,
}

impl SimulationState {
    pub fn new(config: &ColonyConfig, grid: Grid) -> Self {
        Self {
            grid,
            tasks: TaskRegistry::new(config.tasks.clone()),
            food: FoodStore::new(config.economy.initial_food),
            clock: ColonyClock::new(&config.clock),
            population: JobCounts::default(),
            counters: ColonyCounters::default(),
            events: Vec::new(),
            pathfinder: Pathfinder::new(config.scheduler.path_iteration_cap),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    pub fn emit(&mut self, event: ColonyEvent) {
        self.events.push(event);
    }

    /// Register a task and announce it. `None` when the target already has one.
    pub fn create_task(
        &mut self,
        target: TaskTarget,
        kind: TaskKind,
        cell: Cell,
        visible: bool,
    ) -> Option<TaskId> {
        let task = self.tasks.add_task(target, kind, cell, visible)?;
        log::debug!("{} created: {} at {:?}", task, kind.name(), cell);
        self.emit(ColonyEvent::TaskCreated {
            task,
            kind,
            cell,
            visible,
        });
        Some(task)
    }

    /// Remove a task, releasing its workers, and announce it.
    pub fn remove_task(&mut self, world: &mut World, id: TaskId) -> Option<Task> {
        let task = self.tasks.remove_task(id, world)?;
        self.emit(ColonyEvent::TaskRemoved {
            task: id,
            kind: task.kind,
            cell: task.cell,
        });
        Some(task)
    }

    /// Change a tile and announce it.
    pub fn replace_tile(&mut self, cell: Cell, kind: TerrainKind) -> Option<TerrainKind> {
        let from = self.grid.replace_tile(cell, kind)?;
        if from != kind {
            self.emit(ColonyEvent::TerrainChanged {
                cell,
                from,
                to: kind,
            });
        }
        Some(from)
    }
}
