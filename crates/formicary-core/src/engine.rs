//! Colony engine - main entry point for running the simulation

use formicary_logic::config::{ColonyConfig, ConfigError};
use formicary_logic::jobs::{Job, JobCounts, TaskKind};
use formicary_logic::{Cell, Grid, TerrainKind};
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

use crate::components::*;
use crate::events::ColonyEvent;
use crate::generation::{generate_terrain, populate_colony};
use crate::state::{ColonyCounters, SimulationState};
use crate::systems::*;
use crate::tasks::{TaskId, TaskTarget};

/// Rejected player command. The simulation is unaffected.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("no agent {0:?}")]
    UnknownAgent(Entity),
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) holds {kind:?}, which cannot be dug")]
    NotDiggable { x: i32, y: i32, kind: TerrainKind },
    #[error("cell ({x}, {y}) holds {kind:?}, which cannot be harvested")]
    NotHarvestable { x: i32, y: i32, kind: TerrainKind },
    #[error("{kind} tasks need a matching target object")]
    InvalidTarget { kind: &'static str },
    #[error("the queen's job cannot change")]
    QueenImmutable,
    #[error("{0} does not exist")]
    TaskNotFound(TaskId),
    #[error("{0} is system-generated and cannot be cancelled")]
    TaskNotVisible(TaskId),
}

/// Observable state of one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentView {
    pub entity: Entity,
    pub job: Job,
    pub cell: Cell,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub activity: Activity,
    pub health: f32,
    pub task: Option<TaskId>,
}

/// Observable state of one task.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: TaskId,
    pub kind: TaskKind,
    pub target: TaskTarget,
    pub cell: Cell,
    pub priority: i32,
    pub capacity: usize,
    pub workers: usize,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColonyStats {
    pub elapsed: f64,
    pub ticks: u64,
    pub day: u32,
    pub food: f32,
    pub population: JobCounts,
    pub idle: usize,
    pub walking: usize,
    pub working: usize,
    pub tasks: usize,
    pub corpses: usize,
    pub food_items: usize,
    pub path_searches: u64,
    pub path_overruns: u64,
    pub counters: ColonyCounters,
}

/// Main simulation engine
pub struct ColonyEngine {
    /// ECS world containing agents and world objects
    pub world: World,
    /// Grid, tasks, food, clock and everything else that is not an entity
    pub state: SimulationState,
    config: ColonyConfig,
    time_scale: f32,
}

impl ColonyEngine {
    /// Validate `config`, generate the nest and found the colony.
    pub fn new(config: ColonyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let grid = generate_terrain(&config.grid, &mut rng);
        let mut engine = Self::build(config, grid);
        // founding draws continue the terrain stream
        engine.state.rng = rng;
        populate_colony(&mut engine.world, &mut engine.state, &engine.config);
        Ok(engine)
    }

    /// Engine over terrain from an external source, with no agents.
    pub fn with_grid(config: ColonyConfig, grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, grid))
    }

    fn build(config: ColonyConfig, grid: Grid) -> Self {
        let state = SimulationState::new(&config, grid);
        Self {
            world: World::new(),
            state,
            config,
            time_scale: 1.0,
        }
    }

    /// Advance the colony by `delta_seconds` of wall time.
    pub fn update(&mut self, delta_seconds: f32) {
        let dt = delta_seconds * self.time_scale;
        if dt <= 0.0 {
            return;
        }
        let world = &mut self.world;
        let state = &mut self.state;
        let config = &self.config;

        let tick = state.clock.advance(dt);
        spawning_system(world, state, config, tick);

        scheduler_system(world, state, config, dt);

        metabolism_system(world, &mut state.food, &config.agents, dt);
        let blocked = movement_system(world, &state.grid, config.agents.speed, dt);
        for agent in blocked {
            release_agent(world, state, agent);
        }
        work_system(world, state, config, dt);

        death_system(world, state);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    // ── Commands ───────────────────────────────────────────────────────

    /// Spawn an agent at `cell` with the configured spawn grace.
    pub fn spawn_agent(&mut self, job: Job, cell: Cell) -> Result<Entity, CommandError> {
        self.check_cell(cell)?;
        let grace = self.config.agents.spawn_grace;
        Ok(spawn_agent(&mut self.world, &mut self.state, job, cell, grace))
    }

    /// Queue a player dig at `cell`. `Ok(None)` when one is already queued.
    pub fn queue_dig(&mut self, cell: Cell) -> Result<Option<TaskId>, CommandError> {
        self.create_task(TaskKind::Dig, cell, None)
    }

    /// Create a player-visible task. Tile tasks take `target == None`;
    /// harvesting a food item or cleaning a corpse names the object.
    pub fn create_task(
        &mut self,
        kind: TaskKind,
        cell: Cell,
        target: Option<Entity>,
    ) -> Result<Option<TaskId>, CommandError> {
        let terrain = self.check_cell(cell)?;
        let target = match (kind, target) {
            (TaskKind::Dig, None) if terrain.is_diggable() => TaskTarget::Tile(cell),
            (TaskKind::Dig, None) => {
                return Err(CommandError::NotDiggable {
                    x: cell.x,
                    y: cell.y,
                    kind: terrain,
                })
            }
            (TaskKind::Harvest, None) if terrain.is_harvestable() => TaskTarget::Tile(cell),
            (TaskKind::Harvest, None) => {
                return Err(CommandError::NotHarvestable {
                    x: cell.x,
                    y: cell.y,
                    kind: terrain,
                })
            }
            (TaskKind::Harvest, Some(item))
                if self
                    .world
                    .get::<&FoodItem>(item)
                    .is_ok_and(|food| food.cell == cell) =>
            {
                TaskTarget::Object(item)
            }
            (TaskKind::CleanCorpse, Some(corpse))
                if self
                    .world
                    .get::<&Corpse>(corpse)
                    .is_ok_and(|body| body.cell == cell) =>
            {
                TaskTarget::Object(corpse)
            }
            (kind, _) => return Err(CommandError::InvalidTarget { kind: kind.name() }),
        };
        Ok(self.state.create_task(target, kind, cell, true))
    }

    /// Cancel a player-visible task, sending its workers back to idle.
    pub fn cancel_task(&mut self, id: TaskId) -> Result<(), CommandError> {
        let task = self
            .state
            .tasks
            .get(id)
            .ok_or(CommandError::TaskNotFound(id))?;
        if !task.visible {
            return Err(CommandError::TaskNotVisible(id));
        }
        self.state.remove_task(&mut self.world, id);
        log::debug!("{} cancelled", id);
        Ok(())
    }

    /// Change an agent's job. The queen stays the queen.
    pub fn reassign_job(&mut self, agent: Entity, job: Job) -> Result<(), CommandError> {
        let mut current = self
            .world
            .get::<&mut Agent>(agent)
            .map_err(|_| CommandError::UnknownAgent(agent))?;
        if current.is_queen() || job == Job::Queen {
            return Err(CommandError::QueenImmutable);
        }
        let previous = current.job;
        current.job = job;
        drop(current);

        // a held task keeps its claim but is now scored for the new job
        if let Ok(mut assignment) = self.world.get::<&mut Assignment>(agent) {
            let bonus = self.config.tasks.specialization_bonus;
            if let Some(task) = assignment.task.and_then(|id| self.state.tasks.get(id)) {
                assignment.priority = job.priority_score(task.kind, task.priority, bonus);
            }
        }

        self.state.population.remove(previous);
        self.state.population.add(job);
        log::debug!("agent {:?} is now a {}", agent, job.name());
        Ok(())
    }

    /// Turn the lowest-id idle Worker into `job`. `Ok(None)` when no
    /// worker is idle.
    pub fn promote_worker(&mut self, job: Job) -> Result<Option<Entity>, CommandError> {
        if job == Job::Queen {
            return Err(CommandError::QueenImmutable);
        }
        let candidate = self
            .world
            .query::<(&Agent, &Route, &Assignment)>()
            .iter()
            .filter(|(_, (agent, route, assignment))| {
                agent.job == Job::Worker && Activity::of(route, assignment) == Activity::Idle
            })
            .map(|(entity, _)| entity)
            .min_by_key(|entity| entity.id());
        let Some(agent) = candidate else {
            return Ok(None);
        };
        self.reassign_job(agent, job)?;
        Ok(Some(agent))
    }

    fn check_cell(&self, cell: Cell) -> Result<TerrainKind, CommandError> {
        self.state
            .grid
            .terrain(cell)
            .ok_or(CommandError::OutOfBounds {
                x: cell.x,
                y: cell.y,
            })
    }

    // ── Views ──────────────────────────────────────────────────────────

    /// Every live agent, ordered by entity id.
    pub fn agent_views(&self) -> Vec<AgentView> {
        let mut views: Vec<AgentView> = self
            .world
            .query::<(&Agent, &Health, &Position, &Route, &Assignment)>()
            .iter()
            .map(|(entity, (agent, health, pos, route, assignment))| AgentView {
                entity,
                job: agent.job,
                cell: pos.cell,
                x: pos.x,
                y: pos.y,
                facing: pos.facing,
                activity: if agent.is_queen() {
                    Activity::Idle
                } else {
                    Activity::of(route, assignment)
                },
                health: health.value,
                task: assignment.task,
            })
            .collect();
        views.sort_by_key(|v| v.entity.id());
        views
    }

    pub fn agent_view(&self, agent: Entity) -> Option<AgentView> {
        self.agent_views().into_iter().find(|v| v.entity == agent)
    }

    /// Every task, in creation order.
    pub fn task_views(&self) -> Vec<TaskView> {
        self.state
            .tasks
            .iter()
            .map(|t| TaskView {
                id: t.id,
                kind: t.kind,
                target: t.target,
                cell: t.cell,
                priority: t.priority,
                capacity: t.capacity,
                workers: t.workers.len(),
                visible: t.visible,
            })
            .collect()
    }

    pub fn food(&self) -> f32 {
        self.state.food.amount()
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn population(&self) -> JobCounts {
        self.state.population
    }

    pub fn agent_count(&self) -> usize {
        self.world.query::<&Agent>().iter().count()
    }

    pub fn elapsed(&self) -> f64 {
        self.state.clock.elapsed()
    }

    pub fn day(&self) -> u32 {
        self.state.clock.day()
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<ColonyEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn stats(&self) -> ColonyStats {
        let mut idle = 0;
        let mut walking = 0;
        let mut working = 0;
        for view in self.agent_views() {
            match view.activity {
                Activity::Idle => idle += 1,
                Activity::Walking => walking += 1,
                Activity::Working => working += 1,
            }
        }
        ColonyStats {
            elapsed: self.state.clock.elapsed(),
            ticks: self.state.clock.ticks(),
            day: self.state.clock.day(),
            food: self.state.food.amount(),
            population: self.state.population,
            idle,
            walking,
            working,
            tasks: self.state.tasks.len(),
            corpses: self.world.query::<&Corpse>().iter().count(),
            food_items: self.world.query::<&FoodItem>().iter().count(),
            path_searches: self.state.pathfinder.searches(),
            path_overruns: self.state.pathfinder.overruns(),
            counters: self.state.counters,
        }
    }

    /// Check the structural invariants, returning a description of every
    /// violation found. Empty means healthy.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if !self.state.grid.walkability_consistent() {
            violations.push("walkability matrix out of sync with terrain".to_string());
        }

        let mut membership: std::collections::HashMap<Entity, Vec<TaskId>> =
            std::collections::HashMap::new();
        for task in self.state.tasks.iter() {
            if task.workers.len() > task.capacity {
                violations.push(format!(
                    "{} has {} workers over capacity {}",
                    task.id,
                    task.workers.len(),
                    task.capacity
                ));
            }
            for &worker in &task.workers {
                membership.entry(worker).or_default().push(task.id);
            }
        }

        for (worker, tasks) in &membership {
            if tasks.len() > 1 {
                violations.push(format!("agent {:?} is a worker of {:?}", worker, tasks));
            }
            let held = self.world.get::<&Assignment>(*worker).ok().and_then(|a| a.task);
            if held != tasks.first().copied() {
                violations.push(format!(
                    "agent {:?} listed on {:?} but holds {:?}",
                    worker, tasks, held
                ));
            }
        }

        for (entity, (pos, route, assignment)) in self
            .world
            .query::<(&Position, &Route, &Assignment)>()
            .iter()
        {
            if let Some(task) = assignment.task {
                if !membership.get(&entity).is_some_and(|t| t.contains(&task)) {
                    violations.push(format!(
                        "agent {:?} holds {} but is not among its workers",
                        entity, task
                    ));
                }
            }
            let mut previous = pos.cell;
            for &cell in &route.cells {
                if !previous.is_adjacent(cell) {
                    violations.push(format!(
                        "agent {:?} route jumps {:?} -> {:?}",
                        entity, previous, cell
                    ));
                    break;
                }
                previous = cell;
            }
        }

        violations
    }
}

/// Drop whatever an agent is doing: release its task, clear its route.
fn release_agent(world: &mut World, state: &mut SimulationState, agent: Entity) {
    let task = world.get::<&Assignment>(agent).ok().and_then(|a| a.task);
    if let Some(task) = task {
        state.tasks.release_worker(task, agent);
        crate::tasks::detach_agent(world, agent, task);
        log::debug!("agent {:?} blocked, released {}", agent, task);
    }
}
