//! Spawning system - clock-driven food drops, brood and day rollover

use formicary_logic::clock::ClockTick;
use formicary_logic::config::ColonyConfig;
use formicary_logic::jobs::{Job, TaskKind};
use formicary_logic::Cell;
use hecs::{Entity, World};
use rand::seq::SliceRandom;

use crate::components::{Agent, Assignment, FoodItem, Health, Integrity, Position, Route};
use crate::events::ColonyEvent;
use crate::state::SimulationState;
use crate::tasks::TaskTarget;

/// Spawn an agent with full health and no task.
pub fn spawn_agent(
    world: &mut World,
    state: &mut SimulationState,
    job: Job,
    cell: Cell,
    grace: f32,
) -> Entity {
    let entity = world.spawn((
        Agent::new(job, grace),
        Health::default(),
        Position::at(cell),
        Route::default(),
        Assignment::default(),
    ));
    state.population.add(job);
    state.emit(ColonyEvent::AgentSpawned {
        agent: entity,
        job,
        cell,
    });
    entity
}

/// React to whatever the clock fired this tick.
pub fn spawning_system(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
    tick: ClockTick,
) {
    for _ in 0..tick.food_spawns {
        spawn_food_item(world, state, config);
    }
    for _ in 0..tick.broods {
        spawn_brood(world, state, config);
    }
    for _ in 0..tick.days_passed {
        let day = state.clock.day();
        log::info!(
            "day {} begins: {} agents, food {:.2}",
            day,
            state.population.total(),
            state.food.amount()
        );
        state.emit(ColonyEvent::DayPassed { day });
    }
}

/// Drop a food item on a free surface cell, with an invisible harvest task.
pub fn spawn_food_item(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
) -> Option<Entity> {
    let occupied: Vec<Cell> = world.query::<&FoodItem>().iter().map(|(_, f)| f.cell).collect();
    if occupied.len() >= config.economy.max_food_items {
        return None;
    }
    let entrance_row = state.grid.bounds().entrance_row;
    let free: Vec<Cell> = state
        .grid
        .walkable_in_row(entrance_row)
        .into_iter()
        .filter(|c| !occupied.contains(c))
        .collect();
    let cell = *free.choose(&mut state.rng)?;

    let item = world.spawn((
        FoodItem {
            cell,
            amount: config.economy.food_item_yield,
        },
        Integrity::default(),
    ));
    state.create_task(TaskTarget::Object(item), TaskKind::Harvest, cell, false);
    state.counters.food_spawned += 1;
    state.emit(ColonyEvent::FoodSpawned { item, cell });
    log::debug!("food item {:?} spawned at {:?}", item, cell);
    Some(item)
}

/// Lay a new worker at the queen's cell if she is fit and the pool can pay.
pub fn spawn_brood(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
) -> Option<Entity> {
    let (queen_cell, queen_health) = world
        .query::<(&Agent, &Health, &Position)>()
        .iter()
        .find(|(_, (agent, _, _))| agent.is_queen())
        .map(|(_, (_, health, pos))| (pos.cell, health.value))?;

    if queen_health < config.economy.brood_min_queen_health {
        log::debug!("queen too weak to lay ({:.2})", queen_health);
        return None;
    }
    if !state.food.try_spend(config.economy.brood_cost) {
        log::debug!("not enough food to lay ({:.2})", state.food.amount());
        return None;
    }

    let larva = spawn_agent(world, state, Job::Worker, queen_cell, config.agents.spawn_grace);
    state.counters.births += 1;
    log::info!(
        "new worker {:?} born at {:?}, population {}",
        larva,
        queen_cell,
        state.population.total()
    );
    Some(larva)
}
