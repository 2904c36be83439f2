//! Work system - agents at their task site erode the target, and consumed
//! targets complete their task.

use std::collections::BTreeSet;

use formicary_logic::config::ColonyConfig;
use formicary_logic::jobs::TaskKind;
use formicary_logic::TerrainKind;
use hecs::{Entity, World};

use crate::components::{Agent, Assignment, FoodItem, Integrity, Route};
use crate::events::ColonyEvent;
use crate::state::SimulationState;
use crate::tasks::{TaskId, TaskTarget};

/// Apply one tick of work for every agent that has arrived at its task.
///
/// Each worker removes `delta / energy` of the target's integrity, so two
/// workers finish twice as fast. Targets that reach zero complete their
/// task after all workers have been processed.
pub fn work_system(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
    delta_seconds: f32,
) {
    let mut working: Vec<(Entity, TaskId)> = world
        .query::<(&Agent, &Route, &Assignment)>()
        .iter()
        .filter(|(_, (agent, route, _))| !agent.is_queen() && route.is_empty())
        .filter_map(|(entity, (_, _, assignment))| assignment.task.map(|t| (entity, t)))
        .collect();
    working.sort_by_key(|(entity, _)| entity.id());

    let mut finished: BTreeSet<TaskId> = BTreeSet::new();
    let mut stale = Vec::new();

    for (entity, id) in working {
        if finished.contains(&id) {
            continue;
        }
        let Some(task) = state.tasks.get(id) else {
            stale.push(entity);
            continue;
        };
        let wear = delta_seconds / config.tasks.rule(task.kind).energy;
        let remaining = match task.target {
            TaskTarget::Tile(cell) => state.grid.wear(cell, wear),
            TaskTarget::Object(object) => world
                .get::<&mut Integrity>(object)
                .ok()
                .map(|mut integrity| integrity.wear(wear)),
        };
        // a target that vanished is as good as consumed
        if remaining.map_or(true, |r| r <= 0.0) {
            finished.insert(id);
        }
    }

    for entity in stale {
        if let Ok(mut assignment) = world.get::<&mut Assignment>(entity) {
            assignment.clear();
        }
    }
    for id in finished {
        complete_task(world, state, config, id);
    }
}

/// Consume a task's target, pay out any food, and remove the task.
pub fn complete_task(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
    id: TaskId,
) {
    let Some(task) = state.tasks.get(id).cloned() else {
        return;
    };
    state.emit(ColonyEvent::TaskCompleted {
        task: id,
        kind: task.kind,
        cell: task.cell,
    });
    state.remove_task(world, id);
    state.counters.tasks_completed += 1;

    match (task.kind, task.target) {
        (TaskKind::Dig, TaskTarget::Tile(cell)) => {
            state.replace_tile(cell, TerrainKind::Empty);
            state.counters.tiles_dug += 1;
            log::info!("dug out {:?}", cell);
        }
        (TaskKind::Harvest, TaskTarget::Tile(cell)) => {
            state.replace_tile(cell, TerrainKind::Empty);
            state.food.deposit(config.economy.resource_tile_yield);
            log::info!(
                "harvested {:?}, food now {:.2}",
                cell,
                state.food.amount()
            );
        }
        (TaskKind::Harvest, TaskTarget::Object(item)) => {
            let amount = world
                .get::<&FoodItem>(item)
                .map(|f| f.amount)
                .unwrap_or(0.0);
            let _ = world.despawn(item);
            state.food.deposit(amount);
            log::info!(
                "collected food at {:?}, food now {:.2}",
                task.cell,
                state.food.amount()
            );
        }
        (TaskKind::CleanCorpse, TaskTarget::Object(corpse)) => {
            let _ = world.despawn(corpse);
            log::info!("cleaned up corpse at {:?}", task.cell);
        }
        (kind, target) => {
            log::warn!("{} completed with unsupported target {:?}", kind.name(), target);
        }
    }
}
