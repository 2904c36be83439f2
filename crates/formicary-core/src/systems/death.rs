//! Death system - removes agents whose health ran out

use formicary_logic::jobs::{Job, TaskKind};
use formicary_logic::Cell;
use hecs::{Entity, World};

use crate::components::{Agent, Assignment, Corpse, Health, Integrity, Position};
use crate::events::ColonyEvent;
use crate::state::SimulationState;
use crate::tasks::{TaskId, TaskTarget};

/// Kill every agent at or below zero health.
///
/// A dying agent releases its task and leaves the population. Everyone but
/// the queen leaves a corpse behind, with a system-generated cleanup task
/// at the cell the agent died in. Returns the agents that died.
pub fn death_system(world: &mut World, state: &mut SimulationState) -> Vec<Entity> {
    let mut dead: Vec<(Entity, Job, Cell, Option<TaskId>)> = world
        .query::<(&Agent, &Health, &Position, &Assignment)>()
        .iter()
        .filter(|(_, (_, health, _, _))| health.is_dead())
        .map(|(entity, (agent, _, pos, assignment))| (entity, agent.job, pos.cell, assignment.task))
        .collect();
    dead.sort_by_key(|(entity, ..)| entity.id());

    let mut died = Vec::with_capacity(dead.len());
    for (entity, job, cell, task) in dead {
        if let Some(task) = task {
            state.tasks.release_worker(task, entity);
        }
        if world.despawn(entity).is_err() {
            continue;
        }
        state.population.remove(job);
        state.counters.deaths += 1;
        state.emit(ColonyEvent::AgentDied {
            agent: entity,
            job,
            cell,
        });
        log::info!("{} {:?} died at {:?}", job.name(), entity, cell);

        if job != Job::Queen {
            let corpse = world.spawn((Corpse { cell, job }, Integrity::default()));
            state.create_task(TaskTarget::Object(corpse), TaskKind::CleanCorpse, cell, false);
        }
        died.push(entity);
    }
    died
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Route;
    use formicary_logic::config::ColonyConfig;
    use formicary_logic::{Grid, GridBounds, TerrainKind};

    fn state() -> SimulationState {
        let grid = Grid::new(GridBounds::new(0, 5, 0, 5, -1), TerrainKind::Empty);
        SimulationState::new(&ColonyConfig::default(), grid)
    }

    fn spawn(world: &mut World, state: &mut SimulationState, job: Job, health: f32) -> Entity {
        state.population.add(job);
        world.spawn((
            Agent::new(job, 0.0),
            Health { value: health },
            Position::at(Cell::new(2, 2)),
            Route::default(),
            Assignment::default(),
        ))
    }

    #[test]
    fn test_dead_worker_leaves_corpse_task() {
        let mut world = World::new();
        let mut state = state();
        let ant = spawn(&mut world, &mut state, Job::Worker, 0.0);
        spawn(&mut world, &mut state, Job::Worker, 0.5);

        let died = death_system(&mut world, &mut state);
        assert_eq!(died, vec![ant]);
        assert!(!world.contains(ant));
        assert_eq!(state.population.workers, 1);

        let task = state.tasks.find_task(|t| t.kind == TaskKind::CleanCorpse).unwrap();
        assert_eq!(task.cell, Cell::new(2, 2));
        assert!(!task.visible);
        assert_eq!(world.query::<&Corpse>().iter().count(), 1);

        // a second pass finds nobody new
        assert!(death_system(&mut world, &mut state).is_empty());
        assert_eq!(state.tasks.len(), 1);
    }

    #[test]
    fn test_dead_agent_releases_task() {
        let mut world = World::new();
        let mut state = state();
        let target = Cell::new(4, 4);
        let id = state
            .create_task(TaskTarget::Tile(target), TaskKind::Dig, target, true)
            .unwrap();
        let ant = spawn(&mut world, &mut state, Job::Worker, -0.1);
        world.get::<&mut Assignment>(ant).unwrap().task = Some(id);
        state.tasks.assign(id, ant);

        death_system(&mut world, &mut state);
        assert!(state.tasks.get(id).unwrap().workers.is_empty());
    }

    #[test]
    fn test_queen_leaves_no_corpse() {
        let mut world = World::new();
        let mut state = state();
        spawn(&mut world, &mut state, Job::Queen, 0.0);

        death_system(&mut world, &mut state);
        assert_eq!(state.population.queens, 0);
        assert!(state.tasks.is_empty());
        assert_eq!(world.query::<&Corpse>().iter().count(), 0);
    }
}
