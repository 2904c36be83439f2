//! Scheduler - matches idle (or preemptible) agents to awaiting tasks.
//!
//! Runs once per tick:
//! 1. Snapshot the awaiting tasks: below capacity, with at least one open
//!    neighbour around the target.
//! 2. For every eligible agent, rank the awaiting tasks by priority score
//!    (base priority plus the job's specialization bonus) descending, then
//!    squared distance ascending. Agents that already hold a task only see
//!    tasks that score strictly higher than the one they hold.
//! 3. Visit agents best-claim first (top score, then nearest, then entity
//!    id) so the closest agents win contested slots. Each agent walks down
//!    its ranking, asking the pathfinder for a route, and commits the first
//!    task it can reach. A task that fills up leaves the awaiting set
//!    immediately.

use std::cmp::Reverse;
use std::collections::HashSet;

use formicary_logic::config::ColonyConfig;
use formicary_logic::jobs::{Job, TaskKind};
use formicary_logic::Cell;
use hecs::{Entity, World};

use crate::components::{Agent, Assignment, Position, Route};
use crate::events::ColonyEvent;
use crate::state::SimulationState;
use crate::tasks::TaskId;

/// One awaiting task as seen by the scheduler this tick.
#[derive(Debug, Clone, Copy)]
struct Awaiting {
    id: TaskId,
    kind: TaskKind,
    cell: Cell,
    priority: i32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    task: TaskId,
    cell: Cell,
    score: i32,
    distance: i64,
}

#[derive(Debug)]
struct Seeker {
    entity: Entity,
    cell: Cell,
    held: Option<(TaskId, i32)>,
    ranked: Vec<Candidate>,
}

impl Seeker {
    fn sort_key(&self) -> (Reverse<i32>, i64, u32) {
        let (score, distance) = self
            .ranked
            .first()
            .map(|c| (c.score, c.distance))
            .unwrap_or((i32::MIN, i64::MAX));
        (Reverse(score), distance, self.entity.id())
    }
}

/// Count down agent timers, then match agents to tasks.
pub fn scheduler_system(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
    delta_seconds: f32,
) {
    tick_agent_timers(world, delta_seconds);

    let awaiting = awaiting_tasks(state);
    if awaiting.is_empty() {
        return;
    }
    let mut open: HashSet<TaskId> = awaiting.iter().map(|t| t.id).collect();

    let mut seekers = collect_seekers(world, state, config, &awaiting);
    seekers.sort_by_key(Seeker::sort_key);

    for seeker in seekers {
        let claimed = try_claim(world, state, config, &seeker, &mut open);
        if let Ok(mut agent) = world.get::<&mut Agent>(seeker.entity) {
            agent.search_cooldown = config.scheduler.search_cooldown;
        }
        if !claimed {
            log::trace!(
                "agent {:?} at {:?} found no reachable task",
                seeker.entity,
                seeker.cell
            );
        }
    }
}

fn tick_agent_timers(world: &mut World, delta_seconds: f32) {
    for (_, agent) in world.query_mut::<&mut Agent>() {
        agent.grace = (agent.grace - delta_seconds).max(0.0);
        agent.search_cooldown = (agent.search_cooldown - delta_seconds).max(0.0);
    }
}

/// Tasks with a free slot whose target is not walled in.
fn awaiting_tasks(state: &SimulationState) -> Vec<Awaiting> {
    state
        .tasks
        .iter()
        .filter(|t| !t.is_full() && state.grid.has_open_neighbor(t.cell))
        .map(|t| Awaiting {
            id: t.id,
            kind: t.kind,
            cell: t.cell,
            priority: t.priority,
        })
        .collect()
}

fn collect_seekers(
    world: &World,
    state: &SimulationState,
    config: &ColonyConfig,
    awaiting: &[Awaiting],
) -> Vec<Seeker> {
    let bonus = config.tasks.specialization_bonus;
    let mut seekers = Vec::new();

    for (entity, (agent, pos, route, assignment)) in world
        .query::<(&Agent, &Position, &Route, &Assignment)>()
        .iter()
    {
        if agent.is_busy() || agent.search_cooldown > 0.0 || !route.is_empty() {
            continue;
        }
        let held = assignment
            .task
            .and_then(|id| state.tasks.get(id))
            .map(|t| (t.id, agent.job.priority_score(t.kind, t.priority, bonus)));

        let ranked = rank_tasks(agent.job, pos.cell, held, awaiting, bonus);
        if ranked.is_empty() {
            continue;
        }
        seekers.push(Seeker {
            entity,
            cell: pos.cell,
            held,
            ranked,
        });
    }

    seekers
}

/// Rank awaiting tasks for one agent, best first.
fn rank_tasks(
    job: Job,
    from: Cell,
    held: Option<(TaskId, i32)>,
    awaiting: &[Awaiting],
    bonus: i32,
) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = awaiting
        .iter()
        .map(|t| Candidate {
            task: t.id,
            cell: t.cell,
            score: job.priority_score(t.kind, t.priority, bonus),
            distance: from.distance_squared(t.cell),
        })
        // only a strictly better score may preempt a held task
        .filter(|c| held.map_or(true, |(id, p)| c.task != id && c.score > p))
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.distance.cmp(&b.distance))
            .then(a.task.cmp(&b.task))
    });
    ranked
}

/// Walk down the seeker's ranking and commit the first reachable task.
fn try_claim(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
    seeker: &Seeker,
    open: &mut HashSet<TaskId>,
) -> bool {
    let mut attempts = 0;
    for candidate in &seeker.ranked {
        if attempts >= config.scheduler.max_path_attempts {
            break;
        }
        if !open.contains(&candidate.task) {
            continue;
        }
        if state.tasks.get(candidate.task).map_or(true, |t| t.is_full()) {
            open.remove(&candidate.task);
            continue;
        }
        attempts += 1;

        // walk onto open targets, stop next to solid ones
        let include_destination = state.grid.is_walkable(candidate.cell);
        let Some(path) =
            state
                .pathfinder
                .find_path(&state.grid, seeker.cell, candidate.cell, include_destination)
        else {
            log::trace!(
                "no path for {:?} from {:?} to {}",
                seeker.entity,
                seeker.cell,
                candidate.task
            );
            continue;
        };

        let preempted = seeker.held.map(|(id, _)| id);
        if let Some(old) = preempted {
            state.tasks.release_worker(old, seeker.entity);
            if let Ok(mut assignment) = world.get::<&mut Assignment>(seeker.entity) {
                assignment.clear();
            }
        }
        if !state.tasks.assign(candidate.task, seeker.entity) {
            open.remove(&candidate.task);
            continue;
        }
        if state
            .tasks
            .get(candidate.task)
            .map_or(true, |t| t.is_full())
        {
            open.remove(&candidate.task);
        }

        let mut cells = path;
        cells.remove(0);
        if !include_destination {
            cells.pop();
        }
        if let Ok(mut route) = world.get::<&mut Route>(seeker.entity) {
            *route = Route::new(cells);
        }
        if let Ok(mut assignment) = world.get::<&mut Assignment>(seeker.entity) {
            assignment.task = Some(candidate.task);
            assignment.priority = candidate.score;
        }

        match preempted {
            Some(old) => log::debug!(
                "agent {:?} dropped {} for {} (score {})",
                seeker.entity,
                old,
                candidate.task,
                candidate.score
            ),
            None => log::debug!(
                "agent {:?} assigned {} (score {})",
                seeker.entity,
                candidate.task,
                candidate.score
            ),
        }
        state.emit(ColonyEvent::TaskAssigned {
            task: candidate.task,
            agent: seeker.entity,
            preempted,
        });
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use formicary_logic::jobs::TaskKind;

    fn awaiting(id: u64, kind: TaskKind, cell: Cell, priority: i32) -> Awaiting {
        Awaiting {
            id: TaskId(id),
            kind,
            cell,
            priority,
        }
    }

    #[test]
    fn test_rank_prefers_specialization_over_distance() {
        let tasks = [
            awaiting(1, TaskKind::Harvest, Cell::new(1, 0), 1),
            awaiting(2, TaskKind::Dig, Cell::new(20, 0), 1),
        ];
        let ranked = rank_tasks(Job::Architect, Cell::new(0, 0), None, &tasks, 99);
        assert_eq!(ranked[0].task, TaskId(2));
        assert_eq!(ranked[0].score, 100);

        let ranked = rank_tasks(Job::Worker, Cell::new(0, 0), None, &tasks, 99);
        assert_eq!(ranked[0].task, TaskId(1));
    }

    #[test]
    fn test_rank_breaks_ties_by_distance() {
        let tasks = [
            awaiting(1, TaskKind::Dig, Cell::new(5, 5), 1),
            awaiting(2, TaskKind::Dig, Cell::new(1, 1), 1),
            awaiting(3, TaskKind::CleanCorpse, Cell::new(0, 1), -1),
        ];
        let ranked = rank_tasks(Job::Worker, Cell::new(0, 0), None, &tasks, 99);
        let order: Vec<u64> = ranked.iter().map(|c| c.task.0).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_held_task_filters_equal_and_lower_scores() {
        let tasks = [
            awaiting(1, TaskKind::Dig, Cell::new(1, 0), 1),
            awaiting(2, TaskKind::CleanCorpse, Cell::new(1, 0), -1),
            awaiting(3, TaskKind::Harvest, Cell::new(9, 0), 1),
        ];
        let held = Some((TaskId(7), 1));
        assert!(rank_tasks(Job::Worker, Cell::new(0, 0), held, &tasks, 99).is_empty());

        let ranked = rank_tasks(Job::Harvester, Cell::new(0, 0), held, &tasks, 99);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].task, TaskId(3));
    }
}
