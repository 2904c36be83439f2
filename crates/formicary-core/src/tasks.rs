//! Task registry - the set of claimable labor tasks.
//!
//! Tasks are keyed by target: a tile or a transient world object. The
//! registry holds the task side of the agent/task relation; the agent side
//! is each agent's [`Assignment`]. Every operation that drops a worker from
//! a task clears the agent side in the same call.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use formicary_logic::config::TaskRules;
use formicary_logic::jobs::TaskKind;
use formicary_logic::Cell;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::{Assignment, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a task works on. Identity of a task is its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskTarget {
    Tile(Cell),
    Object(Entity),
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub target: TaskTarget,
    /// Cell agents path to.
    pub cell: Cell,
    pub priority: i32,
    pub capacity: usize,
    pub workers: Vec<Entity>,
    /// Player-visible tasks may be cancelled by commands.
    pub visible: bool,
}

impl Task {
    pub fn is_full(&self) -> bool {
        self.workers.len() >= self.capacity
    }

    pub fn has_worker(&self, agent: Entity) -> bool {
        self.workers.contains(&agent)
    }
}

#[derive(Debug, Clone)]
pub struct TaskRegistry {
    rules: TaskRules,
    tasks: BTreeMap<TaskId, Task>,
    by_target: HashMap<TaskTarget, TaskId>,
    next_id: u64,
}

impl TaskRegistry {
    pub fn new(rules: TaskRules) -> Self {
        Self {
            rules,
            tasks: BTreeMap::new(),
            by_target: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn rules(&self) -> &TaskRules {
        &self.rules
    }

    /// Create a task for `target`, taking priority and capacity from the
    /// kind's rule. Returns `None` if the target already has a task.
    pub fn add_task(
        &mut self,
        target: TaskTarget,
        kind: TaskKind,
        cell: Cell,
        visible: bool,
    ) -> Option<TaskId> {
        if self.by_target.contains_key(&target) {
            return None;
        }
        let rule = self.rules.rule(kind);
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            id,
            Task {
                id,
                kind,
                target,
                cell,
                priority: rule.priority,
                capacity: rule.capacity,
                workers: Vec::with_capacity(rule.capacity),
                visible,
            },
        );
        self.by_target.insert(target, id);
        Some(id)
    }

    /// Remove a task and send every assigned agent back to idle.
    ///
    /// Works from a snapshot of the worker list, so it is safe to call while
    /// a scheduling pass or an agent update is in progress.
    pub fn remove_task(&mut self, id: TaskId, world: &mut World) -> Option<Task> {
        let task = self.tasks.remove(&id)?;
        self.by_target.remove(&task.target);
        for &agent in &task.workers {
            detach_agent(world, agent, id);
        }
        Some(task)
    }

    /// Drop `agent` from the worker set of `id`. The caller owns the agent
    /// side of the relation.
    pub fn release_worker(&mut self, id: TaskId, agent: Entity) -> bool {
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        let before = task.workers.len();
        task.workers.retain(|w| *w != agent);
        task.workers.len() != before
    }

    /// Add `agent` to the worker set. Refused when the task is full, so no
    /// task is ever over-assigned.
    pub fn assign(&mut self, id: TaskId, agent: Entity) -> bool {
        match self.tasks.get_mut(&id) {
            Some(task) if !task.is_full() && !task.has_worker(agent) => {
                task.workers.push(agent);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn task_for(&self, target: TaskTarget) -> Option<TaskId> {
        self.by_target.get(&target).copied()
    }

    /// Linear lookup; the registry is small.
    pub fn find_task(&self, mut predicate: impl FnMut(&Task) -> bool) -> Option<&Task> {
        self.tasks.values().find(|t| predicate(t))
    }

    /// Tasks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Clear an agent's hold on `task`: no task, no route. A missing or
/// despawned agent is ignored.
pub fn detach_agent(world: &mut World, agent: Entity, task: TaskId) {
    if let Ok(mut assignment) = world.get::<&mut Assignment>(agent) {
        if assignment.task == Some(task) {
            assignment.clear();
        }
    }
    if let Ok(mut route) = world.get::<&mut Route>(agent) {
        route.clear();
    }
}
