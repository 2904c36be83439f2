//! Colony events - what happened during a tick, for the presentation layer.

use formicary_logic::jobs::{Job, TaskKind};
use formicary_logic::{Cell, TerrainKind};
use hecs::Entity;

use crate::tasks::TaskId;

#[derive(Debug, Clone, PartialEq)]
pub enum ColonyEvent {
    AgentSpawned {
        agent: Entity,
        job: Job,
        cell: Cell,
    },
    AgentDied {
        agent: Entity,
        job: Job,
        cell: Cell,
    },
    TaskCreated {
        task: TaskId,
        kind: TaskKind,
        cell: Cell,
        visible: bool,
    },
    TaskAssigned {
        task: TaskId,
        agent: Entity,
        /// Task the agent gave up for this one.
        preempted: Option<TaskId>,
    },
    /// The task's target was fully consumed. Always followed by `TaskRemoved`.
    TaskCompleted {
        task: TaskId,
        kind: TaskKind,
        cell: Cell,
    },
    TaskRemoved {
        task: TaskId,
        kind: TaskKind,
        cell: Cell,
    },
    TerrainChanged {
        cell: Cell,
        from: TerrainKind,
        to: TerrainKind,
    },
    FoodSpawned {
        item: Entity,
        cell: Cell,
    },
    DayPassed {
        day: u32,
    },
}
