//! Agent components: Agent, Health, Position, Route, Assignment.

use std::collections::VecDeque;

use formicary_logic::jobs::Job;
use formicary_logic::Cell;
use serde::{Deserialize, Serialize};

use crate::tasks::TaskId;

/// Marker + job tag for a colony member. The queen is `Job::Queen`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent {
    pub job: Job,
    /// Seconds left before the scheduler may hand this agent work.
    pub grace: f32,
    /// Seconds left before the next task search.
    pub search_cooldown: f32,
}

impl Agent {
    pub fn new(job: Job, grace: f32) -> Self {
        Self {
            job,
            grace: grace.max(0.0),
            search_cooldown: 0.0,
        }
    }

    /// Busy agents are never considered by the scheduler.
    pub fn is_busy(&self) -> bool {
        !self.job.profile().schedulable || self.grace > 0.0
    }

    pub fn is_queen(&self) -> bool {
        self.job == Job::Queen
    }
}

/// Health - 1.0 is full, death at or below 0.0
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub value: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl Health {
    pub fn is_dead(&self) -> bool {
        self.value <= 0.0
    }
}

/// Horizontal facing, taken from the last horizontal step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Where an agent is: the discrete cell it occupies plus a continuous
/// position for smooth movement between cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub cell: Cell,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
}

impl Position {
    pub fn at(cell: Cell) -> Self {
        Self {
            cell,
            x: cell.x as f32,
            y: cell.y as f32,
            facing: Facing::default(),
        }
    }

    /// Snap onto `cell`, turning to face the direction of travel.
    pub fn step_to(&mut self, cell: Cell) {
        if cell.x > self.cell.x {
            self.facing = Facing::Right;
        } else if cell.x < self.cell.x {
            self.facing = Facing::Left;
        }
        self.cell = cell;
        self.x = cell.x as f32;
        self.y = cell.y as f32;
    }
}

/// Remaining cells to walk, consumed front to back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    pub cells: VecDeque<Cell>,
    /// Fraction of the way to the front cell, 0.0..1.0.
    pub progress: f32,
}

impl Route {
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            progress: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.progress = 0.0;
    }
}

/// The task an agent currently holds and the score it holds it at.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Assignment {
    pub task: Option<TaskId>,
    pub priority: i32,
}

impl Assignment {
    pub fn clear(&mut self) {
        self.task = None;
        self.priority = 0;
    }
}

/// Coarse activity, derived from route and assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    Walking,
    Working,
}

impl Activity {
    pub fn of(route: &Route, assignment: &Assignment) -> Self {
        if !route.is_empty() {
            Activity::Walking
        } else if assignment.task.is_some() {
            Activity::Working
        } else {
            Activity::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queen_is_always_busy() {
        let queen = Agent::new(Job::Queen, 0.0);
        let worker = Agent::new(Job::Worker, 0.0);
        assert!(queen.is_busy());
        assert!(!worker.is_busy());
        assert!(Agent::new(Job::Harvester, 2.0).is_busy());
    }

    #[test]
    fn test_step_updates_facing() {
        let mut pos = Position::at(Cell::new(2, 2));
        pos.step_to(Cell::new(1, 2));
        assert_eq!(pos.facing, Facing::Left);
        // vertical steps keep the last facing
        pos.step_to(Cell::new(1, 3));
        assert_eq!(pos.facing, Facing::Left);
        pos.step_to(Cell::new(2, 3));
        assert_eq!(pos.facing, Facing::Right);
        assert_eq!(pos.x, 2.0);
        assert_eq!(pos.y, 3.0);
    }

    #[test]
    fn test_activity_derivation() {
        let mut route = Route::default();
        let mut assignment = Assignment::default();
        assert_eq!(Activity::of(&route, &assignment), Activity::Idle);
        assignment.task = Some(TaskId(1));
        assert_eq!(Activity::of(&route, &assignment), Activity::Working);
        route = Route::new([Cell::new(0, 1)]);
        assert_eq!(Activity::of(&route, &assignment), Activity::Walking);
    }
}
