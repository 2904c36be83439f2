//! Jobs, task kinds, and the lookup tables keyed by them.
//!
//! The queen is not a subtype of worker: she is the `Job::Queen` tag, and
//! her differences (never scheduled, higher feeding target) come out of
//! [`Job::profile`].

use serde::{Deserialize, Serialize};

/// Labor an agent can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    Dig,
    Harvest,
    CleanCorpse,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Dig, TaskKind::Harvest, TaskKind::CleanCorpse];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Dig => "dig",
            TaskKind::Harvest => "harvest",
            TaskKind::CleanCorpse => "clean-corpse",
        }
    }
}

/// Agent job / specialization tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Job {
    Worker,
    Architect,
    Harvester,
    Queen,
}

/// Per-job behavior parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobProfile {
    /// Feeding starts when health drops below this.
    pub feed_threshold: f32,
    /// Feeding tops health up to this.
    pub feed_target: f32,
    /// Whether the scheduler may hand this job labor tasks.
    pub schedulable: bool,
}

impl Job {
    pub const ALL: [Job; 4] = [Job::Worker, Job::Architect, Job::Harvester, Job::Queen];

    pub fn profile(self) -> JobProfile {
        match self {
            Job::Worker | Job::Architect | Job::Harvester => JobProfile {
                feed_threshold: 0.5,
                feed_target: 0.9,
                schedulable: true,
            },
            Job::Queen => JobProfile {
                feed_threshold: 0.8,
                feed_target: 1.0,
                schedulable: false,
            },
        }
    }

    /// Specialization table: which task kind earns this job the bonus.
    pub fn specializes_in(self, kind: TaskKind) -> bool {
        matches!(
            (self, kind),
            (Job::Architect, TaskKind::Dig) | (Job::Harvester, TaskKind::Harvest)
        )
    }

    /// Priority score of a task for this job.
    pub fn priority_score(self, kind: TaskKind, base_priority: i32, bonus: i32) -> i32 {
        if self.specializes_in(kind) {
            base_priority.saturating_add(bonus)
        } else {
            base_priority
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Job::Worker => "worker",
            Job::Architect => "architect",
            Job::Harvester => "harvester",
            Job::Queen => "queen",
        }
    }
}

/// Running head-count per job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub workers: u32,
    pub architects: u32,
    pub harvesters: u32,
    pub queens: u32,
}

impl JobCounts {
    fn slot(&mut self, job: Job) -> &mut u32 {
        match job {
            Job::Worker => &mut self.workers,
            Job::Architect => &mut self.architects,
            Job::Harvester => &mut self.harvesters,
            Job::Queen => &mut self.queens,
        }
    }

    pub fn add(&mut self, job: Job) {
        *self.slot(job) += 1;
    }

    pub fn remove(&mut self, job: Job) {
        let slot = self.slot(job);
        *slot = slot.saturating_sub(1);
    }

    pub fn get(&self, job: Job) -> u32 {
        match job {
            Job::Worker => self.workers,
            Job::Architect => self.architects,
            Job::Harvester => self.harvesters,
            Job::Queen => self.queens,
        }
    }

    pub fn total(&self) -> u32 {
        self.workers + self.architects + self.harvesters + self.queens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialization_bonus() {
        assert_eq!(Job::Architect.priority_score(TaskKind::Dig, 1, 99), 100);
        assert_eq!(Job::Architect.priority_score(TaskKind::Harvest, 1, 99), 1);
        assert_eq!(Job::Harvester.priority_score(TaskKind::Harvest, 1, 99), 100);
        assert_eq!(Job::Worker.priority_score(TaskKind::CleanCorpse, -1, 99), -1);
    }

    #[test]
    fn test_queen_profile() {
        let queen = Job::Queen.profile();
        let worker = Job::Worker.profile();
        assert!(!queen.schedulable);
        assert!(queen.feed_target > worker.feed_target);
        assert!(Job::ALL
            .iter()
            .all(|job| job.profile().feed_threshold < job.profile().feed_target));
    }

    #[test]
    fn test_job_counts() {
        let mut counts = JobCounts::default();
        counts.add(Job::Worker);
        counts.add(Job::Worker);
        counts.add(Job::Queen);
        counts.remove(Job::Worker);
        counts.remove(Job::Harvester);
        assert_eq!(counts.get(Job::Worker), 1);
        assert_eq!(counts.get(Job::Harvester), 0);
        assert_eq!(counts.total(), 2);
    }
}
