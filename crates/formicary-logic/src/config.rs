//! Colony configuration.
//!
//! Every tunable the simulation reads lives in [`ColonyConfig`]. All
//! sections default to the values of the original game, so a partial JSON
//! document only needs the fields it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::GridBounds;
use crate::jobs::TaskKind;
use crate::pathfinding::DEFAULT_ITERATION_CAP;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse colony config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid bounds are empty: x {min_x}..{max_x}, y {min_y}..{max_y}")]
    EmptyBounds {
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    },
    #[error("entrance ({x}, {y}) lies outside the grid")]
    EntranceOutOfBounds { x: i32, y: i32 },
    #[error("royal room at depth {depth} does not fit below the entrance")]
    RoyalRoomOutOfBounds { depth: i32 },
    #[error("{field} must be within [0, 1], got {value}")]
    Probability { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("capacity of {kind} tasks must be at least 1")]
    ZeroCapacity { kind: &'static str },
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    pub seed: u64,
    pub grid: GridConfig,
    pub agents: AgentConfig,
    pub tasks: TaskRules,
    pub economy: EconomyConfig,
    pub scheduler: SchedulerConfig,
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub entrance_row: i32,
    pub entrance_x: i32,
    pub rock_chance: f32,
    pub resource_chance: f32,
    /// Rows below the entrance where the royal room is carved.
    pub royal_room_depth: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_x: -40,
            max_x: 40,
            min_y: -30,
            max_y: 100,
            entrance_row: 0,
            entrance_x: 0,
            rock_chance: 0.05,
            resource_chance: 0.02,
            royal_room_depth: 8,
        }
    }
}

impl GridConfig {
    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(
            self.min_x,
            self.max_x,
            self.min_y,
            self.max_y,
            self.entrance_row,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub initial_workers: u32,
    pub initial_architects: u32,
    pub initial_harvesters: u32,
    /// Cells per second.
    pub speed: f32,
    /// Seconds after spawning during which an agent is not schedulable.
    pub spawn_grace: f32,
    /// Health lost per second while idle.
    pub idle_consumption: f32,
    /// Health lost per second while walking or working.
    pub work_consumption: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_workers: 30,
            initial_architects: 0,
            initial_harvesters: 0,
            speed: 4.0,
            spawn_grace: 3.0,
            idle_consumption: 0.005,
            work_consumption: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskRule {
    pub priority: i32,
    pub capacity: usize,
    /// Seconds of single-worker effort to consume a fresh target.
    pub energy: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRules {
    pub dig: TaskRule,
    pub harvest: TaskRule,
    pub clean_corpse: TaskRule,
    pub specialization_bonus: i32,
}

impl Default for TaskRules {
    fn default() -> Self {
        Self {
            dig: TaskRule {
                priority: 1,
                capacity: 2,
                energy: 10.0,
            },
            harvest: TaskRule {
                priority: 1,
                capacity: 1,
                energy: 4.0,
            },
            clean_corpse: TaskRule {
                priority: -1,
                capacity: 1,
                energy: 6.0,
            },
            specialization_bonus: 99,
        }
    }
}

impl TaskRules {
    pub fn rule(&self, kind: TaskKind) -> &TaskRule {
        match kind {
            TaskKind::Dig => &self.dig,
            TaskKind::Harvest => &self.harvest,
            TaskKind::CleanCorpse => &self.clean_corpse,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub initial_food: f32,
    pub food_item_yield: f32,
    pub resource_tile_yield: f32,
    pub brood_cost: f32,
    pub brood_min_queen_health: f32,
    pub max_food_items: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_food: 10.0,
            food_item_yield: 2.0,
            resource_tile_yield: 5.0,
            brood_cost: 1.0,
            brood_min_queen_health: 0.5,
            max_food_items: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds an agent waits between task searches.
    pub search_cooldown: f32,
    /// Ranked tasks an agent tries to path to per search.
    pub max_path_attempts: usize,
    pub path_iteration_cap: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            search_cooldown: 0.5,
            max_path_attempts: 8,
            path_iteration_cap: DEFAULT_ITERATION_CAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub day_length: f32,
    pub food_spawn_interval: f32,
    pub brood_interval: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            day_length: 120.0,
            food_spawn_interval: 8.0,
            brood_interval: 20.0,
        }
    }
}

impl ColonyConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ColonyConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.min_x >= grid.max_x || grid.min_y >= grid.max_y {
            return Err(ConfigError::EmptyBounds {
                min_x: grid.min_x,
                max_x: grid.max_x,
                min_y: grid.min_y,
                max_y: grid.max_y,
            });
        }
        let bounds = grid.bounds();
        let entrance = crate::Cell::new(grid.entrance_x, grid.entrance_row);
        if !bounds.contains(entrance) {
            return Err(ConfigError::EntranceOutOfBounds {
                x: entrance.x,
                y: entrance.y,
            });
        }
        // the room is two rows tall
        let room_floor = grid
            .entrance_row
            .saturating_add(grid.royal_room_depth)
            .saturating_add(1);
        if grid.royal_room_depth < 2 || room_floor >= grid.max_y {
            return Err(ConfigError::RoyalRoomOutOfBounds {
                depth: grid.royal_room_depth,
            });
        }
        probability("grid.rock_chance", grid.rock_chance)?;
        probability("grid.resource_chance", grid.resource_chance)?;
        probability(
            "economy.brood_min_queen_health",
            self.economy.brood_min_queen_health,
        )?;

        positive("agents.speed", self.agents.speed)?;
        non_negative("agents.spawn_grace", self.agents.spawn_grace)?;
        non_negative("agents.idle_consumption", self.agents.idle_consumption)?;
        non_negative("agents.work_consumption", self.agents.work_consumption)?;

        for kind in TaskKind::ALL {
            let rule = self.tasks.rule(kind);
            if rule.capacity == 0 {
                return Err(ConfigError::ZeroCapacity { kind: kind.name() });
            }
            positive("tasks.energy", rule.energy)?;
        }

        non_negative("economy.initial_food", self.economy.initial_food)?;
        non_negative("economy.food_item_yield", self.economy.food_item_yield)?;
        non_negative("economy.resource_tile_yield", self.economy.resource_tile_yield)?;
        non_negative("economy.brood_cost", self.economy.brood_cost)?;

        non_negative("scheduler.search_cooldown", self.scheduler.search_cooldown)?;
        if self.scheduler.max_path_attempts == 0 {
            return Err(ConfigError::ZeroCount {
                field: "scheduler.max_path_attempts",
            });
        }
        if self.scheduler.path_iteration_cap == 0 {
            return Err(ConfigError::ZeroCount {
                field: "scheduler.path_iteration_cap",
            });
        }
        non_negative("clock.day_length", self.clock.day_length)?;
        non_negative("clock.food_spawn_interval", self.clock.food_spawn_interval)?;
        non_negative("clock.brood_interval", self.clock.brood_interval)?;
        Ok(())
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ColonyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.bounds().width(), 80);
        assert_eq!(config.grid.bounds().height(), 130);
        assert_eq!(config.tasks.dig.capacity, 2);
        assert_eq!(config.tasks.specialization_bonus, 99);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ColonyConfig::from_json(r#"{ "seed": 7, "agents": { "speed": 2.5 } }"#)
            .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.agents.speed, 2.5);
        assert_eq!(config.agents.initial_workers, 30);
        assert_eq!(config.grid.max_y, 100);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            ColonyConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_empty_bounds() {
        let mut config = ColonyConfig::default();
        config.grid.max_x = config.grid.min_x;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_entrance_outside_grid() {
        let mut config = ColonyConfig::default();
        config.grid.entrance_x = 500;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EntranceOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = ColonyConfig::default();
        config.tasks.harvest.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCapacity { kind: "harvest" })
        ));
    }

    #[test]
    fn test_rejects_zero_path_attempts() {
        let mut config = ColonyConfig::default();
        config.scheduler.max_path_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCount {
                field: "scheduler.max_path_attempts"
            })
        ));

        let mut config = ColonyConfig::default();
        config.scheduler.path_iteration_cap = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCount {
                field: "scheduler.path_iteration_cap"
            })
        ));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = ColonyConfig::default();
        config.grid.rock_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { .. })
        ));
    }
}
