//! Formicary Core - Ant Colony Simulation Engine
//!
//! An ECS-based simulation of an ant colony: agents walk a tile grid,
//! claim labor tasks (digging, harvesting, corpse cleanup), share a single
//! food pool, breed and starve.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: agents (workers and the queen), food items, corpses
//! - **Components**: pure data attached to entities (Agent, Health, Position, Route, ...)
//! - **Systems**: free functions that query and update components, run in
//!   a fixed order each tick (spawning, scheduler, metabolism, movement,
//!   work, death)
//!
//! Non-entity state (grid, task registry, food, clock, events) lives in
//! [`state::SimulationState`], owned by the [`engine::ColonyEngine`].
//!
//! # Example
//!
//! ```rust,no_run
//! use formicary_core::prelude::*;
//! use formicary_logic::config::ColonyConfig;
//!
//! let mut engine = ColonyEngine::new(ColonyConfig::default()).unwrap();
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod generation;
pub mod state;
pub mod systems;
pub mod tasks;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentView, ColonyEngine, ColonyStats, CommandError, TaskView};
    pub use crate::events::ColonyEvent;
    pub use crate::tasks::{TaskId, TaskTarget};
}
