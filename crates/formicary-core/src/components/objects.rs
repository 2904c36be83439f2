//! Transient world objects that tasks can target.

use formicary_logic::jobs::Job;
use formicary_logic::Cell;
use serde::{Deserialize, Serialize};

/// Remains of a dead agent, waiting to be cleaned up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Corpse {
    pub cell: Cell,
    pub job: Job,
}

/// Food lying on the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoodItem {
    pub cell: Cell,
    /// Food added to the colony pool when harvested.
    pub amount: f32,
}

/// Remaining material of an object, eroded by work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Integrity {
    pub value: f32,
}

impl Default for Integrity {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl Integrity {
    /// Erode by `amount`, returning what remains.
    pub fn wear(&mut self, amount: f32) -> f32 {
        self.value = (self.value - amount).max(0.0);
        self.value
    }
}
