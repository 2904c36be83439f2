//! Shared food pool and feeding semantics.
//!
//! The colony has a single food scalar. Feeding pulls from it and harvest
//! completion adds to it; nothing else touches it.

use serde::{Deserialize, Serialize};

use crate::jobs::JobProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodStore {
    amount: f32,
}

impl FoodStore {
    pub fn new(amount: f32) -> Self {
        Self {
            amount: amount.max(0.0),
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount <= 0.0
    }

    pub fn deposit(&mut self, amount: f32) {
        if amount > 0.0 {
            self.amount += amount;
        }
    }

    /// Take up to `amount`, returning what was actually taken.
    pub fn withdraw(&mut self, amount: f32) -> f32 {
        let taken = amount.clamp(0.0, self.amount);
        self.amount -= taken;
        taken
    }

    /// Take exactly `amount` or nothing.
    pub fn try_spend(&mut self, amount: f32) -> bool {
        if amount < 0.0 || self.amount < amount {
            return false;
        }
        self.amount -= amount;
        true
    }

    /// Feed an agent with `health` under `profile`.
    ///
    /// Below the feed threshold the agent takes food up to its target health;
    /// an empty pool yields nothing. Returns the amount taken, which the
    /// caller adds to the agent's health.
    pub fn feed(&mut self, health: f32, profile: &JobProfile) -> f32 {
        if health >= profile.feed_threshold {
            return 0.0;
        }
        let wanted = (profile.feed_target - health).max(0.0);
        self.withdraw(wanted)
    }
}
