//! Colony clock: elapsed time, spawn cadences and day count.

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;

/// Accumulating timer that fires once per elapsed interval.
/// An interval of zero disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    interval: f32,
    accumulator: f32,
}

impl IntervalTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            accumulator: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0.0
    }

    /// Advance by `dt` and return how many intervals elapsed.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.is_enabled() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let mut fired = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// What happened during one clock advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTick {
    pub food_spawns: u32,
    pub broods: u32,
    pub days_passed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyClock {
    elapsed: f64,
    ticks: u64,
    day: u32,
    day_timer: IntervalTimer,
    food_timer: IntervalTimer,
    brood_timer: IntervalTimer,
}

impl ColonyClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            elapsed: 0.0,
            ticks: 0,
            day: 0,
            day_timer: IntervalTimer::new(config.day_length),
            food_timer: IntervalTimer::new(config.food_spawn_interval),
            brood_timer: IntervalTimer::new(config.brood_interval),
        }
    }

    pub fn advance(&mut self, dt: f32) -> ClockTick {
        let dt = dt.max(0.0);
        self.ticks += 1;
        self.elapsed += f64::from(dt);
        let days_passed = self.day_timer.advance(dt);
        self.day += days_passed;
        ClockTick {
            food_spawns: self.food_timer.advance(dt),
            broods: self.brood_timer.advance(dt),
            days_passed,
        }
    }

    /// Seconds of simulated time since the colony was founded.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_per_interval() {
        let mut timer = IntervalTimer::new(0.5);
        assert_eq!(timer.advance(0.25), 0);
        assert_eq!(timer.advance(0.25), 1);
        assert_eq!(timer.advance(2.0), 4);
    }

    #[test]
    fn test_zero_interval_is_disabled() {
        let mut timer = IntervalTimer::new(0.0);
        assert!(!timer.is_enabled());
        assert_eq!(timer.advance(100.0), 0);
    }

    #[test]
    fn test_clock_counts_days() {
        let config = ClockConfig {
            day_length: 10.0,
            food_spawn_interval: 3.0,
            brood_interval: 0.0,
        };
        let mut clock = ColonyClock::new(&config);
        let mut food = 0;
        for _ in 0..25 {
            let tick = clock.advance(1.0);
            food += tick.food_spawns;
            assert_eq!(tick.broods, 0);
        }
        assert_eq!(clock.day(), 2);
        assert_eq!(clock.ticks(), 25);
        assert_eq!(food, 8);
        assert!((clock.elapsed() - 25.0).abs() < 1e-9);
    }
}
