//! Metabolism system - health decay and feeding from the colony food pool

use formicary_logic::config::AgentConfig;
use formicary_logic::economy::FoodStore;
use hecs::World;

use crate::components::{Activity, Agent, Assignment, Health, Route};

/// Decay health by activity, then let hungry agents eat.
///
/// Idle agents (and the queen, who never works) burn `idle_consumption`
/// per second; walking or working agents burn `work_consumption`. An agent
/// below its job's feed threshold takes food up to its feed target; with
/// an empty pool it takes nothing and keeps decaying. Agents eat in
/// entity id order, so a scarce pool feeds the oldest agents first.
pub fn metabolism_system(
    world: &mut World,
    food: &mut FoodStore,
    config: &AgentConfig,
    delta_seconds: f32,
) {
    let mut agents: Vec<_> = world
        .query_mut::<(&Agent, &mut Health, &Route, &Assignment)>()
        .into_iter()
        .collect();
    agents.sort_by_key(|(entity, _)| entity.id());

    for (_, (agent, health, route, assignment)) in agents {
        let rate = match Activity::of(route, assignment) {
            _ if agent.is_queen() => config.idle_consumption,
            Activity::Idle => config.idle_consumption,
            Activity::Walking | Activity::Working => config.work_consumption,
        };
        health.value -= rate * delta_seconds;

        let profile = agent.job.profile();
        let taken = food.feed(health.value, &profile);
        health.value = (health.value + taken).min(1.0);
    }
}
