//! Founding colony: the queen and the first workers

use formicary_logic::config::ColonyConfig;
use formicary_logic::jobs::Job;
use formicary_logic::Cell;
use hecs::{Entity, World};
use rand::seq::SliceRandom;

use super::terrain::royal_room_cells;
use crate::state::SimulationState;
use crate::systems::spawn_agent;

/// Spawn the queen in the royal room and the initial workers on random
/// surface cells. Returns the queen, if there was room for her.
pub fn populate_colony(
    world: &mut World,
    state: &mut SimulationState,
    config: &ColonyConfig,
) -> Option<Entity> {
    let room = royal_room_cells(&config.grid);
    // bottom-centre of the room
    let throne = room
        .iter()
        .copied()
        .filter(|c| state.grid.is_walkable(*c))
        .max_by_key(|c| (c.y, -(c.x - config.grid.entrance_x).abs()));
    let queen = throne.map(|cell| spawn_agent(world, state, Job::Queen, cell, 0.0));

    let surface = state.grid.walkable_in_row(config.grid.entrance_row);
    let founders = [
        (Job::Worker, config.agents.initial_workers),
        (Job::Architect, config.agents.initial_architects),
        (Job::Harvester, config.agents.initial_harvesters),
    ];
    for (job, count) in founders {
        for _ in 0..count {
            let Some(&cell) = surface.choose(&mut state.rng) else {
                break;
            };
            spawn_agent(world, state, job, cell, config.agents.spawn_grace);
        }
    }

    log::info!(
        "colony founded: {} agents, queen at {:?}",
        state.population.total(),
        throne.unwrap_or(Cell::new(config.grid.entrance_x, config.grid.entrance_row))
    );
    queen
}
