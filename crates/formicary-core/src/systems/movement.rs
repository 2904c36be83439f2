//! Movement system - walks agents along their routes one cell at a time

use formicary_logic::Grid;
use hecs::{Entity, World};

use crate::components::{Agent, Position, Route};

/// Advance every walking agent. Returns agents whose route turned out to be
/// blocked; the caller releases their tasks.
///
/// Progress toward the front cell accrues at `speed` cells per second and
/// the continuous position is interpolated between the two cells. At most
/// one route cell is consumed per tick, so an agent never skips a cell.
pub fn movement_system(
    world: &mut World,
    grid: &Grid,
    speed: f32,
    delta_seconds: f32,
) -> Vec<Entity> {
    let mut blocked = Vec::new();

    let mut walkers: Vec<_> = world
        .query_mut::<(&Agent, &mut Position, &mut Route)>()
        .into_iter()
        .collect();
    walkers.sort_by_key(|(entity, _)| entity.id());

    for (entity, (_, pos, route)) in walkers {
        let Some(&next) = route.cells.front() else {
            continue;
        };
        if !pos.cell.is_adjacent(next) || !grid.is_walkable(next) {
            route.clear();
            blocked.push(entity);
            continue;
        }

        route.progress += speed * delta_seconds;
        if route.progress >= 1.0 {
            pos.step_to(next);
            route.cells.pop_front();
            route.progress = 0.0;
        } else {
            let t = route.progress;
            pos.x = pos.cell.x as f32 + (next.x - pos.cell.x) as f32 * t;
            pos.y = pos.cell.y as f32 + (next.y - pos.cell.y) as f32 * t;
        }
    }

    blocked
}
