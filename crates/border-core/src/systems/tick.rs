//! Agent Turns
//!
//! One full turn per agent per tick, in a freshly shuffled order: travel,
//! movement, speech, media. An agent finishes its turn before the next starts.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::components::agent::{Agent, AgentId, Home, Traveller};
use crate::components::locale::LocaleRegistry;
use crate::components::world::{GridPosition, WorldState};
use crate::systems::destination::DestinationSelector;
use crate::systems::grid::{relocate, Adjacency, GridService, OccupancyGrid};
use crate::systems::sound::{receive_media, speak};
use crate::systems::travel::{advance, Movement};
use crate::SimRng;

/// Exclusive system: run every agent's turn
pub fn run_agent_turns(world: &mut World) {
    let mut agents: Vec<(AgentId, Entity)> = world
        .query_filtered::<(&AgentId, Entity), With<Agent>>()
        .iter(world)
        .map(|(id, entity)| (*id, entity))
        .collect();
    agents.sort_by_key(|(id, _)| *id);
    let mut order: Vec<Entity> = agents.into_iter().map(|(_, entity)| entity).collect();

    world.resource_scope(|world, mut sim_rng: Mut<SimRng>| {
        let rng = &mut sim_rng.0;
        order.shuffle(rng);
        for entity in order {
            take_turn(world, entity, rng);
        }
    });
}

fn take_turn(world: &mut World, entity: Entity, rng: &mut SmallRng) {
    let Some(home) = world.get::<Home>(entity).copied() else {
        return;
    };
    let Some(position) = world.get::<GridPosition>(entity).map(|p| p.0) else {
        return;
    };

    // Travel
    let Some(mut traveller) = world.get_mut::<Traveller>(entity).map(|mut t| std::mem::take(&mut *t)) else {
        return;
    };
    let movement = advance(
        &mut traveller,
        home.locale,
        position,
        world.resource::<LocaleRegistry>(),
        world.resource::<DestinationSelector>(),
        rng,
    );
    if let Some(mut slot) = world.get_mut::<Traveller>(entity) {
        *slot = traveller;
    }

    // Movement
    let to = match movement {
        Movement::StepTo(cell) => cell,
        Movement::Wander => {
            let options = world
                .resource::<OccupancyGrid>()
                .neighborhood(position, Adjacency::VonNeumann, true);
            options.choose(rng).copied().unwrap_or(position)
        }
    };
    if to != position {
        relocate(world, entity, to);
    }

    // Speech, then media
    speak(world, entity, rng);
    receive_media(world, entity, rng);
}

/// System: Advance the tick counter
pub fn advance_tick(mut world_state: ResMut<WorldState>) {
    world_state.advance_tick();
}
