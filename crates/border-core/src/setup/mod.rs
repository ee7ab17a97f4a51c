//! World Setup
//!
//! World initialization from configuration and agent spawning.

pub mod agents;
pub mod world;

pub use agents::*;
pub use world::*;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::world::WorldState;
use crate::config::Config;
use crate::error::SetupError;
use crate::systems::grid::OccupancyGrid;
use crate::systems::sound::MediaSources;
use crate::SimRng;

/// Build a ready-to-run ECS world: validated config, locales, travel table,
/// exchange rules, agents and the seeded random number generator
pub fn build_world(config: &Config, seed: u64) -> Result<World, SetupError> {
    config.validate()?;

    let registry = create_locale_registry(config)?;
    tracing::info!(
        locales = registry.len(),
        countries = registry.country_count(),
        "Created locales"
    );
    let selector = create_destination_selector(config, &registry)?;
    let rules = create_sound_rules(config, &registry)?;
    let ethnocentrism = ethnocentrism_by_locale(config, &registry);

    let mut world = World::new();
    world.insert_resource(WorldState::new());
    world.insert_resource(OccupancyGrid::new(config.simulation.width, config.simulation.height));
    world.insert_resource(MediaSources::new());

    let mut rng = SmallRng::seed_from_u64(seed);
    let summary = spawn_all_agents(&mut world, config, &registry, &ethnocentrism, &mut rng);
    tracing::info!(
        agents = summary.total_agents,
        media_sources = summary.media_sources,
        "Spawned agents"
    );
    tracing::debug!("Spawn summary\n{}", summary);

    world.insert_resource(registry);
    world.insert_resource(selector);
    world.insert_resource(rules);
    world.insert_resource(SimRng(rng));
    Ok(world)
}
