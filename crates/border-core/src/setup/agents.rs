//! Agent Spawning
//!
//! One agent per resident of every locale, placed inside its home locale with
//! a single seed variant near the locale's sound mean.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::components::agent::{
    Agent, AgentId, Home, SoundRepository, TravelChances, Traveller, Variant, Voice,
};
use crate::components::locale::{Locale, LocaleId, LocaleRegistry};
use crate::components::world::GridPosition;
use crate::config::Config;
use crate::systems::grid::OccupancyGrid;
use crate::systems::sound::MediaSources;

/// Per-locale parameters shared by all residents
#[derive(Debug, Clone, Copy)]
pub struct ResidentProfile {
    pub chances: TravelChances,
    pub ethnocentrism: f64,
    pub media_receptiveness: f64,
    pub sound_mean_interval: f64,
}

impl ResidentProfile {
    pub fn for_locale(config: &Config, registry: &LocaleRegistry, locale: &Locale, ethnocentrism: f64) -> Self {
        let country = config.country(registry.country_name(locale.country));
        Self {
            chances: TravelChances {
                domestic: country.map(|c| c.domestic_travel_chance).unwrap_or(0.0),
                abroad: country.map(|c| c.abroad_travel_chance).unwrap_or(0.0),
                return_home: config.simulation.return_chance,
                homing: config.simulation.home_chance,
            },
            ethnocentrism,
            media_receptiveness: config.simulation.media_receptiveness,
            sound_mean_interval: config.simulation.sound_mean_interval,
        }
    }
}

/// Seed variant drawn uniformly within `interval` of the locale's sound mean, clamped to [0, 1]
pub fn seed_variant(locale: &Locale, interval: f64, rng: &mut SmallRng) -> Variant {
    let value = if interval > 0.0 {
        rng.gen_range(locale.sound_mean - interval..=locale.sound_mean + interval)
    } else {
        locale.sound_mean
    };
    Variant::new(value, locale.country)
}

/// Spawn all residents of a single locale
pub fn spawn_locale_agents(
    world: &mut World,
    locale: &Locale,
    profile: &ResidentProfile,
    next_id: &mut u32,
    rng: &mut SmallRng,
) -> Vec<Entity> {
    let cells: Vec<_> = {
        let grid = world.resource::<OccupancyGrid>();
        locale
            .cells()
            .iter()
            .copied()
            .filter(|c| grid.contains(*c))
            .collect()
    };
    let mut spawned = Vec::with_capacity(locale.population as usize);

    for _ in 0..locale.population {
        let cell = cells.choose(rng).copied().unwrap_or(locale.center);
        let seed = seed_variant(locale, profile.sound_mean_interval, rng);

        let entity = world
            .spawn((
                Agent,
                AgentId(*next_id),
                Home {
                    locale: locale.id,
                    country: locale.country,
                },
                GridPosition(cell),
                Traveller::new(profile.chances),
                SoundRepository::seeded(seed),
                Voice::new(profile.ethnocentrism, profile.media_receptiveness),
            ))
            .id();
        *next_id += 1;

        world.resource_mut::<OccupancyGrid>().place(entity, cell);
        if locale.central {
            world.resource_mut::<MediaSources>().add(locale.country, entity);
        }
        spawned.push(entity);
    }

    spawned
}

/// Spawn the residents of every locale.
///
/// Needs the [`OccupancyGrid`] and [`MediaSources`] resources in the world.
pub fn spawn_all_agents(
    world: &mut World,
    config: &Config,
    registry: &LocaleRegistry,
    ethnocentrism: &BTreeMap<LocaleId, f64>,
    rng: &mut SmallRng,
) -> SpawnSummary {
    let mut next_id = 0;
    let mut summary = SpawnSummary::default();

    for locale in registry.iter() {
        let value = ethnocentrism.get(&locale.id).copied().unwrap_or(0.0);
        let profile = ResidentProfile::for_locale(config, registry, locale, value);
        let spawned = spawn_locale_agents(world, locale, &profile, &mut next_id, rng);

        summary.total_agents += spawned.len() as u32;
        *summary
            .by_country
            .entry(registry.country_name(locale.country).to_string())
            .or_insert(0) += spawned.len() as u32;
        if locale.central {
            summary.media_sources += spawned.len() as u32;
        }
    }

    summary
}

/// Summary of spawned agents
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total_agents: u32,
    pub media_sources: u32,
    pub by_country: BTreeMap<String, u32>,
}

impl std::fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total agents: {}", self.total_agents)?;
        writeln!(f, "Media sources: {}", self.media_sources)?;
        writeln!(f, "By country:")?;
        for (country, count) in &self.by_country {
            writeln!(f, "  {}: {}", country, count)?;
        }
        Ok(())
    }
}
