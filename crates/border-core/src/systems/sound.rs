//! Sound Exchange
//!
//! Speaking, listening, media broadcasts and repository decay.
//!
//! Every exchange runs a heard variant through [`adopt`], which applies the
//! listener's ethnocentric filter and the leading-country acceleration rule
//! before anything is stored.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::components::agent::{Home, SoundRepository, Variant, Voice};
use crate::components::locale::CountryId;
use crate::components::world::GridPosition;
use crate::systems::grid::{Adjacency, GridService, OccupancyGrid};

/// Leading country whose own variants spread faster among its residents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceleration {
    pub country: CountryId,
    /// Copies stored per accepted variant
    pub count: usize,
}

/// Broadcast settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaRules {
    pub source_country: CountryId,
    /// Chance that a resident of another country tunes in to the source country
    pub foreign_share: f64,
}

/// Resource: Fixed rules of the sound exchange
#[derive(Resource, Debug, Clone)]
pub struct SoundRules {
    pub decay_limit: usize,
    pub acceleration: Option<Acceleration>,
    pub media: Option<MediaRules>,
}

impl Default for SoundRules {
    fn default() -> Self {
        Self {
            decay_limit: 140,
            acceleration: None,
            media: None,
        }
    }
}

/// Resource: Agents living in a central locale, by country
#[derive(Resource, Debug, Clone, Default)]
pub struct MediaSources {
    by_country: BTreeMap<CountryId, Vec<Entity>>,
}

impl MediaSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, country: CountryId, speaker: Entity) {
        self.by_country.entry(country).or_default().push(speaker);
    }

    pub fn speakers(&self, country: CountryId) -> &[Entity] {
        self.by_country
            .get(&country)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// A uniformly chosen broadcaster of `country`
    pub fn sample(&self, country: CountryId, rng: &mut SmallRng) -> Option<Entity> {
        self.speakers(country).choose(rng).copied()
    }
}

/// Outcome of offering a variant to a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adoption {
    Rejected,
    /// Stored this many times
    Adopted(usize),
}

impl Adoption {
    pub fn is_adopted(&self) -> bool {
        matches!(self, Adoption::Adopted(_))
    }
}

/// Adoption filter for a single heard variant.
///
/// A foreign-origin variant is rejected with probability `ethnocentrism`.
/// When the listener lives in the leading country and the variant comes from
/// there too, it is kept only if it is not below the repository mean, and is
/// then stored `count` times.
pub fn adopt(
    repository: &mut SoundRepository,
    ethnocentrism: f64,
    home_country: CountryId,
    variant: Variant,
    acceleration: Option<Acceleration>,
    rng: &mut SmallRng,
) -> Adoption {
    if variant.origin != home_country && rng.gen::<f64>() < ethnocentrism {
        return Adoption::Rejected;
    }

    if let Some(acc) = acceleration {
        if home_country == acc.country && variant.origin == acc.country {
            if variant.value < repository.mean() {
                return Adoption::Rejected;
            }
            for _ in 0..acc.count {
                repository.push(variant);
            }
            return Adoption::Adopted(acc.count);
        }
    }

    repository.push(variant);
    Adoption::Adopted(1)
}

/// Offer `variant` to `listener`, applying its filter
pub fn offer(world: &mut World, listener: Entity, variant: Variant, rng: &mut SmallRng) -> Adoption {
    let acceleration = world.resource::<SoundRules>().acceleration;
    let Some(home) = world.get::<Home>(listener).copied() else {
        return Adoption::Rejected;
    };
    let ethnocentrism = world
        .get::<Voice>(listener)
        .map(|v| v.ethnocentrism)
        .unwrap_or(0.0);
    let Some(mut repository) = world.get_mut::<SoundRepository>(listener) else {
        return Adoption::Rejected;
    };
    adopt(
        &mut *repository,
        ethnocentrism,
        home.country,
        variant,
        acceleration,
        rng,
    )
}

/// Speak to one random agent in the contact neighbourhood.
///
/// Does nothing if the speaker already spoke (or was spoken to) this tick or
/// nobody else is around. Returns the listener and what it did with the variant.
pub fn speak(world: &mut World, speaker: Entity, rng: &mut SmallRng) -> Option<(Entity, Adoption)> {
    if world.get::<Voice>(speaker)?.has_spoken {
        return None;
    }
    let position = world.get::<GridPosition>(speaker)?.0;

    let others: Vec<Entity> = {
        let grid = world.resource::<OccupancyGrid>();
        let cells = grid.neighborhood(position, Adjacency::Moore, true);
        grid.occupants(&cells)
            .into_iter()
            .filter(|e| *e != speaker)
            .collect()
    };
    let listener = *others.choose(rng)?;
    let variant = world.get::<SoundRepository>(speaker)?.sample(rng)?;

    let adoption = offer(world, listener, variant, rng);
    for entity in [speaker, listener] {
        if let Some(mut voice) = world.get_mut::<Voice>(entity) {
            voice.has_spoken = true;
        }
    }

    tracing::trace!(
        ?speaker,
        ?listener,
        value = variant.value,
        adopted = adoption.is_adopted(),
        "Sound exchange"
    );
    Some((listener, adoption))
}

/// Maybe tune in to a broadcast from a central locale
pub fn receive_media(world: &mut World, listener: Entity, rng: &mut SmallRng) -> Option<Adoption> {
    let rules = world.resource::<SoundRules>().media?;
    let receptiveness = world.get::<Voice>(listener)?.media_receptiveness;
    if receptiveness <= 0.0 || rng.gen::<f64>() >= receptiveness {
        return None;
    }

    let home_country = world.get::<Home>(listener)?.country;
    let source = if home_country == rules.source_country || rng.gen::<f64>() < rules.foreign_share {
        rules.source_country
    } else {
        home_country
    };

    let Some(broadcaster) = world.resource::<MediaSources>().sample(source, rng) else {
        tracing::debug!(country = source.0, "No central agents to broadcast from");
        return None;
    };
    let variant = world.get::<SoundRepository>(broadcaster)?.sample(rng)?;
    Some(offer(world, listener, variant, rng))
}

/// System: Clear the per-tick spoken flag
pub fn reset_spoken(mut voices: Query<&mut Voice>) {
    for mut voice in voices.iter_mut() {
        if voice.has_spoken {
            voice.has_spoken = false;
        }
    }
}

/// System: Trim every repository to the decay limit
pub fn decay_repositories(rules: Res<SoundRules>, mut repositories: Query<&mut SoundRepository>) {
    for mut repository in repositories.iter_mut() {
        if repository.len() > rules.decay_limit {
            repository.decay(rules.decay_limit);
        }
    }
}
