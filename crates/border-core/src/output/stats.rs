//! Statistics Output
//!
//! Pure aggregate queries over agent state. Each call is one scan of the
//! agents; nothing is cached between ticks.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

use border_events::{CountryReport, LocaleReport, StateCounts, TickReport};

use crate::components::agent::{Agent, Home, SoundRepository, TravelState, Traveller};
use crate::components::locale::{CountryId, LocaleId, LocaleRegistry};
use crate::components::world::WorldState;

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Count agents at home, travelling and visiting
pub fn state_counts(world: &mut World) -> StateCounts {
    let mut counts = StateCounts::default();
    let mut query = world.query_filtered::<&Traveller, With<Agent>>();
    for traveller in query.iter(world) {
        match traveller.state {
            TravelState::Idle => counts.home += 1,
            TravelState::Travelling { .. } => counts.travelling += 1,
            TravelState::Visiting { .. } => counts.visiting += 1,
        }
    }
    counts
}

/// Mean of every agent's most recent sound value
pub fn mean_latest_sound(world: &mut World) -> f64 {
    let mut mean = Mean::default();
    let mut query = world.query_filtered::<&SoundRepository, With<Agent>>();
    for repository in query.iter(world) {
        if let Some(latest) = repository.latest() {
            mean.add(latest.value);
        }
    }
    mean.value()
}

/// Mean number of stored variants per agent
pub fn mean_repository_size(world: &mut World) -> f64 {
    let mut mean = Mean::default();
    let mut query = world.query_filtered::<&SoundRepository, With<Agent>>();
    for repository in query.iter(world) {
        mean.add(repository.len() as f64);
    }
    mean.value()
}

fn latest_by_home(world: &mut World) -> Vec<(Home, f64)> {
    let mut query = world.query_filtered::<(&Home, &SoundRepository), With<Agent>>();
    query
        .iter(world)
        .filter_map(|(home, repository)| repository.latest().map(|v| (*home, v.value)))
        .collect()
}

/// Mean most recent sound of the residents of each locale, keyed by locale name
pub fn locale_means(world: &mut World) -> BTreeMap<String, LocaleReport> {
    let mut by_locale: BTreeMap<LocaleId, Mean> = BTreeMap::new();
    for (home, value) in latest_by_home(world) {
        by_locale.entry(home.locale).or_default().add(value);
    }

    let registry = world.resource::<LocaleRegistry>();
    registry
        .iter()
        .map(|locale| {
            let mean = by_locale.get(&locale.id).copied().unwrap_or_default();
            let report = LocaleReport {
                country: registry.country_name(locale.country).to_string(),
                residents: mean.count,
                mean_sound: mean.value(),
            };
            (locale.name.clone(), report)
        })
        .collect()
}

/// Mean most recent sound of the residents of each country, keyed by country label
pub fn country_means(world: &mut World) -> BTreeMap<String, CountryReport> {
    let mut by_country: BTreeMap<CountryId, Mean> = BTreeMap::new();
    for (home, value) in latest_by_home(world) {
        by_country.entry(home.country).or_default().add(value);
    }

    let registry = world.resource::<LocaleRegistry>();
    by_country
        .into_iter()
        .map(|(country, mean)| {
            let report = CountryReport {
                residents: mean.count,
                mean_sound: mean.value(),
            };
            (registry.country_name(country).to_string(), report)
        })
        .collect()
}

/// Full report for the current tick
pub fn tick_report(world: &mut World) -> TickReport {
    let tick = world
        .get_resource::<WorldState>()
        .map(|s| s.current_tick)
        .unwrap_or(0);
    TickReport {
        tick,
        counts: state_counts(world),
        mean_sound: mean_latest_sound(world),
        mean_repository_size: mean_repository_size(world),
        locales: locale_means(world),
        countries: country_means(world),
    }
}
