//! World Setup
//!
//! Builds the locale registry, the destination selector and the fixed
//! exchange rules from configuration, rejecting degenerate setups.

use std::collections::BTreeMap;

use crate::components::locale::{Locale, LocaleId, LocaleRegistry};
use crate::components::world::{BorderLine, Cell};
use crate::config::Config;
use crate::error::{ConfigError, SetupError};
use crate::systems::destination::{DestinationSelector, TripKind};
use crate::systems::sound::{Acceleration, MediaRules, SoundRules};

/// Register every country and locale, checking that each centre is on the grid
pub fn create_locale_registry(config: &Config) -> Result<LocaleRegistry, SetupError> {
    let width = config.simulation.width;
    let height = config.simulation.height;
    let mut registry = LocaleRegistry::new();

    for country in &config.countries {
        registry.intern_country(&country.name);
    }

    for locale in &config.locales {
        if !(0..width).contains(&locale.x) || !(0..height).contains(&locale.y) {
            return Err(SetupError::LocaleOffGrid {
                locale: locale.name.clone(),
                x: locale.x,
                y: locale.y,
                width,
                height,
            });
        }
        let country = registry.country_id(&locale.country).ok_or_else(|| {
            ConfigError::UnknownCountry {
                context: format!("locale '{}'", locale.name),
                country: locale.country.clone(),
            }
        })?;
        registry.add(
            Locale::new(
                locale.name.as_str(),
                country,
                Cell::new(locale.x, locale.y),
                locale.radius,
                locale.population,
                locale.sound_mean,
            )
            .with_central(locale.central),
        );
    }

    Ok(registry)
}

/// Build the selector and make sure every trip residents may take has a destination
pub fn create_destination_selector(
    config: &Config,
    registry: &LocaleRegistry,
) -> Result<DestinationSelector, SetupError> {
    let selector = DestinationSelector::new(registry);

    for locale in registry.iter() {
        let name = registry.country_name(locale.country);
        let Some(country) = config.country(name) else {
            continue;
        };
        let required = [
            (TripKind::Domestic, country.domestic_travel_chance),
            (TripKind::Abroad, country.abroad_travel_chance),
        ];
        for (kind, chance) in required {
            if chance > 0.0 && !selector.can_sample(locale.id, kind) {
                return Err(SetupError::NoDestination {
                    locale: locale.name.clone(),
                    kind,
                });
            }
        }
    }

    tracing::info!(entries = selector.table().len(), "Computed travel table");
    Ok(selector)
}

/// Ethnocentrism of the residents of each locale.
///
/// Scaled mode: distance of the locale centre to the border over the largest
/// such distance, so border towns are the most open. Otherwise the value
/// configured for the locale's country.
pub fn ethnocentrism_by_locale(config: &Config, registry: &LocaleRegistry) -> BTreeMap<LocaleId, f64> {
    if config.simulation.scaled_ethnocentrism {
        let border = BorderLine::across(config.simulation.width, config.border.heights);
        let distances: Vec<(LocaleId, f64)> = registry
            .iter()
            .map(|l| (l.id, border.distance_to(l.center)))
            .collect();
        let max = distances.iter().map(|(_, d)| *d).fold(0.0, f64::max);
        return distances
            .into_iter()
            .map(|(id, d)| (id, if max > 0.0 { d / max } else { 0.0 }))
            .collect();
    }

    registry
        .iter()
        .map(|l| {
            let value = config
                .country(registry.country_name(l.country))
                .map(|c| c.ethnocentrism)
                .unwrap_or(0.0);
            (l.id, value)
        })
        .collect()
}

/// Decay, acceleration and media rules with country names resolved
pub fn create_sound_rules(config: &Config, registry: &LocaleRegistry) -> Result<SoundRules, SetupError> {
    let resolve = |context: &str, name: &str| {
        registry
            .country_id(name)
            .ok_or_else(|| ConfigError::UnknownCountry {
                context: context.to_string(),
                country: name.to_string(),
            })
    };

    let acceleration = match &config.acceleration {
        Some(acc) => Some(Acceleration {
            country: resolve("acceleration.country", &acc.country)?,
            count: acc.count,
        }),
        None => None,
    };
    let media = match &config.media.source_country {
        Some(source) => Some(MediaRules {
            source_country: resolve("media.source_country", source)?,
            foreign_share: config.media.foreign_share,
        }),
        None => None,
    };

    Ok(SoundRules {
        decay_limit: config.simulation.decay_limit,
        acceleration,
        media,
    })
}
