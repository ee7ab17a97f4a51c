//! Destination Selection
//!
//! Gravity model of travel between locales. The table is computed once at
//! world construction and is read-only afterwards.
//!
//! For destination `D` and every other locale `S`:
//!
//! ```text
//! influence(S -> D) = pop(S) * pop(D) / d(S, D)^2 * pop(S) / (pop(S) + pop(D))
//! ```
//!
//! with `d` the centre distance rounded to the nearest integer. Influences are
//! normalised per destination *per source country*, so foreign candidates
//! never dilute domestic probabilities and the other way round.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::components::locale::{CountryId, Locale, LocaleId, LocaleRegistry};
use crate::components::world::rounded_distance_squared;

/// Whether a trip stays inside the home country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripKind {
    Domestic,
    Abroad,
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripKind::Domestic => write!(f, "domestic"),
            TripKind::Abroad => write!(f, "abroad"),
        }
    }
}

/// Unnormalised pull of `destination` on residents of `source`.
///
/// `None` when the two centres coincide after rounding.
pub fn influence(source: &Locale, destination: &Locale) -> Option<f64> {
    let distance_squared = rounded_distance_squared(source.center, destination.center);
    if distance_squared == 0 {
        return None;
    }
    let pop_s = f64::from(source.population);
    let pop_d = f64::from(destination.population);
    if pop_s + pop_d <= 0.0 {
        return None;
    }
    Some((pop_s * pop_d / distance_squared as f64) * (pop_s / (pop_s + pop_d)))
}

/// Travel probabilities keyed by (destination, source)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelTable {
    probabilities: BTreeMap<(LocaleId, LocaleId), f64>,
}

impl TravelTable {
    pub fn compute(registry: &LocaleRegistry) -> Self {
        let mut probabilities = BTreeMap::new();

        for destination in registry.iter() {
            let mut by_country: BTreeMap<CountryId, Vec<(LocaleId, f64)>> = BTreeMap::new();
            for source in registry.iter().filter(|s| s.id != destination.id) {
                if let Some(weight) = influence(source, destination) {
                    by_country
                        .entry(source.country)
                        .or_default()
                        .push((source.id, weight));
                }
            }

            for group in by_country.values() {
                let total: f64 = group.iter().map(|(_, w)| w).sum();
                if total <= 0.0 {
                    continue;
                }
                for (source, weight) in group {
                    probabilities.insert((destination.id, *source), weight / total);
                }
            }
        }

        Self { probabilities }
    }

    pub fn get(&self, destination: LocaleId, source: LocaleId) -> Option<f64> {
        self.probabilities.get(&(destination, source)).copied()
    }

    /// Acceptance probability, zero for pairs without an entry
    pub fn probability(&self, destination: LocaleId, source: LocaleId) -> f64 {
        self.get(destination, source).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocaleId, LocaleId, f64)> + '_ {
        self.probabilities.iter().map(|(&(d, s), &p)| (d, s, p))
    }
}

/// Candidate destinations of one home locale with a non-zero probability
#[derive(Debug, Clone, Default)]
struct Pools {
    domestic: Vec<LocaleId>,
    abroad: Vec<LocaleId>,
}

/// Resource: Travel table plus per-locale candidate pools for sampling
#[derive(Resource, Debug, Clone, Default)]
pub struct DestinationSelector {
    table: TravelTable,
    pools: BTreeMap<LocaleId, Pools>,
}

impl DestinationSelector {
    pub fn new(registry: &LocaleRegistry) -> Self {
        let table = TravelTable::compute(registry);
        let mut pools = BTreeMap::new();

        for home in registry.iter() {
            let mut pool = Pools::default();
            for candidate in registry.iter().filter(|c| c.id != home.id) {
                if table.probability(candidate.id, home.id) <= 0.0 {
                    continue;
                }
                if candidate.country == home.country {
                    pool.domestic.push(candidate.id);
                } else {
                    pool.abroad.push(candidate.id);
                }
            }
            pools.insert(home.id, pool);
        }

        Self { table, pools }
    }

    pub fn table(&self) -> &TravelTable {
        &self.table
    }

    /// Whether `home` has at least one reachable destination of this kind
    pub fn can_sample(&self, home: LocaleId, kind: TripKind) -> bool {
        !self.candidates(home, kind).is_empty()
    }

    fn candidates(&self, home: LocaleId, kind: TripKind) -> &[LocaleId] {
        match (self.pools.get(&home), kind) {
            (Some(pool), TripKind::Domestic) => pool.domestic.as_slice(),
            (Some(pool), TripKind::Abroad) => pool.abroad.as_slice(),
            (None, _) => &[],
        }
    }

    /// Accept/reject sampling of a destination for a resident of `home`.
    ///
    /// Picks a uniformly random candidate and accepts it with its table
    /// probability, repeating until one is accepted. Candidates all have a
    /// positive probability, so this terminates; `None` only when there are no
    /// candidates at all.
    pub fn sample(&self, home: LocaleId, kind: TripKind, rng: &mut SmallRng) -> Option<LocaleId> {
        let candidates = self.candidates(home, kind);
        if candidates.is_empty() {
            return None;
        }
        loop {
            let candidate = *candidates.choose(rng)?;
            if rng.gen::<f64>() < self.table.probability(candidate, home) {
                return Some(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::world::Cell;
    use rand::SeedableRng;

    fn border_registry() -> LocaleRegistry {
        let mut registry = LocaleRegistry::new();
        let nl = registry.intern_country("The Netherlands");
        let be = registry.intern_country("Belgium");
        registry.add(Locale::new("Amsterdam", nl, Cell::new(45, 20), 6, 40, 1.0));
        registry.add(Locale::new("Rotterdam", nl, Cell::new(38, 42), 5, 30, 1.0));
        registry.add(Locale::new("Breda", nl, Cell::new(44, 92), 3, 15, 0.0));
        registry.add(Locale::new("Antwerp", be, Cell::new(40, 136), 5, 30, 0.0));
        registry.add(Locale::new("Ghent", be, Cell::new(18, 150), 4, 20, 0.0));
        registry
    }

    #[test]
    fn test_influence_formula() {
        let x = CountryId(0);
        let a = Locale::new("A", x, Cell::new(0, 0), 2, 10, 0.0);
        let b = Locale::new("B", x, Cell::new(10, 0), 2, 30, 0.0);
        // 10 * 30 / 100 * 10 / 40
        let expected = 3.0 * 0.25;
        assert!((influence(&a, &b).unwrap() - expected).abs() < 1e-12);

        let same_spot = Locale::new("C", x, Cell::new(0, 0), 1, 5, 0.0);
        assert!(influence(&a, &same_spot).is_none());
    }

    #[test]
    fn test_groups_sum_to_one() {
        let registry = border_registry();
        let table = TravelTable::compute(&registry);

        for destination in registry.iter() {
            let mut sums: BTreeMap<CountryId, f64> = BTreeMap::new();
            for (d, s, p) in table.iter() {
                if d == destination.id {
                    let country = registry.get(s).unwrap().country;
                    *sums.entry(country).or_default() += p;
                }
            }
            assert_eq!(sums.len(), 2);
            for sum in sums.values() {
                assert!((sum - 1.0).abs() < 1e-9, "group sum was {}", sum);
            }
        }
    }

    #[test]
    fn test_unpopulated_country_group_is_skipped() {
        let mut registry = LocaleRegistry::new();
        let x = registry.intern_country("X");
        let y = registry.intern_country("Y");
        let a = registry.add(Locale::new("A", x, Cell::new(0, 0), 2, 10, 0.0));
        let d = registry.add(Locale::new("D", x, Cell::new(0, 10), 2, 20, 0.0));
        registry.add(Locale::new("B", y, Cell::new(10, 0), 2, 0, 1.0));
        registry.add(Locale::new("C", y, Cell::new(10, 10), 2, 0, 1.0));

        let table = TravelTable::compute(&registry);

        for destination in [a, d] {
            let entries: Vec<(LocaleId, f64)> = table
                .iter()
                .filter(|(dest, _, _)| *dest == destination)
                .map(|(_, s, p)| (s, p))
                .collect();
            assert!(entries.iter().all(|(s, _)| registry.get(*s).unwrap().country == x));
            let sum: f64 = entries.iter().map(|(_, p)| p).sum();
            assert!((sum - 1.0).abs() < 1e-9, "group sum was {}", sum);
        }
        assert!(table.iter().all(|(_, _, p)| p.is_finite() && (0.0..=1.0).contains(&p)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_nearer_sources_weigh_more() {
        let registry = border_registry();
        let table = TravelTable::compute(&registry);
        let amsterdam = registry.by_name("Amsterdam").unwrap().id;
        let rotterdam = registry.by_name("Rotterdam").unwrap().id;
        let breda = registry.by_name("Breda").unwrap().id;

        assert!(table.probability(breda, rotterdam) > table.probability(breda, amsterdam));
        assert!(table.get(amsterdam, amsterdam).is_none());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let registry = border_registry();
        assert_eq!(TravelTable::compute(&registry), TravelTable::compute(&registry));
    }

    #[test]
    fn test_single_source_group_is_certain() {
        let mut registry = LocaleRegistry::new();
        let x = registry.intern_country("X");
        let y = registry.intern_country("Y");
        let a = registry.add(Locale::new("A", x, Cell::new(0, 0), 2, 10, 0.0));
        let b = registry.add(Locale::new("B", y, Cell::new(10, 0), 2, 10, 1.0));

        let selector = DestinationSelector::new(&registry);
        assert_eq!(selector.table().probability(b, a), 1.0);
        assert!(selector.can_sample(a, TripKind::Abroad));
        assert!(!selector.can_sample(a, TripKind::Domestic));

        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(selector.sample(a, TripKind::Abroad, &mut rng), Some(b));
        assert_eq!(selector.sample(a, TripKind::Domestic, &mut rng), None);
    }

    #[test]
    fn test_sampling_respects_kind() {
        let registry = border_registry();
        let selector = DestinationSelector::new(&registry);
        let amsterdam = registry.by_name("Amsterdam").unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let domestic = selector.sample(amsterdam.id, TripKind::Domestic, &mut rng).unwrap();
            let abroad = selector.sample(amsterdam.id, TripKind::Abroad, &mut rng).unwrap();
            assert_ne!(domestic, amsterdam.id);
            assert_eq!(registry.get(domestic).unwrap().country, amsterdam.country);
            assert_ne!(registry.get(abroad).unwrap().country, amsterdam.country);
        }
    }
}
