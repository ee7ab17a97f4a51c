//! Locale Components
//!
//! Circular catchment areas with a resident population and home country.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::world::{ceil_distance, euclidean_distance, Cell};

/// Index of a locale in the [`LocaleRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct LocaleId(pub u32);

/// Index of a country in the [`LocaleRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CountryId(pub u32);

/// Every cell whose rounded-up distance to `center` is at most `radius`.
///
/// A negative radius yields no cells.
pub fn circle_cells(center: Cell, radius: i32) -> Vec<Cell> {
    if radius < 0 {
        return Vec::new();
    }
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let cell = center.offset(dx, dy);
            if ceil_distance(center, cell) <= i64::from(radius) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// A locale: fixed geography and demography, immutable once the world is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locale {
    /// Assigned by the registry on insertion
    pub id: LocaleId,
    pub name: String,
    pub country: CountryId,
    /// Representative region used as a media source
    pub central: bool,
    pub center: Cell,
    pub radius: i32,
    pub population: u32,
    /// Mean of the seed variants given to residents
    pub sound_mean: f64,
    cells: Vec<Cell>,
}

impl Locale {
    pub fn new(
        name: impl Into<String>,
        country: CountryId,
        center: Cell,
        radius: i32,
        population: u32,
        sound_mean: f64,
    ) -> Self {
        Self {
            id: LocaleId::default(),
            name: name.into(),
            country,
            central: false,
            center,
            radius,
            population,
            sound_mean,
            cells: circle_cells(center, radius),
        }
    }

    pub fn with_central(mut self, central: bool) -> Self {
        self.central = central;
        self
    }

    /// The locale's grid footprint
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        ceil_distance(self.center, cell) <= i64::from(self.radius)
    }

    /// Distance from the centre at which a traveller counts as arrived
    pub fn arrival_threshold(&self) -> f64 {
        f64::from(self.radius) / 2.0
    }
}

/// Resource: All locales and country labels of the world
#[derive(Resource, Debug, Clone, Default)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    countries: Vec<String>,
    country_ids: BTreeMap<String, CountryId>,
}

impl LocaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for a country label, registering it if new
    pub fn intern_country(&mut self, name: &str) -> CountryId {
        if let Some(id) = self.country_id(name) {
            return id;
        }
        let id = CountryId(self.countries.len() as u32);
        self.countries.push(name.to_string());
        self.country_ids.insert(name.to_string(), id);
        id
    }

    pub fn country_id(&self, name: &str) -> Option<CountryId> {
        self.country_ids.get(name).copied()
    }

    pub fn country_name(&self, id: CountryId) -> &str {
        self.countries
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Add a locale, assigning it the next id
    pub fn add(&mut self, mut locale: Locale) -> LocaleId {
        let id = LocaleId(self.locales.len() as u32);
        locale.id = id;
        self.locales.push(locale);
        id
    }

    pub fn get(&self, id: LocaleId) -> Option<&Locale> {
        self.locales.get(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Locales of one country ordered from nearest to furthest from `point`
    pub fn by_distance_from(&self, point: Cell, country: CountryId) -> Vec<(&Locale, f64)> {
        let mut found: Vec<(&Locale, f64)> = self
            .locales
            .iter()
            .filter(|l| l.country == country)
            .map(|l| (l, euclidean_distance(point, l.center)))
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        found
    }
}
