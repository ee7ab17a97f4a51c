//! Configuration System
//!
//! Loads simulation parameters and locale definitions from a TOML file, with
//! defaults matching the Dutch-Belgian border setup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "border.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub media: MediaConfig,
    pub border: BorderConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<AccelerationConfig>,
    pub countries: Vec<CountryConfig>,
    pub locales: Vec<LocaleConfig>,
}

/// Grid, memory and shared behaviour parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: i32,
    pub height: i32,
    /// Maximum number of variants an agent remembers
    pub decay_limit: usize,
    /// Half-width of the band around a locale's sound mean that seeds are drawn from
    pub sound_mean_interval: f64,
    /// Chance per tick that a visiting agent heads home
    pub return_chance: f64,
    /// Chance per tick that an idle agent walks back to its home centre
    pub home_chance: f64,
    /// Chance per tick that an agent tunes in to a media broadcast
    pub media_receptiveness: f64,
    /// Derive ethnocentrism from the home locale's distance to the border
    pub scaled_ethnocentrism: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 240,
            decay_limit: 140,
            sound_mean_interval: 0.1,
            return_chance: 0.05,
            home_chance: 0.005,
            media_receptiveness: 0.0,
            scaled_ethnocentrism: false,
        }
    }
}

/// Media broadcast parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Country whose central locales broadcast to everyone; `None` disables media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_country: Option<String>,
    /// Chance that an agent outside the source country receives the source
    /// country's broadcast instead of its own
    pub foreign_share: f64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            source_country: Some("The Netherlands".to_string()),
            foreign_share: 0.2,
        }
    }
}

/// Border line geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Border height at the left and right edge of the grid
    pub heights: [i32; 2],
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self { heights: [124, 104] }
    }
}

/// Target-driven change: one country's own variants are adopted only when
/// they push the listener's mean upward, and are stored several times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationConfig {
    pub country: String,
    pub count: usize,
}

/// Per-country behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    pub domestic_travel_chance: f64,
    pub abroad_travel_chance: f64,
    pub ethnocentrism: f64,
}

impl CountryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domestic_travel_chance: 0.005,
            abroad_travel_chance: 0.001,
            ethnocentrism: 0.0,
        }
    }
}

/// A locale descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub name: String,
    pub country: String,
    pub x: i32,
    pub y: i32,
    pub radius: i32,
    pub population: u32,
    pub sound_mean: f64,
    #[serde(default)]
    pub central: bool,
}

impl LocaleConfig {
    pub fn new(
        name: &str,
        country: &str,
        (x, y): (i32, i32),
        radius: i32,
        population: u32,
        sound_mean: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            x,
            y,
            radius,
            population,
            sound_mean,
            central: false,
        }
    }

    pub fn central(mut self) -> Self {
        self.central = true;
        self
    }
}

const NL: &str = "The Netherlands";
const BE: &str = "Belgium";

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig::new("Amsterdam", NL, (45, 20), 6, 40, 1.0).central(),
        LocaleConfig::new("Rotterdam", NL, (38, 42), 5, 30, 1.0).central(),
        LocaleConfig::new("Utrecht", NL, (56, 36), 4, 20, 1.0).central(),
        LocaleConfig::new("Breda", NL, (44, 92), 3, 15, 0.0),
        LocaleConfig::new("Eindhoven", NL, (62, 96), 4, 20, 0.0),
        LocaleConfig::new("Maastricht", NL, (78, 98), 3, 12, 0.0),
        LocaleConfig::new("Antwerp", BE, (40, 136), 5, 30, 0.0).central(),
        LocaleConfig::new("Ghent", BE, (18, 150), 4, 20, 0.0),
        LocaleConfig::new("Hasselt", BE, (74, 142), 3, 12, 0.0),
        LocaleConfig::new("Brussels", BE, (44, 172), 6, 40, 0.0).central(),
        LocaleConfig::new("Leuven", BE, (58, 164), 3, 15, 0.0),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            media: MediaConfig::default(),
            border: BorderConfig::default(),
            acceleration: None,
            countries: vec![CountryConfig::new(NL), CountryConfig::new(BE)],
            locales: default_locales(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        if !Path::new(DEFAULT_CONFIG_PATH).exists() {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            return Self::default();
        }
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Returns the configuration as a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn country(&self, name: &str) -> Option<&CountryConfig> {
        self.countries.iter().find(|c| c.name == name)
    }

    /// Check every field the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.width <= 0 || sim.height <= 0 {
            return Err(ConfigError::EmptyGrid {
                width: sim.width,
                height: sim.height,
            });
        }
        if sim.decay_limit == 0 {
            return Err(ConfigError::ZeroDecayLimit);
        }
        if !sim.sound_mean_interval.is_finite() || sim.sound_mean_interval < 0.0 {
            return Err(ConfigError::BadSoundInterval(sim.sound_mean_interval));
        }
        check_probability("simulation.return_chance", sim.return_chance)?;
        check_probability("simulation.home_chance", sim.home_chance)?;
        check_probability("simulation.media_receptiveness", sim.media_receptiveness)?;
        check_probability("media.foreign_share", self.media.foreign_share)?;

        let mut seen = HashSet::new();
        for country in &self.countries {
            if !seen.insert(country.name.as_str()) {
                return Err(ConfigError::DuplicateCountry(country.name.clone()));
            }
            let field = |name: &str| format!("countries.{}.{}", country.name, name);
            check_probability(&field("domestic_travel_chance"), country.domestic_travel_chance)?;
            check_probability(&field("abroad_travel_chance"), country.abroad_travel_chance)?;
            check_probability(&field("ethnocentrism"), country.ethnocentrism)?;
        }

        if self.locales.len() < 2 {
            return Err(ConfigError::TooFewLocales(self.locales.len()));
        }
        let mut seen = HashSet::new();
        for locale in &self.locales {
            if !seen.insert(locale.name.as_str()) {
                return Err(ConfigError::DuplicateLocale(locale.name.clone()));
            }
            if self.country(&locale.country).is_none() {
                return Err(ConfigError::UnknownCountry {
                    context: format!("locale '{}'", locale.name),
                    country: locale.country.clone(),
                });
            }
            if locale.population == 0 {
                return Err(ConfigError::EmptyLocale(locale.name.clone()));
            }
            if locale.radius < 0 {
                return Err(ConfigError::NegativeRadius(locale.name.clone()));
            }
            check_probability(&format!("locales.{}.sound_mean", locale.name), locale.sound_mean)?;
        }

        if let Some(source) = &self.media.source_country {
            if self.country(source).is_none() {
                return Err(ConfigError::UnknownCountry {
                    context: "media.source_country".to_string(),
                    country: source.clone(),
                });
            }
        }
        if let Some(acceleration) = &self.acceleration {
            if self.country(&acceleration.country).is_none() {
                return Err(ConfigError::UnknownCountry {
                    context: "acceleration.country".to_string(),
                    country: acceleration.country.clone(),
                });
            }
            if acceleration.count == 0 {
                return Err(ConfigError::ZeroAcceleration);
            }
        }
        Ok(())
    }

    /// Name of the country that leads change: the media source, or the first country
    pub fn leading_country(&self) -> Option<&str> {
        self.media
            .source_country
            .as_deref()
            .or_else(|| self.countries.first().map(|c| c.name.as_str()))
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAProbability {
            field: field.to_string(),
            value,
        })
    }
}

/// Experiment presets.
///
/// Each preset fixes the parameters its theory holds constant. The parameter
/// a theory varies is set to a representative value and can be overridden in
/// the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Theory {
    /// Geographic contact: vary cross-border travel
    Contact,
    /// Target-driven change in the leading country
    Target,
    /// In-group bias towards own-country variants
    Ethnocentrism,
    /// Ethnocentrism growing with distance from the border
    ScaledEthnocentrism,
    /// Broadcast media from the leading country
    Media,
}

impl Theory {
    pub fn name(&self) -> &'static str {
        match self {
            Theory::Contact => "contact",
            Theory::Target => "target",
            Theory::Ethnocentrism => "ethnocentrism",
            Theory::ScaledEthnocentrism => "scaled-ethnocentrism",
            Theory::Media => "media",
        }
    }

    /// Apply this preset on top of `config`
    pub fn apply(&self, config: &mut Config) {
        let leading = config.leading_country().map(str::to_string);
        let is_leading = |c: &CountryConfig| leading.as_deref() == Some(c.name.as_str());

        config.simulation.scaled_ethnocentrism = false;
        config.simulation.media_receptiveness = 0.0;
        config.acceleration = None;

        match self {
            Theory::Contact => {
                for country in &mut config.countries {
                    country.domestic_travel_chance = 0.005;
                    country.abroad_travel_chance = 0.005;
                    country.ethnocentrism = 0.0;
                }
            }
            Theory::Target => {
                for country in &mut config.countries {
                    country.abroad_travel_chance = 0.001;
                    country.ethnocentrism = 0.0;
                    country.domestic_travel_chance = if is_leading(country) { 0.025 } else { 0.005 };
                }
                config.acceleration = leading.clone().map(|country| AccelerationConfig { country, count: 2 });
            }
            Theory::Ethnocentrism => {
                for country in &mut config.countries {
                    country.abroad_travel_chance = 0.001;
                    country.domestic_travel_chance = 0.005;
                    country.ethnocentrism = if is_leading(country) { 0.85 } else { 0.5 };
                }
            }
            Theory::ScaledEthnocentrism => {
                for country in &mut config.countries {
                    country.abroad_travel_chance = 0.001;
                    country.domestic_travel_chance = 0.005;
                    country.ethnocentrism = 0.0;
                }
                config.simulation.scaled_ethnocentrism = true;
            }
            Theory::Media => {
                for country in &mut config.countries {
                    country.abroad_travel_chance = 0.001;
                    country.domestic_travel_chance = 0.005;
                    country.ethnocentrism = 0.0;
                }
                config.simulation.media_receptiveness = 0.5;
            }
        }
    }
}
