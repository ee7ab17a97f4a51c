//! Error Types
//!
//! Configuration and world-setup failures. Both are fatal: they are reported
//! before the first tick runs.

use thiserror::Error;

use crate::systems::destination::TripKind;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} must be a probability in [0, 1], got {value}")]
    NotAProbability { field: String, value: f64 },

    #[error("decay limit must be at least 1")]
    ZeroDecayLimit,

    #[error("grid must have positive dimensions, got {width}x{height}")]
    EmptyGrid { width: i32, height: i32 },

    #[error("sound mean interval must be a finite non-negative number, got {0}")]
    BadSoundInterval(f64),

    #[error("at least two locales are required, got {0}")]
    TooFewLocales(usize),

    #[error("country '{0}' is defined more than once")]
    DuplicateCountry(String),

    #[error("locale '{0}' is defined more than once")]
    DuplicateLocale(String),

    #[error("{context} refers to unknown country '{country}'")]
    UnknownCountry { context: String, country: String },

    #[error("locale '{0}' must have a population of at least 1")]
    EmptyLocale(String),

    #[error("locale '{0}' has a negative radius")]
    NegativeRadius(String),

    #[error("acceleration count must be at least 1")]
    ZeroAcceleration,
}

/// World construction errors
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("locale '{locale}' centre ({x}, {y}) lies outside the {width}x{height} grid")]
    LocaleOffGrid {
        locale: String,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("residents of '{locale}' may travel {kind} but no {kind} destination is reachable")]
    NoDestination { locale: String, kind: TripKind },
}
