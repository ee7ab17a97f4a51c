//! Report Types
//!
//! Serialization structs for per-tick aggregate reports.
//!
//! Reports are derived from agent state by the simulation core and consumed
//! by loggers, analysis scripts and plotting tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of agents in each travel state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub home: u32,
    pub travelling: u32,
    pub visiting: u32,
}

impl StateCounts {
    pub fn total(&self) -> u32 {
        self.home + self.travelling + self.visiting
    }
}

/// Aggregates for the residents of one locale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleReport {
    pub country: String,
    pub residents: u32,
    /// Mean of each resident's most recent sound value
    pub mean_sound: f64,
}

/// Aggregates for the residents of one country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryReport {
    pub residents: u32,
    pub mean_sound: f64,
}

/// Full report for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub counts: StateCounts,
    /// Mean of every agent's most recent sound value
    pub mean_sound: f64,
    /// Mean number of entries in the agents' sound repositories
    pub mean_repository_size: f64,
    /// Keyed by locale name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub locales: BTreeMap<String, LocaleReport>,
    /// Keyed by country label
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub countries: BTreeMap<String, CountryReport>,
}

impl TickReport {
    /// Difference between the highest and lowest country mean.
    ///
    /// Returns `None` when fewer than two countries are reported.
    pub fn country_spread(&self) -> Option<f64> {
        if self.countries.len() < 2 {
            return None;
        }
        let means = self.countries.values().map(|c| c.mean_sound);
        let max = means.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = means.fold(f64::INFINITY, f64::min);
        Some(max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_counts_total() {
        let counts = StateCounts {
            home: 7,
            travelling: 2,
            visiting: 1,
        };
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_country_spread() {
        let mut report = TickReport::default();
        assert!(report.country_spread().is_none());

        report.countries.insert(
            "The Netherlands".to_string(),
            CountryReport { residents: 10, mean_sound: 0.8 },
        );
        assert!(report.country_spread().is_none());

        report.countries.insert(
            "Belgium".to_string(),
            CountryReport { residents: 10, mean_sound: 0.3 },
        );
        let spread = report.country_spread().unwrap();
        assert!((spread - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_maps_are_omitted() {
        let report = TickReport {
            tick: 3,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("locales"));
        assert!(!json.contains("countries"));

        let parsed: TickReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tick, 3);
    }
}
