//! Agent Components
//!
//! Components for individual agents: identity, mobility and linguistic state.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::locale::{CountryId, LocaleId};
use super::world::Cell;

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Unique identifier for an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Where an agent lives. Fixed for the agent's lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Home {
    pub locale: LocaleId,
    pub country: CountryId,
}

/// Travel state of an agent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TravelState {
    /// At home (or wandering nearby), not on a trip
    #[default]
    Idle,
    /// On the way to `target`; `path` holds the remaining cells, front first
    Travelling {
        target: LocaleId,
        path: VecDeque<Cell>,
    },
    /// Arrived at `target` and staying there
    Visiting { target: LocaleId },
}

impl TravelState {
    pub fn target(&self) -> Option<LocaleId> {
        match self {
            TravelState::Idle => None,
            TravelState::Travelling { target, .. } | TravelState::Visiting { target } => {
                Some(*target)
            }
        }
    }
}

/// Per-agent travel probabilities, drawn against once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelChances {
    /// Start a trip to a same-country locale
    pub domestic: f64,
    /// Start a trip to a foreign locale
    pub abroad: f64,
    /// Leave a visited locale for home
    pub return_home: f64,
    /// Head home while idle but away from the home centre
    pub homing: f64,
}

/// Component: Mobility state of an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Traveller {
    pub state: TravelState,
    pub chances: TravelChances,
}

impl Traveller {
    pub fn new(chances: TravelChances) -> Self {
        Self {
            state: TravelState::Idle,
            chances,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TravelState::Idle)
    }

    pub fn is_travelling(&self) -> bool {
        matches!(self.state, TravelState::Travelling { .. })
    }

    pub fn is_visiting(&self) -> bool {
        matches!(self.state, TravelState::Visiting { .. })
    }
}

/// A heard sound variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Phonetic value in [0, 1]
    pub value: f64,
    /// Country in which the value was first produced
    pub origin: CountryId,
}

impl Variant {
    pub fn new(value: f64, origin: CountryId) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            origin,
        }
    }
}

/// Component: Bounded, ordered memory of heard variants
///
/// Newest entries are appended at the back; decay drops from the front.
/// Never empty: it is created with a seed variant and decay keeps at least
/// one entry.
#[derive(Component, Debug, Clone)]
pub struct SoundRepository {
    entries: VecDeque<Variant>,
}

impl SoundRepository {
    pub fn seeded(seed: Variant) -> Self {
        Self {
            entries: VecDeque::from([seed]),
        }
    }

    pub fn push(&mut self, variant: Variant) {
        self.entries.push_back(variant);
    }

    /// The most recently stored variant
    pub fn latest(&self) -> Option<&Variant> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.entries.iter()
    }

    /// Mean value of all stored variants
    pub fn mean(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|v| v.value).sum::<f64>() / self.entries.len() as f64
    }

    /// A uniformly chosen stored variant
    pub fn sample(&self, rng: &mut SmallRng) -> Option<Variant> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.entries.len());
        self.entries.get(index).copied()
    }

    /// Keep only the newest `limit` entries (at least one)
    pub fn decay(&mut self, limit: usize) {
        let keep = limit.max(1);
        while self.entries.len() > keep {
            self.entries.pop_front();
        }
    }

    pub fn holds_origin(&self, origin: CountryId) -> bool {
        self.entries.iter().any(|v| v.origin == origin)
    }
}

/// Component: Speaking and listening disposition
#[derive(Component, Debug, Clone, Default)]
pub struct Voice {
    /// Probability of rejecting a foreign-origin variant
    pub ethnocentrism: f64,
    /// Probability of tuning in to a media broadcast each tick
    pub media_receptiveness: f64,
    /// Set once the agent spoke or was spoken to this tick
    pub has_spoken: bool,
}

impl Voice {
    pub fn new(ethnocentrism: f64, media_receptiveness: f64) -> Self {
        Self {
            ethnocentrism,
            media_receptiveness,
            has_spoken: false,
        }
    }
}
