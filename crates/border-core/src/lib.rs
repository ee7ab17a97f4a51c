//! Border Sound Diffusion Simulation Library
//!
//! Public API for the simulation engine.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;

pub use config::{Config, Theory};
pub use error::{ConfigError, SetupError};
pub use simulation::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
