//! Simulation Context
//!
//! Owns the ECS world and the per-tick schedule.

use bevy_ecs::prelude::*;

use border_events::TickReport;

use crate::components::agent::Agent;
use crate::components::world::WorldState;
use crate::config::Config;
use crate::error::SetupError;
use crate::output::stats::tick_report;
use crate::setup::build_world;
use crate::systems::sound::{decay_repositories, reset_spoken};
use crate::systems::tick::{advance_tick, run_agent_turns};

/// A configured, seeded simulation run
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(config: &Config, seed: u64) -> Result<Self, SetupError> {
        let world = build_world(config, seed)?;

        // Reset spoken flags, take every agent's turn, decay, then count the tick
        let mut schedule = Schedule::default();
        schedule.add_systems((reset_spoken, run_agent_turns, decay_repositories, advance_tick).chain());

        Ok(Self { world, schedule })
    }

    /// Run a single tick
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
        tracing::debug!(tick = self.current_tick(), "Tick complete");
    }

    /// Run `ticks` ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Number of completed ticks
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<WorldState>().current_tick
    }

    pub fn agent_count(&mut self) -> usize {
        self.world
            .query_filtered::<Entity, With<Agent>>()
            .iter(&self.world)
            .count()
    }

    /// Aggregate report of the current state
    pub fn report(&mut self) -> TickReport {
        tick_report(&mut self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
