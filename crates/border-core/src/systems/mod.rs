//! ECS Systems
//!
//! Simulation rules for destinations, paths, travel, the occupancy grid and
//! sound exchange, plus the per-tick agent turn driver.

pub mod destination;
pub mod grid;
pub mod path;
pub mod sound;
pub mod tick;
pub mod travel;

// Re-export commonly used systems
pub use destination::{influence, DestinationSelector, TravelTable, TripKind};
pub use grid::{relocate, Adjacency, GridService, OccupancyGrid};
pub use path::{line_cells, plan_path, plan_path_to};
pub use sound::{
    adopt, decay_repositories, offer, receive_media, reset_spoken, speak, Acceleration, Adoption,
    MediaRules, MediaSources, SoundRules,
};
pub use tick::{advance_tick, run_agent_turns};
pub use travel::{advance, Movement};
