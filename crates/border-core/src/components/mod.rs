//! ECS Components
//!
//! All entity components and world resources for agents, locales and the grid.

pub mod agent;
pub mod locale;
pub mod world;

pub use agent::*;
pub use locale::*;
pub use world::*;
