//! Occupancy Grid
//!
//! Bounded multi-occupancy grid: who stands where, and who is nearby.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::world::{Cell, GridPosition};

/// Neighbourhood shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// 4-connected: used for wandering
    VonNeumann,
    /// 8-connected: used for contact between agents
    Moore,
}

const VON_NEUMANN: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const MOORE: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What the movement and contact rules need from a spatial index
pub trait GridService {
    /// In-bounds cells around `center`, optionally including `center` itself
    fn neighborhood(&self, center: Cell, adjacency: Adjacency, include_self: bool) -> Vec<Cell>;

    /// Agents standing on any of `cells`, in cell order
    fn occupants(&self, cells: &[Cell]) -> Vec<Entity>;

    /// Move `agent` to `to`, which must be in bounds
    fn move_agent(&mut self, agent: Entity, to: Cell);
}

/// Resource: Non-wrapping grid of agent positions
#[derive(Resource, Debug, Clone, Default)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: HashMap<Cell, Vec<Entity>>,
    positions: HashMap<Entity, Cell>,
}

impl OccupancyGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Put a new agent on the grid
    pub fn place(&mut self, agent: Entity, cell: Cell) {
        self.move_agent(agent, cell);
    }

    pub fn position_of(&self, agent: Entity) -> Option<Cell> {
        self.positions.get(&agent).copied()
    }

    pub fn occupants_at(&self, cell: Cell) -> &[Entity] {
        self.cells.get(&cell).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }
}

impl GridService for OccupancyGrid {
    fn neighborhood(&self, center: Cell, adjacency: Adjacency, include_self: bool) -> Vec<Cell> {
        let offsets: &[(i32, i32)] = match adjacency {
            Adjacency::VonNeumann => &VON_NEUMANN,
            Adjacency::Moore => &MOORE,
        };
        let mut cells = Vec::with_capacity(offsets.len() + 1);
        if include_self && self.contains(center) {
            cells.push(center);
        }
        cells.extend(
            offsets
                .iter()
                .map(|&(dx, dy)| center.offset(dx, dy))
                .filter(|c| self.contains(*c)),
        );
        cells
    }

    fn occupants(&self, cells: &[Cell]) -> Vec<Entity> {
        cells
            .iter()
            .flat_map(|c| self.occupants_at(*c).iter().copied())
            .collect()
    }

    fn move_agent(&mut self, agent: Entity, to: Cell) {
        if let Some(from) = self.positions.insert(agent, to) {
            if let Some(here) = self.cells.get_mut(&from) {
                here.retain(|e| *e != agent);
                if here.is_empty() {
                    self.cells.remove(&from);
                }
            }
        }
        self.cells.entry(to).or_default().push(agent);
    }
}

/// Move primitive: relocate an agent on the grid and update its position
pub fn relocate(world: &mut World, agent: Entity, to: Cell) {
    world.resource_mut::<OccupancyGrid>().move_agent(agent, to);
    if let Some(mut position) = world.get_mut::<GridPosition>(agent) {
        position.0 = to;
    }
}
