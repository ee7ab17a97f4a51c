//! World Components
//!
//! Grid cells, positions, distances, the border line and the tick clock.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// A single cell of the simulation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Plain Euclidean distance between two cells
pub fn euclidean_distance(a: Cell, b: Cell) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean distance rounded up to the next integer.
///
/// Used for locale membership and arrival checks, so a cell exactly on the
/// boundary counts as inside.
pub fn ceil_distance(a: Cell, b: Cell) -> i64 {
    euclidean_distance(a, b).ceil() as i64
}

/// Euclidean distance rounded to the nearest integer, then squared.
///
/// This is the distance term of the gravity model.
pub fn rounded_distance_squared(a: Cell, b: Cell) -> i64 {
    let d = euclidean_distance(a, b).round() as i64;
    d * d
}

/// Component: An agent's current cell on the grid
///
/// Only written through [`crate::systems::grid::relocate`], which keeps the
/// occupancy grid in sync.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition(pub Cell);

/// The national border, drawn as a straight line across the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderLine {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl BorderLine {
    /// Line from the left edge at `heights[0]` to the right edge at `heights[1]`
    pub fn across(width: i32, heights: [i32; 2]) -> Self {
        Self {
            start: (0.0, f64::from(heights[0])),
            end: (f64::from(width - 1), f64::from(heights[1])),
        }
    }

    /// Perpendicular distance from a cell to the (infinite) border line
    pub fn distance_to(&self, cell: Cell) -> f64 {
        let (x0, y0) = (f64::from(cell.x), f64::from(cell.y));
        let (x1, y1) = self.start;
        let (x2, y2) = self.end;
        let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        if length == 0.0 {
            return ((x0 - x1).powi(2) + (y0 - y1).powi(2)).sqrt();
        }
        ((y2 - y1) * x0 - (x2 - x1) * y0 + x2 * y1 - y2 * x1).abs() / length
    }
}

/// Resource: Global simulation clock
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldState {
    pub current_tick: u64,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }
}
