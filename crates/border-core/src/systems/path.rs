//! Path Planning
//!
//! Straight-line paths across the grid for travelling agents.

use std::collections::VecDeque;

use crate::components::locale::Locale;
use crate::components::world::{ceil_distance, Cell};

/// Raster line from `start` to `end` (Bresenham), excluding `start`.
///
/// Every cell differs from the previous one by at most one step on each axis.
pub fn line_cells(start: Cell, end: Cell) -> Vec<Cell> {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity(dx.max(-dy) as usize);
    let mut err = dx + dy;
    let mut current = start;

    while current != end {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
        cells.push(current);
    }
    cells
}

/// Path from `start` towards `center`, cut where it first comes within
/// `threshold` of the centre.
///
/// The last cell returned is still outside the threshold; an empty path means
/// the traveller is already there.
pub fn plan_path_to(start: Cell, center: Cell, threshold: f64) -> VecDeque<Cell> {
    let mut cells = line_cells(start, center);
    while let Some(&last) = cells.last() {
        if ceil_distance(last, center) as f64 <= threshold {
            cells.pop();
        } else {
            break;
        }
    }
    cells.into()
}

/// Path from `start` to `target`, stopping at its arrival threshold
pub fn plan_path(start: Cell, target: &Locale) -> VecDeque<Cell> {
    plan_path_to(start, target.center, target.arrival_threshold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::locale::CountryId;
    use std::collections::HashSet;

    fn assert_connected(start: Cell, cells: &[Cell]) {
        let mut previous = start;
        for cell in cells {
            let step_x = (cell.x - previous.x).abs();
            let step_y = (cell.y - previous.y).abs();
            assert!(step_x <= 1 && step_y <= 1, "jump from {:?} to {:?}", previous, cell);
            assert!(step_x + step_y >= 1, "no progress at {:?}", cell);
            previous = *cell;
        }
    }

    #[test]
    fn test_line_all_octants() {
        let start = Cell::new(20, 20);
        let ends = [
            Cell::new(30, 23),
            Cell::new(23, 30),
            Cell::new(17, 30),
            Cell::new(10, 23),
            Cell::new(10, 17),
            Cell::new(17, 10),
            Cell::new(23, 10),
            Cell::new(30, 17),
            Cell::new(20, 35),
            Cell::new(5, 20),
            Cell::new(32, 32),
        ];

        for end in ends {
            let cells = line_cells(start, end);
            assert_eq!(cells.last(), Some(&end));
            assert!(!cells.contains(&start));
            assert_connected(start, &cells);

            let distinct: HashSet<&Cell> = cells.iter().collect();
            assert_eq!(distinct.len(), cells.len());

            let expected_len = (end.x - start.x).abs().max((end.y - start.y).abs());
            assert_eq!(cells.len(), expected_len as usize);
        }
    }

    #[test]
    fn test_horizontal_and_vertical_lines() {
        let cells = line_cells(Cell::new(0, 5), Cell::new(4, 5));
        assert_eq!(
            cells,
            vec![Cell::new(1, 5), Cell::new(2, 5), Cell::new(3, 5), Cell::new(4, 5)]
        );

        let cells = line_cells(Cell::new(3, 9), Cell::new(3, 6));
        assert_eq!(cells, vec![Cell::new(3, 8), Cell::new(3, 7), Cell::new(3, 6)]);
    }

    #[test]
    fn test_start_at_center_is_empty() {
        let center = Cell::new(10, 10);
        assert!(line_cells(center, center).is_empty());
        assert!(plan_path_to(center, center, 0.0).is_empty());
    }

    #[test]
    fn test_path_stops_at_threshold() {
        let center = Cell::new(50, 50);
        let start = Cell::new(10, 38);
        let threshold = 3.0;

        let full = line_cells(start, center);
        let path = plan_path_to(start, center, threshold);
        assert!(!path.is_empty());
        assert!(path.len() < full.len());

        let last = *path.back().unwrap();
        assert!(ceil_distance(last, center) as f64 > threshold);
        for trimmed in &full[path.len()..] {
            assert!(ceil_distance(*trimmed, center) as f64 <= threshold);
        }
        assert_eq!(&full[..path.len()], path.iter().copied().collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn test_path_inside_threshold_is_empty() {
        let target = Locale::new("Leuven", CountryId(1), Cell::new(58, 164), 6, 15, 0.0);
        assert!(plan_path(Cell::new(60, 165), &target).is_empty());
        assert!(!plan_path(Cell::new(58, 150), &target).is_empty());
    }
}
