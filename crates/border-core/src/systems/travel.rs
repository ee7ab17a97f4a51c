//! Travel State Machine
//!
//! Per-agent trip decisions: leave home, follow a path, visit, return.
//!
//! Each call to [`advance`] consumes one tick of an agent's mobility and tells
//! the caller where the agent moves. Movement itself goes through the grid.

use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::VecDeque;

use crate::components::agent::{TravelChances, TravelState, Traveller};
use crate::components::locale::{LocaleId, LocaleRegistry};
use crate::components::world::Cell;
use crate::systems::destination::{DestinationSelector, TripKind};
use crate::systems::path::plan_path;

/// Where an agent goes this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Random step within the 4-connected neighbourhood (or stay put)
    Wander,
    /// Next cell of a planned path
    StepTo(Cell),
}

/// Run one tick of the travel state machine for a single agent
pub fn advance(
    traveller: &mut Traveller,
    home: LocaleId,
    position: Cell,
    registry: &LocaleRegistry,
    selector: &DestinationSelector,
    rng: &mut SmallRng,
) -> Movement {
    let chances = traveller.chances;
    let (next, movement) = match std::mem::take(&mut traveller.state) {
        TravelState::Idle => decide_departure(chances, home, position, registry, selector, rng),
        TravelState::Travelling { target, mut path } => match path.pop_front() {
            Some(cell) => (TravelState::Travelling { target, path }, Movement::StepTo(cell)),
            None if target == home => (TravelState::Idle, Movement::Wander),
            None => (TravelState::Visiting { target }, Movement::Wander),
        },
        TravelState::Visiting { target } => {
            if rng.gen::<f64>() < chances.return_home {
                head_home(home, position, registry)
                    .unwrap_or((TravelState::Visiting { target }, Movement::Wander))
            } else {
                (TravelState::Visiting { target }, Movement::Wander)
            }
        }
    };
    traveller.state = next;
    movement
}

/// Idle agent: maybe drift back to the home centre, otherwise maybe start a trip
fn decide_departure(
    chances: TravelChances,
    home: LocaleId,
    position: Cell,
    registry: &LocaleRegistry,
    selector: &DestinationSelector,
    rng: &mut SmallRng,
) -> (TravelState, Movement) {
    if rng.gen::<f64>() < chances.homing {
        return head_home(home, position, registry)
            .unwrap_or((TravelState::Idle, Movement::Wander));
    }

    let kind = if rng.gen::<f64>() < chances.domestic {
        Some(TripKind::Domestic)
    } else if rng.gen::<f64>() < chances.abroad {
        Some(TripKind::Abroad)
    } else {
        None
    };

    let target = kind.and_then(|kind| selector.sample(home, kind, rng));
    match target.and_then(|t| registry.get(t)) {
        Some(locale) => depart(locale.id, home, plan_path(position, locale)),
        None => (TravelState::Idle, Movement::Wander),
    }
}

fn head_home(
    home: LocaleId,
    position: Cell,
    registry: &LocaleRegistry,
) -> Option<(TravelState, Movement)> {
    let locale = registry.get(home)?;
    Some(depart(home, home, plan_path(position, locale)))
}

/// Start a trip and take its first step in the same tick.
///
/// An empty path home means the agent is already there; an empty path
/// elsewhere arrives on the next tick.
fn depart(target: LocaleId, home: LocaleId, mut path: VecDeque<Cell>) -> (TravelState, Movement) {
    match path.pop_front() {
        Some(cell) => (TravelState::Travelling { target, path }, Movement::StepTo(cell)),
        None if target == home => (TravelState::Idle, Movement::Wander),
        None => (TravelState::Travelling { target, path }, Movement::Wander),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::locale::Locale;
    use rand::SeedableRng;

    struct Fixture {
        registry: LocaleRegistry,
        selector: DestinationSelector,
        a: LocaleId,
        b: LocaleId,
    }

    fn fixture() -> Fixture {
        let mut registry = LocaleRegistry::new();
        let x = registry.intern_country("X");
        let y = registry.intern_country("Y");
        let a = registry.add(Locale::new("A", x, Cell::new(5, 5), 2, 10, 0.0));
        let b = registry.add(Locale::new("B", y, Cell::new(25, 5), 2, 10, 1.0));
        let selector = DestinationSelector::new(&registry);
        Fixture {
            registry,
            selector,
            a,
            b,
        }
    }

    fn chances(domestic: f64, abroad: f64, return_home: f64, homing: f64) -> TravelChances {
        TravelChances {
            domestic,
            abroad,
            return_home,
            homing,
        }
    }

    #[test]
    fn test_idle_without_chances_wanders() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut traveller = Traveller::new(chances(0.0, 0.0, 0.0, 0.0));

        for _ in 0..20 {
            let movement = advance(&mut traveller, f.a, Cell::new(5, 5), &f.registry, &f.selector, &mut rng);
            assert_eq!(movement, Movement::Wander);
            assert!(traveller.is_idle());
        }
    }

    #[test]
    fn test_departure_steps_towards_target() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut traveller = Traveller::new(chances(0.0, 1.0, 0.0, 0.0));

        let movement = advance(&mut traveller, f.a, Cell::new(5, 5), &f.registry, &f.selector, &mut rng);
        assert_eq!(movement, Movement::StepTo(Cell::new(6, 5)));
        assert_eq!(traveller.state.target(), Some(f.b));
        assert!(traveller.is_travelling());
    }

    #[test]
    fn test_full_trip_and_return() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut traveller = Traveller::new(chances(0.0, 1.0, 0.0, 0.0));
        let mut position = Cell::new(5, 5);

        // Outbound: follow the path until the state flips to visiting
        for _ in 0..40 {
            match advance(&mut traveller, f.a, position, &f.registry, &f.selector, &mut rng) {
                Movement::StepTo(cell) => position = cell,
                Movement::Wander => {}
            }
            if traveller.is_visiting() {
                break;
            }
        }
        assert_eq!(traveller.state, TravelState::Visiting { target: f.b });
        // Path stops short of the arrival threshold (radius 2 -> 1 cell)
        assert_eq!(position, Cell::new(23, 5));

        // Return: certain once visiting
        traveller.chances.return_home = 1.0;
        traveller.chances.abroad = 0.0;
        for _ in 0..40 {
            match advance(&mut traveller, f.a, position, &f.registry, &f.selector, &mut rng) {
                Movement::StepTo(cell) => position = cell,
                Movement::Wander => {}
            }
            if traveller.is_idle() {
                break;
            }
        }
        assert!(traveller.is_idle());
        assert!(f.registry.get(f.a).unwrap().contains(position));
    }

    #[test]
    fn test_arrival_without_path_visits_next_tick() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut traveller = Traveller::new(chances(0.0, 0.0, 0.0, 0.0));
        traveller.state = TravelState::Travelling {
            target: f.b,
            path: VecDeque::new(),
        };

        let movement = advance(&mut traveller, f.a, Cell::new(25, 5), &f.registry, &f.selector, &mut rng);
        assert_eq!(movement, Movement::Wander);
        assert_eq!(traveller.state, TravelState::Visiting { target: f.b });
    }

    #[test]
    fn test_homing_at_home_stays_idle() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(5);
        // Travel chances are ignored on a tick where homing triggers
        let mut traveller = Traveller::new(chances(0.0, 1.0, 0.0, 1.0));

        let movement = advance(&mut traveller, f.a, Cell::new(5, 5), &f.registry, &f.selector, &mut rng);
        assert_eq!(movement, Movement::Wander);
        assert!(traveller.is_idle());
    }

    #[test]
    fn test_homing_away_from_centre_heads_home() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut traveller = Traveller::new(chances(0.0, 0.0, 0.0, 1.0));

        let movement = advance(&mut traveller, f.a, Cell::new(15, 5), &f.registry, &f.selector, &mut rng);
        assert_eq!(movement, Movement::StepTo(Cell::new(14, 5)));
        assert_eq!(traveller.state.target(), Some(f.a));
    }

    #[test]
    fn test_visiting_without_return_wanders() {
        let f = fixture();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut traveller = Traveller::new(chances(1.0, 1.0, 0.0, 1.0));
        traveller.state = TravelState::Visiting { target: f.b };

        for _ in 0..10 {
            let movement = advance(&mut traveller, f.a, Cell::new(25, 5), &f.registry, &f.selector, &mut rng);
            assert_eq!(movement, Movement::Wander);
            assert_eq!(traveller.state, TravelState::Visiting { target: f.b });
        }
    }
}
