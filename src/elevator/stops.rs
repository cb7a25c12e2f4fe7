/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{CallDirection, Direction};

/***************************************/
/*       Public data structures        */
/***************************************/

/// Why a car has committed to stopping at a floor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    /// Destination chosen inside the car. Served whichever way the car travels.
    Cab,
    /// Hall call. Served when passing in the call's direction, or at the turnaround floor.
    Hall(CallDirection),
}

/// Which commitments were cleared at one stop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Served {
    pub cab: bool,
    pub hall_up: bool,
    pub hall_down: bool,
}

impl Served {
    pub fn includes(&self, kind: StopKind) -> bool {
        match kind {
            StopKind::Cab => self.cab,
            StopKind::Hall(CallDirection::Up) => self.hall_up,
            StopKind::Hall(CallDirection::Down) => self.hall_down,
        }
    }

    fn mark(&mut self, call: CallDirection, removed: bool) {
        match call {
            CallDirection::Up => self.hall_up |= removed,
            CallDirection::Down => self.hall_down |= removed,
        }
    }
}

/// Result of stopping at a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    /// Direction of travel after the stop, also announced to riders. `Idle`
    /// only when no stops remain.
    pub next_direction: Direction,
    pub served: Served,
}

/// One entry of a planned route.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStop {
    pub floor: i32,
    /// Floors travelled from the starting position up to and including this stop.
    pub distance: u32,
    pub served: Served,
}

/**
 * Committed stops of one car.
 *
 * Stops are kept per kind, the same way a car tracks cab buttons and the two
 * hall buttons per floor. The partition into "ahead" and "after reversal" is
 * not stored; it is derived from the car's position and direction whenever it
 * is needed, so an insert can never leave the partitions inconsistent.
 *
 * # Fields
 * - `cab`:         Floors selected from inside the car.
 * - `hall_up`:     Floors with an assigned up hall call.
 * - `hall_down`:   Floors with an assigned down hall call.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StopSet {
    cab: BTreeSet<i32>,
    hall_up: BTreeSet<i32>,
    hall_down: BTreeSet<i32>,
}

impl StopSet {
    pub fn new() -> StopSet {
        StopSet::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cab.is_empty() && self.hall_up.is_empty() && self.hall_down.is_empty()
    }

    /// Distinct floors with at least one commitment.
    pub fn floors(&self) -> BTreeSet<i32> {
        self.cab
            .iter()
            .chain(self.hall_up.iter())
            .chain(self.hall_down.iter())
            .copied()
            .collect()
    }

    pub fn contains(&self, floor: i32, kind: StopKind) -> bool {
        match kind {
            StopKind::Cab => self.cab.contains(&floor),
            StopKind::Hall(call) => self.hall(call).contains(&floor),
        }
    }

    /// Returns false if the commitment was already present.
    pub fn insert(&mut self, floor: i32, kind: StopKind) -> bool {
        match kind {
            StopKind::Cab => self.cab.insert(floor),
            StopKind::Hall(call) => self.hall_mut(call).insert(floor),
        }
    }

    /// True if any stop lies strictly beyond `floor` in `direction`.
    pub fn has_stops_beyond(&self, floor: i32, direction: Direction) -> bool {
        let beyond = |f: &i32| match direction {
            Direction::Up => *f > floor,
            Direction::Down => *f < floor,
            Direction::Idle => false,
        };

        self.cab.iter().any(beyond)
            || self.hall_up.iter().any(beyond)
            || self.hall_down.iter().any(beyond)
    }

    /// Whether a car passing `floor` in `direction` must stop there.
    pub fn should_stop(&self, floor: i32, direction: Direction) -> bool {
        let any_hall = self.hall_up.contains(&floor) || self.hall_down.contains(&floor);

        match CallDirection::from_travel(direction) {
            Some(call) => {
                self.cab.contains(&floor)
                    || self.hall(call).contains(&floor)
                    || (any_hall && !self.has_stops_beyond(floor, direction))
            }
            None => self.cab.contains(&floor) || any_hall,
        }
    }

    /// Next floor to stop at and the direction the car travels to reach it.
    ///
    /// The current floor counts as ahead. Stops ahead in `direction` come
    /// first; only when none remain does the car reverse.
    pub fn next_stop(&self, position: i32, direction: Direction) -> Option<(i32, Direction)> {
        if self.is_empty() {
            return None;
        }

        let first = match direction {
            Direction::Idle => self.preferred_direction(position),
            travel => travel,
        };

        [first, first.opposite()]
            .iter()
            .find_map(|&travel| self.first_stop_from(position, travel).map(|f| (f, travel)))
    }

    /// Clears the commitments honoured by stopping at `floor` while travelling in `direction`.
    pub fn serve(&mut self, floor: i32, direction: Direction) -> Service {
        let mut served = Served {
            cab: self.cab.remove(&floor),
            ..Served::default()
        };

        match CallDirection::from_travel(direction) {
            Some(call) => {
                served.mark(call, self.hall_mut(call).remove(&floor));

                // Turnaround floor: riders for the other direction board here too
                if !self.has_stops_beyond(floor, direction) {
                    served.mark(call.opposite(), self.hall_mut(call.opposite()).remove(&floor));
                }
            }
            None => {
                served.hall_up = self.hall_up.remove(&floor);
                served.hall_down = self.hall_down.remove(&floor);
            }
        }

        Service {
            next_direction: self.announce(floor, direction),
            served,
        }
    }

    /// Direction a car standing at `floor` leaves in, as announced to riders.
    ///
    /// `Idle` only when no stops remain. A car with nothing left ahead
    /// announces the reversed direction.
    pub fn announce(&self, floor: i32, direction: Direction) -> Direction {
        if self.is_empty() {
            Direction::Idle
        } else if direction == Direction::Idle {
            self.preferred_direction(floor)
        } else if self.has_stops_beyond(floor, direction) {
            direction
        } else {
            direction.opposite()
        }
    }

    /// Planned stops in visiting order, starting from `position` in `direction`.
    pub fn route(&self, position: i32, direction: Direction) -> Vec<RouteStop> {
        let mut remaining = self.clone();
        let mut route = Vec::new();
        let mut position = position;
        let mut direction = direction;
        let mut distance = 0;

        // Every serve clears at least one commitment, so this terminates
        while let Some((floor, travel)) = remaining.next_stop(position, direction) {
            distance += (floor - position).unsigned_abs();
            position = floor;

            let service = remaining.serve(floor, travel);
            route.push(RouteStop {
                floor,
                distance,
                served: service.served,
            });
            direction = service.next_direction;
        }

        route
    }

    fn first_stop_from(&self, position: i32, direction: Direction) -> Option<i32> {
        let floors = self.floors();
        match direction {
            Direction::Up => floors
                .range(position..)
                .copied()
                .find(|f| self.should_stop(*f, Direction::Up)),
            Direction::Down => floors
                .range(..=position)
                .rev()
                .copied()
                .find(|f| self.should_stop(*f, Direction::Down)),
            Direction::Idle => None,
        }
    }

    // Start upwards if anything is above, otherwise downwards
    fn preferred_direction(&self, position: i32) -> Direction {
        if self.has_stops_beyond(position, Direction::Up) {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    fn hall(&self, call: CallDirection) -> &BTreeSet<i32> {
        match call {
            CallDirection::Up => &self.hall_up,
            CallDirection::Down => &self.hall_down,
        }
    }

    fn hall_mut(&mut self, call: CallDirection) -> &mut BTreeSet<i32> {
        match call {
            CallDirection::Up => &mut self.hall_up,
            CallDirection::Down => &mut self.hall_down,
        }
    }
}
