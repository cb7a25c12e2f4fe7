/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, trace};
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::ElevatorConfig;
use crate::elevator::stops::{RouteStop, StopKind, StopSet};
use crate::shared::{ArrivalEvent, CallDirection, CarId, Direction, DoorState};

/***************************************/
/*       Public data structures        */
/***************************************/

/// Number of ticks each door phase lasts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorTiming {
    pub opening: u32,
    pub open: u32,
    pub closing: u32,
}

impl DoorTiming {
    fn ticks(&self, state: DoorState) -> u32 {
        match state {
            DoorState::Opening => self.opening,
            DoorState::Open => self.open,
            DoorState::Closing => self.closing,
            DoorState::Closed => 0,
        }
    }
}

impl Default for DoorTiming {
    fn default() -> Self {
        DoorTiming {
            opening: 1,
            open: 3,
            closing: 1,
        }
    }
}

impl From<&ElevatorConfig> for DoorTiming {
    fn from(config: &ElevatorConfig) -> Self {
        DoorTiming {
            opening: config.door_opening_ticks,
            open: config.door_open_ticks,
            closing: config.door_closing_ticks,
        }
    }
}

/// Read-only copy of a car's state, as scored by the dispatcher.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CarSnapshot {
    pub id: CarId,
    pub position: i32,
    pub direction: Direction,
    #[serde(rename = "doorState")]
    pub door_state: DoorState,
    pub stops: StopSet,
}

impl CarSnapshot {
    /// Planned stops in visiting order.
    pub fn route(&self) -> Vec<RouteStop> {
        self.stops.route(self.position, self.direction)
    }
}

/**
 * One elevator car, advanced one discrete tick at a time.
 *
 * The car never blocks: movement and door operation only happen inside
 * `step`, which the fleet calls once per tick. New stops are committed with
 * `add_stop` between ticks.
 *
 * # Fields
 * - `id`:          Identifier handed out by the fleet.
 * - `position`:    Current floor. Only `step` changes it, by at most one floor.
 * - `direction`:   Direction of travel. `Idle` exactly when `stops` is empty.
 * - `door_state`:  Door phase. The car only moves while this is `Closed`.
 * - `door_timer`:  Ticks left in the current door phase.
 * - `stops`:       Committed stops.
 * - `timing`:      Length of each door phase.
 */
#[derive(Debug, Clone)]
pub struct Car {
    id: CarId,
    position: i32,
    direction: Direction,
    door_state: DoorState,
    door_timer: u32,
    stops: StopSet,
    timing: DoorTiming,
}

impl Car {
    pub fn new(id: CarId, position: i32, timing: DoorTiming) -> Car {
        Car {
            id,
            position,
            direction: Direction::Idle,
            door_state: DoorState::Closed,
            door_timer: 0,
            stops: StopSet::new(),
            timing,
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn door_state(&self) -> DoorState {
        self.door_state
    }

    pub fn has_stops(&self) -> bool {
        !self.stops.is_empty()
    }

    pub fn has_stop(&self, floor: i32, kind: StopKind) -> bool {
        self.stops.contains(floor, kind)
    }

    /// Committed stop floors in the order the car will visit them.
    pub fn stops(&self) -> Vec<i32> {
        self.route().iter().map(|stop| stop.floor).collect()
    }

    pub fn route(&self) -> Vec<RouteStop> {
        self.stops.route(self.position, self.direction)
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            id: self.id,
            position: self.position,
            direction: self.direction,
            door_state: self.door_state,
            stops: self.stops.clone(),
        }
    }

    /// Commits a stop at `floor`.
    ///
    /// A call for the floor the car is standing at is answered on the spot
    /// and returns the arrival event, unless the doors are closing or the car
    /// is committed to travel the other way.
    pub fn add_stop(&mut self, floor: i32, kind: StopKind) -> Option<ArrivalEvent> {
        if floor == self.position && self.is_compatible(kind) {
            match self.door_state {
                DoorState::Closed => {
                    self.open_doors();
                    return Some(self.arrival(self.stops.announce(floor, self.direction)));
                }
                DoorState::Opening => {
                    return Some(self.arrival(self.stops.announce(floor, self.direction)));
                }
                DoorState::Open => {
                    debug!("{} holding doors open at floor {}", self.id, floor);
                    self.door_timer = self.timing.open;
                    return Some(self.arrival(self.stops.announce(floor, self.direction)));
                }
                // Reopen once the doors have closed
                DoorState::Closing => (),
            }
        }

        let was_empty = self.stops.is_empty();
        if !self.stops.insert(floor, kind) {
            return None;
        }

        if was_empty {
            self.direction = match Direction::toward(self.position, floor) {
                Direction::Idle => match kind {
                    StopKind::Hall(call) => call.into(),
                    StopKind::Cab => Direction::Up,
                },
                toward => toward,
            };
        }

        debug!(
            "{} committed stop {} ({:?}), route {:?}",
            self.id,
            floor,
            kind,
            self.stops()
        );
        None
    }

    /// Advances the car by one tick.
    pub fn step(&mut self) -> Option<ArrivalEvent> {
        if self.door_state != DoorState::Closed {
            self.advance_doors();
            return None;
        }

        let (target, travel) = self.stops.next_stop(self.position, self.direction)?;
        self.direction = travel;

        if target != self.position {
            self.position += travel.delta();
            trace!("{} moving {} to floor {}", self.id, travel, self.position);
        }

        if self.position != target {
            return None;
        }

        let service = self.stops.serve(self.position, travel);
        self.direction = service.next_direction;
        self.open_doors();

        info!(
            "{} arrived at floor {} going {}",
            self.id, self.position, service.next_direction
        );
        Some(self.arrival(service.next_direction))
    }

    fn is_compatible(&self, kind: StopKind) -> bool {
        match (kind, CallDirection::from_travel(self.direction)) {
            (StopKind::Cab, _) => true,
            (StopKind::Hall(_), None) => true,
            (StopKind::Hall(call), Some(travel)) => {
                call == travel || !self.stops.has_stops_beyond(self.position, self.direction)
            }
        }
    }

    fn open_doors(&mut self) {
        self.door_state = DoorState::Opening;
        self.door_timer = self.timing.ticks(DoorState::Opening);
    }

    // Closed -> Opening -> Open -> Closing -> Closed, one phase at a time
    fn advance_doors(&mut self) {
        self.door_timer = self.door_timer.saturating_sub(1);
        if self.door_timer > 0 {
            return;
        }

        let next = match self.door_state {
            DoorState::Opening => DoorState::Open,
            DoorState::Open => DoorState::Closing,
            DoorState::Closing => DoorState::Closed,
            DoorState::Closed => DoorState::Closed,
        };

        debug!("{} doors {:?} -> {:?}", self.id, self.door_state, next);
        self.door_state = next;
        self.door_timer = self.timing.ticks(next);
    }

    fn arrival(&self, direction: Direction) -> ArrivalEvent {
        ArrivalEvent {
            car_id: self.id,
            floor: self.position,
            direction,
        }
    }
}
