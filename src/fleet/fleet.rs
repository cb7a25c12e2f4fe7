/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, Config};
use crate::dispatcher::{Dispatcher, Request};
use crate::elevator::{Car, CarSnapshot, DoorTiming, StopKind};
use crate::error::{DispatchError, DispatchResult};
use crate::fleet::station::FloorCallStation;
use crate::shared::{ArrivalEvent, CallDirection, CarId, DoorState, RequestId};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    Assigned(CarId),
    Served(CarId),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FleetSnapshot {
    pub tick: u64,
    pub cars: Vec<CarSnapshot>,
    pub stations: Vec<FloorCallStation>,
}

impl FleetSnapshot {
    pub fn is_idle(&self) -> bool {
        self.cars
            .iter()
            .all(|car| car.stops.is_empty() && car.door_state == DoorState::Closed)
    }
}

/// Number of served requests whose status stays queryable.
pub const SERVED_HISTORY: usize = 256;

#[derive(Debug, Clone)]
struct Assignment {
    request: Request,
    car: CarId,
}

type StopKey = (CarId, i32, StopKind);

/**
 * Owns every car and floor station and drives them with a shared tick.
 *
 * Requests enter only through the `submit_*` methods and cars move only in
 * `advance`, so calls always land on a tick boundary.
 *
 * # Fields
 * - `building`:            Floor bounds. Requests outside are rejected.
 * - `timing`:              Door timing given to every registered car.
 * - `dispatcher`:          Scores cars for each new request.
 * - `cars`:                Registered cars, indexed by id.
 * - `stations`:            One call station per floor.
 * - `requests`:            Accepted requests not yet served, with the car they were given to.
 * - `stop_index`:          Open requests by the car stop that answers them.
 * - `served`:              The most recent served requests, at most `SERVED_HISTORY`.
 * - `pending_arrivals`:    Arrivals that happened at submission time, reported by the next `advance`.
 * - `tick`:                Number of completed ticks.
 */
#[derive(Debug, Clone)]
pub struct Fleet {
    building: BuildingConfig,
    timing: DoorTiming,
    dispatcher: Dispatcher,
    cars: Vec<Car>,
    stations: BTreeMap<i32, FloorCallStation>,
    requests: BTreeMap<RequestId, Assignment>,
    stop_index: BTreeMap<StopKey, Vec<RequestId>>,
    served: VecDeque<(RequestId, CarId)>,
    next_request_id: u64,
    pending_arrivals: Vec<ArrivalEvent>,
    tick: u64,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Fleet {
    /// Empty fleet with a call station on every floor of the building.
    pub fn new(config: &Config) -> Fleet {
        let stations = (config.building.min_floor..=config.building.max_floor)
            .map(|floor| (floor, FloorCallStation::new(floor)))
            .collect();

        Fleet {
            building: config.building,
            timing: DoorTiming::from(&config.elevator),
            dispatcher: Dispatcher::new(&config.dispatcher),
            cars: Vec::new(),
            stations,
            requests: BTreeMap::new(),
            stop_index: BTreeMap::new(),
            served: VecDeque::with_capacity(SERVED_HISTORY),
            next_request_id: 0,
            pending_arrivals: Vec::new(),
            tick: 0,
        }
    }

    /// Fleet with one car registered per configured initial floor.
    pub fn from_config(config: &Config) -> DispatchResult<Fleet> {
        let mut fleet = Fleet::new(config);
        for floor in config.elevator.initial_floors.iter() {
            fleet.register_car(*floor)?;
        }
        Ok(fleet)
    }

    pub fn register_car(&mut self, initial_floor: i32) -> DispatchResult<CarId> {
        self.check_floor(initial_floor)?;

        let id = CarId(self.cars.len() as u32);
        self.cars.push(Car::new(id, initial_floor, self.timing));
        info!("Registered {} at floor {}", id, initial_floor);
        Ok(id)
    }

    /// Hall call from `floor`. A direction that is already pending keeps its request.
    pub fn submit_hall_call(
        &mut self,
        floor: i32,
        direction: CallDirection,
    ) -> DispatchResult<RequestId> {
        if let Err(e) = self.check_floor(floor) {
            warn!("Rejected {} call at floor {}: {}", direction, floor, e);
            return Err(e);
        }

        let id = RequestId(self.next_request_id);
        let station = self
            .stations
            .entry(floor)
            .or_insert_with(|| FloorCallStation::new(floor));

        if let Some(pending) = station.pending_request(direction) {
            debug!("Floor {} {} call already pending as {}", floor, direction, pending);
            return Ok(pending);
        }

        let request = station.request_direction(direction, id);
        let car_id = match self.dispatcher.assign(&self.snapshots(), &request) {
            Ok(car_id) => car_id,
            Err(e) => {
                if let Some(station) = self.stations.get_mut(&floor) {
                    station.withdraw(direction);
                }
                warn!("Rejected {} call at floor {}: {}", direction, floor, e);
                return Err(e);
            }
        };

        self.commit(request, car_id)?;
        Ok(id)
    }

    /// Destination selected inside `car_id`.
    pub fn submit_car_call(
        &mut self,
        car_id: CarId,
        destination_floor: i32,
    ) -> DispatchResult<RequestId> {
        let origin_floor = match self.car(car_id) {
            Some(car) => car.position(),
            None => {
                warn!("Rejected car call to floor {}: unknown {}", destination_floor, car_id);
                return Err(DispatchError::UnknownCar(car_id));
            }
        };

        if let Err(e) = self.check_floor(destination_floor) {
            warn!("Rejected car call in {}: {}", car_id, e);
            return Err(e);
        }

        let id = RequestId(self.next_request_id);
        let request = Request::car(id, car_id, origin_floor, destination_floor);
        let assigned = self.dispatcher.assign(&self.snapshots(), &request)?;
        self.commit(request, assigned)?;
        Ok(id)
    }

    /// Runs one tick: every car steps once in id order, then arrivals are delivered.
    pub fn advance(&mut self) -> Vec<ArrivalEvent> {
        self.tick += 1;

        // Step every car before delivering anything, so no car sees another's result
        let stepped: Vec<ArrivalEvent> = self.cars.iter_mut().filter_map(Car::step).collect();

        for event in stepped.iter() {
            self.deliver(event);
        }

        let mut events = std::mem::take(&mut self.pending_arrivals);
        events.extend(stepped);
        events
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id.0 as usize)
    }

    pub fn station(&self, floor: i32) -> Option<&FloorCallStation> {
        self.stations.get(&floor)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Status of an open request, or of one among the last `SERVED_HISTORY` served.
    pub fn request_status(&self, id: RequestId) -> Option<RequestStatus> {
        if let Some(assignment) = self.requests.get(&id) {
            return Some(RequestStatus::Assigned(assignment.car));
        }

        self.served
            .iter()
            .rev()
            .find(|(served_id, _)| *served_id == id)
            .map(|(_, car)| RequestStatus::Served(*car))
    }

    /// Number of accepted requests still waiting for a car.
    pub fn open_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn snapshots(&self) -> Vec<CarSnapshot> {
        self.cars.iter().map(Car::snapshot).collect()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            tick: self.tick,
            cars: self.snapshots(),
            stations: self
                .stations
                .values()
                .filter(|station| station.has_pending_calls())
                .cloned()
                .collect(),
        }
    }

    /// True when no car has work left and every door is closed.
    pub fn is_idle(&self) -> bool {
        self.pending_arrivals.is_empty()
            && self
                .cars
                .iter()
                .all(|car| !car.has_stops() && car.door_state() == DoorState::Closed)
    }

    fn check_floor(&self, floor: i32) -> DispatchResult<()> {
        if self.building.contains(floor) {
            Ok(())
        } else {
            Err(DispatchError::InvalidFloor {
                floor,
                min: self.building.min_floor,
                max: self.building.max_floor,
            })
        }
    }

    // Hands the request to its car. A request id is only ever committed once.
    fn commit(&mut self, request: Request, car_id: CarId) -> DispatchResult<()> {
        if self.requests.contains_key(&request.id) {
            return Ok(());
        }

        let car = self
            .cars
            .get_mut(car_id.0 as usize)
            .ok_or(DispatchError::UnknownCar(car_id))?;
        let floor = request.target_floor();
        let kind = request.stop_kind();
        let arrival = car.add_stop(floor, kind);

        self.next_request_id = self.next_request_id.max(request.id.0 + 1);
        self.stop_index
            .entry((car_id, floor, kind))
            .or_default()
            .push(request.id);
        self.requests.insert(
            request.id,
            Assignment {
                request,
                car: car_id,
            },
        );

        if let Some(event) = arrival {
            self.deliver(&event);
            self.pending_arrivals.push(event);
        }
        Ok(())
    }

    // Reports an arrival to the floor's station and settles the requests it answered
    fn deliver(&mut self, event: &ArrivalEvent) {
        let cleared = match self.stations.get_mut(&event.floor) {
            Some(station) => station.on_car_arrived(event.car_id, event.direction),
            None => Vec::new(),
        };
        for id in cleared {
            self.settle(id, event.car_id);
        }

        let kinds = [
            StopKind::Cab,
            StopKind::Hall(CallDirection::Up),
            StopKind::Hall(CallDirection::Down),
        ];
        for kind in kinds {
            let still_committed = self
                .car(event.car_id)
                .map_or(false, |car| car.has_stop(event.floor, kind));
            if still_committed {
                continue;
            }

            let ids = match self.stop_index.remove(&(event.car_id, event.floor, kind)) {
                Some(ids) => ids,
                None => continue,
            };
            for id in ids {
                if let (StopKind::Hall(direction), Some(station)) =
                    (kind, self.stations.get_mut(&event.floor))
                {
                    if station.pending_request(direction) == Some(id) {
                        station.withdraw(direction);
                    }
                }
                self.settle(id, event.car_id);
            }
        }
    }

    // Moves an open request into the bounded served history
    fn settle(&mut self, id: RequestId, car_id: CarId) {
        let assignment = match self.requests.remove(&id) {
            Some(assignment) => assignment,
            None => return,
        };

        debug!(
            "{} (floor {}) served by {}",
            id,
            assignment.request.target_floor(),
            car_id
        );
        if self.served.len() == SERVED_HISTORY {
            self.served.pop_front();
        }
        self.served.push_back((id, car_id));
    }
}
