/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info};
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatcherConfig;
use crate::dispatcher::request::{Request, RequestKind};
use crate::elevator::CarSnapshot;
use crate::error::{DispatchError, DispatchResult};
use crate::shared::{CarId, Direction};

/***************************************/
/*       Public data structures        */
/***************************************/

/// How cheaply a car can take on a request.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Reachability {
    /// Class A: travelling the requested way with the floor still ahead.
    EnRoute,
    /// Class B: parked with no stops.
    Idle,
    /// Class C: moving away, or already past the floor.
    Incompatible,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub car: CarId,
    pub class: Reachability,
    pub cost: u32,
}

/**
 * Chooses the car that serves a request.
 *
 * The dispatcher holds only its scoring parameter. It reads car snapshots and
 * never touches a car, so the same snapshots and request always give the same
 * answer.
 *
 * # Fields
 * - `stop_penalty`:    Cost in floors added for each committed stop made before the request floor.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    stop_penalty: u32,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(&DispatcherConfig::default())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
impl Dispatcher {
    pub fn new(config: &DispatcherConfig) -> Dispatcher {
        Dispatcher {
            stop_penalty: config.stop_penalty,
        }
    }

    pub fn with_stop_penalty(stop_penalty: u32) -> Dispatcher {
        Dispatcher { stop_penalty }
    }

    pub fn stop_penalty(&self) -> u32 {
        self.stop_penalty
    }

    pub fn classify(&self, car: &CarSnapshot, request: &Request) -> Reachability {
        if car.direction == Direction::Idle {
            return Reachability::Idle;
        }

        // Car calls have no direction preference
        let same_way = match request.requested_direction() {
            Some(call) => Direction::from(call) == car.direction,
            None => true,
        };

        if same_way && car.direction.is_ahead(car.position, request.target_floor()) {
            Reachability::EnRoute
        } else {
            Reachability::Incompatible
        }
    }

    /// Floors travelled until the car serves the request, plus the stop penalty
    /// for every committed stop it makes on the way.
    pub fn cost(&self, car: &CarSnapshot, request: &Request) -> u32 {
        let floor = request.target_floor();
        let kind = request.stop_kind();

        let mut stops = car.stops.clone();
        stops.insert(floor, kind);
        let route = stops.route(car.position, car.direction);

        match route
            .iter()
            .position(|stop| stop.floor == floor && stop.served.includes(kind))
        {
            Some(index) => route[index]
                .distance
                .saturating_add(self.stop_penalty.saturating_mul(index as u32)),
            None => u32::MAX,
        }
    }

    /// Scores every car that may take the request.
    pub fn candidates(&self, cars: &[CarSnapshot], request: &Request) -> Vec<Candidate> {
        cars.iter()
            .filter(|car| match request.kind {
                RequestKind::Car { car: pinned, .. } => car.id == pinned,
                RequestKind::Hall { .. } => true,
            })
            .map(|car| Candidate {
                car: car.id,
                class: self.classify(car, request),
                cost: self.cost(car, request),
            })
            .collect()
    }

    /// Picks the car for `request`.
    ///
    /// En-route and idle cars compete on cost; incompatible cars are only
    /// considered when no other car is left. Ties go to the lowest car id.
    pub fn assign(&self, cars: &[CarSnapshot], request: &Request) -> DispatchResult<CarId> {
        if cars.is_empty() {
            return Err(DispatchError::NoCarsAvailable);
        }

        let candidates = self.candidates(cars, request);
        for candidate in candidates.iter() {
            debug!(
                "{} for {}: class {:?}, cost {}",
                candidate.car, request.id, candidate.class, candidate.cost
            );
        }

        if let RequestKind::Car { car, .. } = request.kind {
            if candidates.is_empty() {
                return Err(DispatchError::UnknownCar(car));
            }
        }

        let reachable: Vec<&Candidate> = candidates
            .iter()
            .filter(|candidate| candidate.class != Reachability::Incompatible)
            .collect();

        let pool = if reachable.is_empty() {
            candidates.iter().collect()
        } else {
            reachable
        };

        let winner = pool
            .into_iter()
            .min_by_key(|candidate| (candidate.cost, candidate.car))
            .ok_or(DispatchError::NoCarsAvailable)?;

        info!(
            "{} (floor {}) assigned to {} as {:?}, cost {}",
            request.id,
            request.target_floor(),
            winner.car,
            winner.class,
            winner.cost
        );
        Ok(winner.car)
    }
}
