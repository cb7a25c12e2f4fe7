/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::StopKind;
use crate::shared::{CallDirection, CarId, RequestId};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Direction button pressed on a floor.
    Hall { direction: CallDirection },
    /// Destination selected inside a car.
    Car { car: CarId, destination: i32 },
}

/// Unit of work handed to the dispatcher. Never modified once created.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub origin_floor: i32,
    pub kind: RequestKind,
}

impl Request {
    pub fn hall(id: RequestId, floor: i32, direction: CallDirection) -> Request {
        Request {
            id,
            origin_floor: floor,
            kind: RequestKind::Hall { direction },
        }
    }

    pub fn car(id: RequestId, car: CarId, origin_floor: i32, destination: i32) -> Request {
        Request {
            id,
            origin_floor,
            kind: RequestKind::Car { car, destination },
        }
    }

    /// Floor the assigned car has to stop at.
    pub fn target_floor(&self) -> i32 {
        match self.kind {
            RequestKind::Hall { .. } => self.origin_floor,
            RequestKind::Car { destination, .. } => destination,
        }
    }

    /// `None` for car calls, which carry no direction preference.
    pub fn requested_direction(&self) -> Option<CallDirection> {
        match self.kind {
            RequestKind::Hall { direction } => Some(direction),
            RequestKind::Car { .. } => None,
        }
    }

    pub fn stop_kind(&self) -> StopKind {
        match self.kind {
            RequestKind::Hall { direction } => StopKind::Hall(direction),
            RequestKind::Car { .. } => StopKind::Cab,
        }
    }
}
