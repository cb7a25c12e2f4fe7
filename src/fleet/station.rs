/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::Request;
use crate::shared::{CallDirection, CarId, Direction, RequestId};

/***************************************/
/*       Public data structures        */
/***************************************/

/// Up/down call buttons on one floor.
///
/// Each direction is either idle or pending with the request that is being
/// serviced for it. Both directions may be pending at once.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FloorCallStation {
    floor: i32,
    pending_calls: BTreeMap<CallDirection, RequestId>,
}

impl FloorCallStation {
    pub fn new(floor: i32) -> FloorCallStation {
        FloorCallStation {
            floor,
            pending_calls: BTreeMap::new(),
        }
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn pending_request(&self, direction: CallDirection) -> Option<RequestId> {
        self.pending_calls.get(&direction).copied()
    }

    pub fn pending_calls(&self) -> impl Iterator<Item = (CallDirection, RequestId)> + '_ {
        self.pending_calls.iter().map(|(direction, id)| (*direction, *id))
    }

    pub fn has_pending_calls(&self) -> bool {
        !self.pending_calls.is_empty()
    }

    /// Marks `direction` as pending and returns the request to forward to the dispatcher.
    pub fn request_direction(&mut self, direction: CallDirection, id: RequestId) -> Request {
        self.pending_calls.insert(direction, id);
        Request::hall(id, self.floor, direction)
    }

    /// Drops a pending call whose request was rejected.
    pub fn withdraw(&mut self, direction: CallDirection) {
        self.pending_calls.remove(&direction);
    }

    /// Clears the calls answered by a car opening its doors here.
    ///
    /// A car announcing a direction answers that direction only; a car with no
    /// further preference answers every pending call.
    pub fn on_car_arrived(&mut self, car_id: CarId, direction: Direction) -> Vec<RequestId> {
        let cleared: Vec<RequestId> = match CallDirection::from_travel(direction) {
            Some(call) => self.pending_calls.remove(&call).into_iter().collect(),
            None => std::mem::take(&mut self.pending_calls).into_values().collect(),
        };

        if !cleared.is_empty() {
            debug!(
                "floor {}: {} cleared {:?} going {}",
                self.floor, car_id, cleared, direction
            );
        }
        cleared
    }
}
