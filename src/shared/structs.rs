/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    /// Direction of travel from `from` to `to`, `Idle` when they are equal.
    pub fn toward(from: i32, to: i32) -> Direction {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::Idle
        }
    }

    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }

    /// Floor delta applied by one step of movement.
    pub fn delta(&self) -> i32 {
        match *self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }

    /// True if `floor` lies at or beyond `position` when travelling in this direction.
    pub fn is_ahead(&self, position: i32, floor: i32) -> bool {
        match *self {
            Direction::Up => floor >= position,
            Direction::Down => floor <= position,
            Direction::Idle => false,
        }
    }
}

impl From<CallDirection> for Direction {
    fn from(item: CallDirection) -> Self {
        match item {
            CallDirection::Up => Direction::Up,
            CallDirection::Down => Direction::Down,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Idle => write!(f, "idle"),
        }
    }
}

/// Direction button on a floor call station.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Up,
    Down,
}

impl CallDirection {
    pub fn opposite(&self) -> CallDirection {
        match *self {
            CallDirection::Up => CallDirection::Down,
            CallDirection::Down => CallDirection::Up,
        }
    }

    /// The hall call direction a moving car serves, `None` for an idle car.
    pub fn from_travel(direction: Direction) -> Option<CallDirection> {
        match direction {
            Direction::Up => Some(CallDirection::Up),
            Direction::Down => Some(CallDirection::Down),
            Direction::Idle => None,
        }
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Direction::from(*self).fmt(f)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CarId(pub u32);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Emitted when a car stops at a floor and starts opening its doors.
///
/// `direction` is the direction the car announces at the floor: the direction
/// it leaves in, reversed at a turnaround floor, or `Idle` when it has no
/// stops left.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalEvent {
    pub car_id: CarId,
    pub floor: i32,
    pub direction: Direction,
}
