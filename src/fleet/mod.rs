pub mod fleet;
pub mod station;

#[cfg(test)]
mod fleet_tests;

pub use fleet::{Fleet, FleetSnapshot, RequestStatus, SERVED_HISTORY};
pub use station::FloorCallStation;
