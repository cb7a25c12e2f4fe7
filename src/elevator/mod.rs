pub mod car;
pub mod stops;


pub use car::{Car, CarSnapshot, DoorTiming};
pub use stops::{RouteStop, Served, StopKind, StopSet};
