/* Modules */
pub mod shared;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod elevator;
pub mod error;
pub mod fleet;
pub mod scenario;

pub use config::Config;
pub use coordinator::CoordinatorHandle;
pub use dispatcher::{Dispatcher, Request};
pub use elevator::Car;
pub use error::{ConfigError, CoordinatorError, DispatchError, DispatchResult};
pub use fleet::{Fleet, FleetSnapshot, FloorCallStation, RequestStatus};
pub use shared::{ArrivalEvent, CallDirection, CarId, Direction, DoorState, RequestId};
