pub mod macros;
pub mod structs;

pub use structs::ArrivalEvent;
pub use structs::CallDirection;
pub use structs::CarId;
pub use structs::Direction;
pub use structs::DoorState;
pub use structs::RequestId;
