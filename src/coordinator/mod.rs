pub mod coordinator;


pub use coordinator::{Command, Coordinator, CoordinatorHandle};
