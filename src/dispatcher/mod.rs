pub mod dispatcher;
pub mod request;


pub use dispatcher::{Candidate, Dispatcher, Reachability};
pub use request::{Request, RequestKind};
