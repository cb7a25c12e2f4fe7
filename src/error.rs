/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::fmt;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::CarId;

/***************************************/
/*            Error types              */
/***************************************/

/// Rejections returned by the fleet entry points.
///
/// All of them are local and synchronous: a rejected request never reaches a
/// car's stop set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No car is registered to score the request against.
    NoCarsAvailable,

    /// A car call referenced an id that was never registered.
    UnknownCar(CarId),

    /// Origin or destination floor outside the configured building.
    InvalidFloor { floor: i32, min: i32, max: i32 },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoCarsAvailable => write!(f, "no cars available"),
            DispatchError::UnknownCar(id) => write!(f, "unknown car {}", id),
            DispatchError::InvalidFloor { floor, min, max } => {
                write!(f, "floor {} outside building bounds [{}, {}]", floor, min, max)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Failures of a request made through a coordinator handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The fleet rejected the request.
    Dispatch(DispatchError),
    /// The coordinator thread is no longer running.
    Disconnected,
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::Dispatch(e) => e.fmt(f),
            CoordinatorError::Disconnected => write!(f, "coordinator is not running"),
        }
    }
}

impl std::error::Error for CoordinatorError {}

impl From<DispatchError> for CoordinatorError {
    fn from(e: DispatchError) -> Self {
        CoordinatorError::Dispatch(e)
    }
}

/// Failures while loading `config.toml` or a scenario file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
