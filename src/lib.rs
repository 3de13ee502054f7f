//! Multi-elevator dispatch simulation.
//!
//! An [`ElevatorSystem`] owns a fixed fleet of [`Elevator`]s, each driven by
//! its own Tokio task. Hall calls are assigned to the elevator nearest to the
//! calling floor; cab calls go straight to the named elevator. Every worker
//! serves its queue strictly in arrival order, moving one floor per
//! [`FLOOR_TRAVEL_TIME`](conf::FLOOR_TRAVEL_TIME) and running a full door
//! cycle at each stop.

pub mod conf;
mod door;
pub mod elevator;
pub mod error;
pub mod logging;
pub mod message;
pub mod request;
pub mod scheduler;
pub mod state;
mod timer;
pub mod util;

pub use elevator::Elevator;
pub use error::SystemError;
pub use message::{Event, NoOpObserver, Observer, TracingObserver};
pub use request::{Direction, Request};
pub use scheduler::ElevatorSystem;
pub use state::ElevatorState;
