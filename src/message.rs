//! State-change narration.
//!
//! The core never prints. Every transition worth reporting is turned into an
//! [`Event`] and handed to an [`Observer`]; presentation is the observer's
//! business.

use std::fmt::{Display, Formatter};

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::conf::TFloor;
use crate::request::Request;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    // The system spawned its workers
    SystemStarted { elevators: usize },
    // A hall call was given to an elevator by the assignment policy
    Assigned { elevator: String, request: Request },
    // A request entered an elevator queue
    RequestReceived { elevator: String, request: Request },
    // A worker dequeued a request and starts serving it
    Processing { elevator: String, request: Request },
    // One floor of travel finished
    FloorReached { elevator: String, floor: TFloor },
    DoorOpening { elevator: String, floor: TFloor },
    DoorOpened { elevator: String, floor: TFloor },
    DoorClosing { elevator: String, floor: TFloor },
    DoorClosed { elevator: String, floor: TFloor },
    // The door cycle for a request completed
    Served { elevator: String, request: Request },
    // The control loop exited
    Stopped { elevator: String },
}

impl Event {
    /// Elevator the event belongs to, `None` for system-wide events.
    pub fn elevator(&self) -> Option<&str> {
        use Event::*;
        match self {
            SystemStarted { .. } => None,
            Assigned { elevator, .. }
            | RequestReceived { elevator, .. }
            | Processing { elevator, .. }
            | FloorReached { elevator, .. }
            | DoorOpening { elevator, .. }
            | DoorOpened { elevator, .. }
            | DoorClosing { elevator, .. }
            | DoorClosed { elevator, .. }
            | Served { elevator, .. }
            | Stopped { elevator } => Some(elevator.as_str()),
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Event::*;
        match self {
            SystemStarted { elevators } => {
                write!(f, "Elevator system started with {} elevators", elevators)
            }
            Assigned { elevator, request } => {
                write!(f, "Request for {} assigned to {}", request, elevator)
            }
            RequestReceived { elevator, request } => {
                write!(f, "[{}] Received request for {}", elevator, request)
            }
            Processing { elevator, request } => {
                write!(f, "[{}] Processing request to {}", elevator, request)
            }
            FloorReached { elevator, floor } => write!(f, "[{}] Now at floor {}", elevator, floor),
            DoorOpening { elevator, floor } => {
                write!(f, "[{}] Opening door at floor {}", elevator, floor)
            }
            DoorOpened { elevator, floor } => {
                write!(f, "[{}] Door open at floor {}", elevator, floor)
            }
            DoorClosing { elevator, floor } => {
                write!(f, "[{}] Closing door at floor {}", elevator, floor)
            }
            DoorClosed { elevator, floor } => {
                write!(f, "[{}] Door closed at floor {}", elevator, floor)
            }
            Served { elevator, request } => {
                write!(f, "[{}] Served request to {}", elevator, request)
            }
            Stopped { elevator } => write!(f, "[{}] Elevator stopped", elevator),
        }
    }
}

/// Receives every [`Event`] the system produces.
///
/// Called synchronously from worker tasks and from the dispatcher, so
/// implementations must be cheap and must not block.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Narrates events as `info` lines through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &Event) {
        info!(target: "elevator_dispatch::narration", "{}", event);
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl Observer for NoOpObserver {
    #[inline]
    fn notify(&self, _event: &Event) {}
}

/// Forwards events into a channel. A closed channel is ignored.
impl Observer for UnboundedSender<Event> {
    fn notify(&self, event: &Event) {
        let _ = self.send(event.clone());
    }
}
