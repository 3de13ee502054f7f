use std::collections::HashSet;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::conf::TFloor;
use crate::elevator::Elevator;
use crate::error::SystemError;
use crate::message::{Event, Observer, TracingObserver};
use crate::request::{Direction, Request};

/// Index of the floor closest to `target`. Ties go to the lowest index.
///
/// Direction, queue depth and whether a candidate is heading away are
/// deliberately not considered.
pub fn nearest<I>(floors: I, target: TFloor) -> Option<usize>
where
    I: IntoIterator<Item = TFloor>,
{
    floors
        .into_iter()
        .enumerate()
        .min_by_key(|(_, floor)| floor.abs_diff(target))
        .map(|(index, _)| index)
}

/// Dispatcher owning a fixed fleet of elevators.
///
/// Construction spawns one worker per elevator right away. The dispatcher
/// has no task of its own: every method runs on the caller and at most
/// enqueues work.
pub struct ElevatorSystem {
    elevators: Vec<Elevator>,
    handles: Vec<JoinHandle<()>>,
    observer: Arc<dyn Observer>,
}

impl ElevatorSystem {
    /// Starts a system narrating through [`TracingObserver`].
    pub fn new<I, S>(ids: I) -> Result<Self, SystemError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_observer(ids, Arc::new(TracingObserver))
    }

    /// Starts a system whose events all go to `observer`.
    ///
    /// Fails on an empty or duplicated id list, or when called outside a
    /// Tokio runtime. Nothing is spawned when it fails.
    pub fn with_observer<I, S>(ids: I, observer: Arc<dyn Observer>) -> Result<Self, SystemError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(SystemError::NoElevators);
        }
        {
            let mut seen = HashSet::with_capacity(ids.len());
            for id in &ids {
                if !seen.insert(id.as_str()) {
                    return Err(SystemError::DuplicateElevator(id.clone()));
                }
            }
        }
        let runtime = Handle::try_current()?;

        let mut elevators = Vec::with_capacity(ids.len());
        let mut handles = Vec::with_capacity(ids.len());
        for id in ids {
            let (elevator, handle) = Elevator::spawn(id, Arc::clone(&observer), &runtime);
            elevators.push(elevator);
            handles.push(handle);
        }

        info!(elevators = elevators.len(), "elevator system started");
        observer.notify(&Event::SystemStarted {
            elevators: elevators.len(),
        });
        Ok(Self {
            elevators,
            handles,
            observer,
        })
    }

    /// Hands a hall call to the elevator nearest to `target_floor` right now.
    ///
    /// The assignment is narrated only if the chosen elevator still accepts
    /// requests.
    pub fn request_elevator(&self, target_floor: TFloor, direction: Direction) -> &Elevator {
        let request = Request::external(target_floor, direction);
        let elevator = self.nearest_elevator(target_floor);
        let assigned = Event::Assigned {
            elevator: elevator.id().to_string(),
            request,
        };
        elevator.enqueue(request, Some(assigned));
        elevator
    }

    /// Sends a cab call straight to the named elevator.
    pub fn send_internal_request(
        &self,
        target_floor: TFloor,
        elevator_id: &str,
    ) -> Result<&Elevator, SystemError> {
        let elevator = self.lookup(elevator_id)?;
        elevator.add_request(Request::internal(target_floor));
        Ok(elevator)
    }

    pub fn current_floor(&self, elevator_id: &str) -> Result<TFloor, SystemError> {
        Ok(self.lookup(elevator_id)?.current_floor())
    }

    /// Requests shutdown of every elevator without waiting for the workers.
    pub fn shutdown(&self) {
        if self.elevators.iter().any(Elevator::is_operational) {
            info!("shutting down elevator system");
        }
        for elevator in &self.elevators {
            elevator.shutdown();
        }
    }

    /// Waits until every worker has exited. Workers only exit after
    /// [`shutdown`](Self::shutdown), so call that first.
    pub async fn join(mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("elevator worker ended abnormally: {}", e);
            }
        }
    }

    pub fn elevator(&self, elevator_id: &str) -> Option<&Elevator> {
        self.elevators.iter().find(|e| e.id() == elevator_id)
    }

    /// Elevators in registration order.
    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    fn nearest_elevator(&self, target_floor: TFloor) -> &Elevator {
        let index = nearest(self.elevators.iter().map(Elevator::current_floor), target_floor);
        &self.elevators[index.unwrap_or(0)]
    }

    fn lookup(&self, elevator_id: &str) -> Result<&Elevator, SystemError> {
        self.elevator(elevator_id)
            .ok_or_else(|| SystemError::UnknownElevator(elevator_id.to_string()))
    }
}

impl Drop for ElevatorSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
