use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::conf::{TFloor, DOOR_DWELL_TIME, FLOOR_TRAVEL_TIME, START_FLOOR};
use crate::door::Door;
use crate::error::Cancelled;
use crate::message::{Event, Observer};
use crate::request::Request;
use crate::state::ElevatorState;
use crate::timer::pause;

// Values written only by the worker and read by everybody else
#[derive(Debug)]
struct Published {
    floor: AtomicI32,
    state: AtomicU8,
    door_open: AtomicBool,
}

impl Published {
    fn new() -> Self {
        Self {
            floor: AtomicI32::new(START_FLOOR),
            state: AtomicU8::new(ElevatorState::Idle as u8),
            door_open: AtomicBool::new(false),
        }
    }
}

/// Handle to one elevator and its control loop.
///
/// The handle is the producer side: it enqueues requests and reads the
/// values the worker publishes. Floor, door and state are mutated only by
/// the worker task spawned alongside it. Dropping the handle requests
/// shutdown.
pub struct Elevator {
    id: String,
    requests: UnboundedSender<Request>,
    published: Arc<Published>,
    token: CancellationToken,
    observer: Arc<dyn Observer>,
}

impl Elevator {
    /// Creates the elevator at [`START_FLOOR`] and spawns its worker on `runtime`.
    pub(crate) fn spawn(
        id: String,
        observer: Arc<dyn Observer>,
        runtime: &Handle,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = unbounded_channel();
        let published = Arc::new(Published::new());
        let token = CancellationToken::new();

        let worker = Worker {
            id: id.clone(),
            floor: START_FLOOR,
            door: Door::new(),
            requests: rx,
            published: Arc::clone(&published),
            token: token.clone(),
            observer: Arc::clone(&observer),
        };
        let handle = runtime.spawn(worker.run());

        let elevator = Self {
            id,
            requests: tx,
            published,
            token,
            observer,
        };
        (elevator, handle)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Enqueues `request` behind everything already queued.
    ///
    /// Never blocks. Returns `false` when shutdown has already been
    /// requested, in which case the request is dropped.
    pub fn add_request(&self, request: Request) -> bool {
        self.enqueue(request, None)
    }

    // `announce` goes out ahead of any event the worker emits for the
    // request, and only if the request is accepted.
    pub(crate) fn enqueue(&self, request: Request, announce: Option<Event>) -> bool {
        if self.token.is_cancelled() || self.requests.is_closed() {
            debug!(elevator = %self.id, %request, "elevator stopped, request dropped");
            return false;
        }
        if let Some(event) = announce {
            self.observer.notify(&event);
        }
        self.observer.notify(&Event::RequestReceived {
            elevator: self.id.clone(),
            request,
        });
        if self.requests.send(request).is_err() {
            debug!(elevator = %self.id, %request, "elevator stopped, request dropped");
            return false;
        }
        true
    }

    /// Last floor the worker fully arrived at.
    pub fn current_floor(&self) -> TFloor {
        self.published.floor.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ElevatorState {
        ElevatorState::from_u8(self.published.state.load(Ordering::Acquire))
    }

    pub fn is_door_open(&self) -> bool {
        self.published.door_open.load(Ordering::Acquire)
    }

    /// False once shutdown has been requested.
    pub fn is_operational(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Asks the worker to stop at its next suspension point and returns
    /// immediately. Calling it again has no effect.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            debug!(elevator = %self.id, "shutdown requested");
            self.token.cancel();
        }
    }
}

impl Display for Elevator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Elevator {} (floor {}, {})", self.id, self.current_floor(), self.state())
    }
}

impl Drop for Elevator {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// The control loop. Owns every piece of mutable elevator state.
struct Worker {
    id: String,
    floor: TFloor,
    door: Door,
    requests: UnboundedReceiver<Request>,
    published: Arc<Published>,
    token: CancellationToken,
    observer: Arc<dyn Observer>,
}

impl Worker {
    async fn run(mut self) {
        debug!(elevator = %self.id, "control loop started");
        loop {
            if self.token.is_cancelled() {
                break;
            }
            // Idle is published only while the worker really waits
            let request = match self.requests.try_recv() {
                Ok(request) => request,
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {
                    self.set_state(ElevatorState::Idle);
                    tokio::select! {
                        biased;
                        _ = self.token.cancelled() => break,
                        next = self.requests.recv() => match next {
                            Some(request) => request,
                            None => break,
                        },
                    }
                }
            };
            if self.serve(request).await.is_err() {
                break;
            }
        }
        // Nothing is accepted after this point
        self.requests.close();
        self.set_state(ElevatorState::Terminated);
        debug!(elevator = %self.id, floor = self.floor, "control loop stopped");
        self.emit(Event::Stopped {
            elevator: self.id.clone(),
        });
    }

    async fn serve(&mut self, request: Request) -> Result<(), Cancelled> {
        let target = request.target_floor();
        self.emit(Event::Processing {
            elevator: self.id.clone(),
            request,
        });

        if self.floor != target {
            self.set_state(ElevatorState::Moving);
        }
        while self.floor != target {
            self.step_towards(target).await?;
        }

        self.set_state(ElevatorState::DoorCycle);
        self.door_cycle().await?;

        self.emit(Event::Served {
            elevator: self.id.clone(),
            request,
        });
        Ok(())
    }

    async fn step_towards(&mut self, target: TFloor) -> Result<(), Cancelled> {
        let step = if target > self.floor { 1 } else { -1 };
        pause(&self.token, FLOOR_TRAVEL_TIME).await?;
        self.floor += step;
        self.published.floor.store(self.floor, Ordering::Release);
        self.emit(Event::FloorReached {
            elevator: self.id.clone(),
            floor: self.floor,
        });
        Ok(())
    }

    // Open, dwell, close. Runs in full for every request, including one
    // for the floor the elevator already stands at.
    async fn door_cycle(&mut self) -> Result<(), Cancelled> {
        let floor = self.floor;
        if !self.door.is_open() {
            self.emit(Event::DoorOpening {
                elevator: self.id.clone(),
                floor,
            });
        }
        if self.door.open(&self.token).await? {
            self.published.door_open.store(true, Ordering::Release);
            self.emit(Event::DoorOpened {
                elevator: self.id.clone(),
                floor,
            });
        }

        pause(&self.token, DOOR_DWELL_TIME).await?;

        self.emit(Event::DoorClosing {
            elevator: self.id.clone(),
            floor,
        });
        if self.door.close(&self.token).await? {
            self.published.door_open.store(false, Ordering::Release);
            self.emit(Event::DoorClosed {
                elevator: self.id.clone(),
                floor,
            });
        }
        Ok(())
    }

    fn set_state(&self, state: ElevatorState) {
        self.published.state.store(state as u8, Ordering::Release);
    }

    fn emit(&self, event: Event) {
        self.observer.notify(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{service_time, DOOR_TRANSITION_TIME};
    use crate::request::Direction;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::{sleep, Instant};

    fn start(id: &str) -> (Elevator, JoinHandle<()>, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        let (elevator, handle) = Elevator::spawn(id.to_string(), Arc::new(tx), &Handle::current());
        (elevator, handle, rx)
    }

    async fn next_served(events: &mut UnboundedReceiver<Event>) -> Request {
        loop {
            match events.recv().await.expect("event stream ended") {
                Event::Served { request, .. } => return request,
                _ => continue,
            }
        }
    }

    fn floors_reached(events: &[Event]) -> Vec<TFloor> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::FloorReached { floor, .. } => Some(*floor),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle_on_the_start_floor() {
        let (elevator, _handle, _events) = start("A");
        assert_eq!(elevator.id(), "A");
        assert_eq!(elevator.current_floor(), START_FLOOR);
        assert_eq!(elevator.state(), ElevatorState::Idle);
        assert!(!elevator.is_door_open());
        assert!(elevator.is_operational());
        assert_eq!(elevator.to_string(), "Elevator A (floor 0, idle)");
    }

    #[tokio::test(start_paused = true)]
    async fn requests_are_served_in_arrival_order() {
        let (elevator, _handle, mut events) = start("A");
        let floors = [4, 1, 6, 2, -3, 5];
        for floor in floors {
            elevator.add_request(Request::internal(floor));
        }
        for floor in floors {
            assert_eq!(next_served(&mut events).await.target_floor(), floor);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn moves_one_floor_at_a_time() {
        let (elevator, _handle, mut events) = start("A");
        elevator.add_request(Request::external(3, Direction::Up));
        elevator.add_request(Request::internal(1));

        let mut trace = Vec::new();
        let mut served = 0;
        while served < 2 {
            let event = events.recv().await.unwrap();
            if matches!(event, Event::Served { .. }) {
                served += 1;
            }
            trace.push(event);
        }
        assert_eq!(floors_reached(&trace), vec![1, 2, 3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn floor_updates_after_the_travel_time() {
        let (elevator, _handle, _events) = start("A");
        elevator.add_request(Request::internal(2));

        sleep(FLOOR_TRAVEL_TIME / 2).await;
        assert_eq!(elevator.current_floor(), 0);
        assert_eq!(elevator.state(), ElevatorState::Moving);

        sleep(FLOOR_TRAVEL_TIME).await;
        assert_eq!(elevator.current_floor(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn door_cycle_runs_even_without_travel() {
        let (elevator, _handle, mut events) = start("A");
        let start_time = Instant::now();
        elevator.add_request(Request::internal(START_FLOOR));

        let mut trace = Vec::new();
        loop {
            let event = events.recv().await.unwrap();
            let done = matches!(event, Event::Served { .. });
            trace.push(event);
            if done {
                break;
            }
        }
        assert!(start_time.elapsed() >= service_time(0));

        let lines: Vec<String> = trace.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "[A] Received request for floor 0 (cab)",
                "[A] Processing request to floor 0 (cab)",
                "[A] Opening door at floor 0",
                "[A] Door open at floor 0",
                "[A] Closing door at floor 0",
                "[A] Door closed at floor 0",
                "[A] Served request to floor 0 (cab)",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn door_is_open_during_dwell() {
        let (elevator, _handle, _events) = start("A");
        elevator.add_request(Request::internal(0));

        sleep(DOOR_TRANSITION_TIME + Duration::from_millis(500)).await;
        assert!(elevator.is_door_open());
        assert_eq!(elevator.state(), ElevatorState::DoorCycle);

        sleep(service_time(0)).await;
        assert!(!elevator.is_door_open());
        assert_eq!(elevator.state(), ElevatorState::Idle);
    }

    // Records the published state each time a request starts processing
    #[derive(Default)]
    struct StateAtProcessing {
        published: Mutex<Option<Arc<Published>>>,
        seen: Mutex<Vec<ElevatorState>>,
    }

    impl Observer for StateAtProcessing {
        fn notify(&self, event: &Event) {
            if let Event::Processing { .. } = event {
                if let Some(published) = self.published.lock().unwrap().as_ref() {
                    let state = ElevatorState::from_u8(published.state.load(Ordering::Acquire));
                    self.seen.lock().unwrap().push(state);
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_requests_never_report_idle() {
        let recorder = Arc::new(StateAtProcessing::default());
        let (elevator, _handle) = Elevator::spawn("A".into(), recorder.clone(), &Handle::current());
        *recorder.published.lock().unwrap() = Some(Arc::clone(&elevator.published));

        elevator.add_request(Request::internal(0));
        elevator.add_request(Request::internal(0));
        sleep(service_time(0) * 2 + Duration::from_secs(1)).await;

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![ElevatorState::Idle, ElevatorState::DoorCycle]);
        assert_eq!(elevator.state(), ElevatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stays_on_the_served_floor() {
        let (elevator, _handle, mut events) = start("A");
        elevator.add_request(Request::internal(4));
        next_served(&mut events).await;
        assert_eq!(elevator.current_floor(), 4);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(elevator.current_floor(), 4);
        assert_eq!(elevator.state(), ElevatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_travel() {
        let (elevator, handle, mut events) = start("A");
        elevator.add_request(Request::internal(10));

        sleep(FLOOR_TRAVEL_TIME * 2 + FLOOR_TRAVEL_TIME / 2).await;
        let stop_requested = Instant::now();
        elevator.shutdown();
        assert!(!elevator.is_operational());

        handle.await.unwrap();
        assert!(stop_requested.elapsed() < FLOOR_TRAVEL_TIME);
        assert_eq!(elevator.current_floor(), 2);
        assert_eq!(elevator.state(), ElevatorState::Terminated);

        let mut last = None;
        while let Ok(event) = events.try_recv() {
            last = Some(event);
        }
        assert_eq!(
            last,
            Some(Event::Stopped {
                elevator: "A".into()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_twice_is_harmless() {
        let (elevator, handle, _events) = start("A");
        elevator.shutdown();
        elevator.shutdown();
        handle.await.unwrap();
        elevator.shutdown();
        assert!(!elevator.is_operational());
        assert_eq!(elevator.state(), ElevatorState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_requests_never_start_after_shutdown() {
        let (elevator, handle, mut events) = start("A");
        assert!(elevator.add_request(Request::internal(0)));
        assert!(elevator.add_request(Request::internal(5)));

        sleep(DOOR_TRANSITION_TIME / 2).await;
        elevator.shutdown();
        handle.await.unwrap();

        let mut processing = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, Event::Processing { .. }) {
                processing += 1;
            }
        }
        assert_eq!(processing, 1);
        assert_eq!(elevator.current_floor(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_after_stop_are_dropped() {
        let (elevator, handle, mut events) = start("A");
        elevator.shutdown();
        handle.await.unwrap();
        while events.try_recv().is_ok() {}

        assert!(!elevator.add_request(Request::internal(3)));
        sleep(Duration::from_secs(10)).await;
        assert_eq!(elevator.current_floor(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_worker() {
        let (elevator, handle, _events) = start("A");
        elevator.add_request(Request::internal(8));
        sleep(FLOOR_TRAVEL_TIME).await;
        drop(elevator);
        handle.await.unwrap();
    }
}
