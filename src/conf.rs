use std::time::Duration;

// Floor number, any integer is accepted
pub type TFloor = i32;

// Floor every elevator stands at when the system starts
pub const START_FLOOR: TFloor = 0;

// Lowest floor used when generating random calls
pub const MIN_FLOOR: TFloor = 0;
// Highest floor used when generating random calls
pub const MAX_FLOOR: TFloor = 9;

// Travel time for a single floor, the floor value updates after it elapses
pub const FLOOR_TRAVEL_TIME: Duration = Duration::from_millis(1000);
// Time for the door to open, and again for it to close
pub const DOOR_TRANSITION_TIME: Duration = Duration::from_millis(1500);
// Boarding window while the door stays fully open
pub const DOOR_DWELL_TIME: Duration = Duration::from_millis(2000);

/// Time needed to serve one request from the moment the worker dequeues it,
/// given the number of floors it has to travel.
pub fn service_time(floors: u32) -> Duration {
    FLOOR_TRAVEL_TIME * floors + DOOR_TRANSITION_TIME * 2 + DOOR_DWELL_TIME
}
