use rand::{thread_rng, Rng};

use crate::conf::{TFloor, MAX_FLOOR, MIN_FLOOR};
use crate::request::Direction;

pub fn random_num(start: TFloor, end: TFloor) -> TFloor {
    thread_rng().gen_range(start..=end)
}

pub fn random_floor() -> TFloor {
    random_num(MIN_FLOOR, MAX_FLOOR)
}

/// Direction a passenger waiting on `floor` could plausibly want.
pub fn random_direction(floor: TFloor) -> Direction {
    if floor <= MIN_FLOOR {
        Direction::Up
    } else if floor >= MAX_FLOOR {
        Direction::Down
    } else if thread_rng().gen_bool(0.5) {
        Direction::Up
    } else {
        Direction::Down
    }
}
