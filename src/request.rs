use std::fmt::{Display, Formatter};

use crate::conf::TFloor;

/// Travel direction announced by a hall call.
#[derive(Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        })
    }
}

// Where a request came from
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub(crate) enum RequestKind {
    // Cab panel button inside a known elevator
    Internal,
    // Hall call from a floor, not tied to an elevator until assigned
    External(Direction),
}

/// A destination floor, immutable once created.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct Request {
    target_floor: TFloor,
    kind: RequestKind,
}

impl Request {
    pub fn internal(target_floor: TFloor) -> Self {
        Self {
            target_floor,
            kind: RequestKind::Internal,
        }
    }

    pub fn external(target_floor: TFloor, direction: Direction) -> Self {
        Self {
            target_floor,
            kind: RequestKind::External(direction),
        }
    }

    pub fn target_floor(&self) -> TFloor {
        self.target_floor
    }

    /// Direction of a hall call, `None` for cab calls.
    pub fn direction(&self) -> Option<Direction> {
        match self.kind {
            RequestKind::Internal => None,
            RequestKind::External(direction) => Some(direction),
        }
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RequestKind::Internal => write!(f, "floor {} (cab)", self.target_floor),
            RequestKind::External(direction) => {
                write!(f, "floor {} ({})", self.target_floor, direction)
            }
        }
    }
}
