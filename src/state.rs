use std::fmt::{Display, Formatter};

/// Phase of an elevator control loop.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Copy, Clone, Hash, Default)]
#[repr(u8)]
pub enum ElevatorState {
    // Queue empty, waiting for the next request
    #[default]
    Idle = 0,
    // Travelling towards the target floor
    Moving = 1,
    // Door opening, dwelling and closing
    DoorCycle = 2,
    // Control loop has exited
    Terminated = 3,
}

impl ElevatorState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ElevatorState::Idle,
            1 => ElevatorState::Moving,
            2 => ElevatorState::DoorCycle,
            _ => ElevatorState::Terminated,
        }
    }
}

impl Display for ElevatorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ElevatorState::*;
        write!(f, "{}", match self {
            Idle => "idle",
            Moving => "moving",
            DoorCycle => "door cycle",
            Terminated => "stopped",
        })
    }
}
