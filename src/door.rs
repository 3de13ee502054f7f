use tokio_util::sync::CancellationToken;

use crate::conf::DOOR_TRANSITION_TIME;
use crate::error::Cancelled;
use crate::timer::pause;

#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
enum DoorState {
    #[default]
    Closed,
    Open,
}

/// Cab door, owned by exactly one elevator worker.
///
/// Both transitions take [`DOOR_TRANSITION_TIME`] and are no-ops when the
/// door is already in the requested state. A transition interrupted by
/// shutdown leaves the state unchanged.
#[derive(Debug, Default)]
pub(crate) struct Door {
    state: DoorState,
}

impl Door {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    /// Returns whether the door actually moved.
    pub(crate) async fn open(&mut self, token: &CancellationToken) -> Result<bool, Cancelled> {
        if self.state == DoorState::Open {
            return Ok(false);
        }
        pause(token, DOOR_TRANSITION_TIME).await?;
        self.state = DoorState::Open;
        Ok(true)
    }

    /// Returns whether the door actually moved.
    pub(crate) async fn close(&mut self, token: &CancellationToken) -> Result<bool, Cancelled> {
        if self.state == DoorState::Closed {
            return Ok(false);
        }
        pause(token, DOOR_TRANSITION_TIME).await?;
        self.state = DoorState::Closed;
        Ok(true)
    }
}
