use crate::direction::{Direction, MotionState};
use crate::elevator_status::ElevatorStatus;
use crate::ElevatorId;

/// Notification sent by an elevator on every transition: arrival at a floor,
/// doors opening or closing, and changes of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub elevator_id: ElevatorId,
    pub floor: u8,
    pub target_floor_hint: Option<u8>,
    pub motion: MotionState,
    pub direction: Direction,
}

impl StateChange {
    pub fn from_status(status: &ElevatorStatus) -> Self {
        StateChange {
            elevator_id: status.id,
            floor: status.floor,
            target_floor_hint: status.heading,
            motion: status.motion,
            direction: status.direction,
        }
    }
}
