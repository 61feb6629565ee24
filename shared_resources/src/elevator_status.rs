use crate::direction::{Direction, MotionState};
use crate::request::Request;
use crate::ElevatorId;

/// Point-in-time copy of one elevator's state.
///
/// Published by the elevator's own loop after every change; readers only
/// ever get a clone, never a reference into the live state.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevatorStatus {
    pub id: ElevatorId,
    pub floor: u8,
    pub direction: Direction,
    pub motion: MotionState,
    pub active_requests: Vec<Request>,
    pub pending_count: usize,
    /// Next planned stop, if the elevator is travelling towards one.
    pub heading: Option<u8>,
}

impl ElevatorStatus {
    pub fn new(id: ElevatorId) -> Self {
        ElevatorStatus {
            id,
            floor: 0,
            direction: Direction::Wait,
            motion: MotionState::Stopped,
            active_requests: Vec::new(),
            pending_count: 0,
            heading: None,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_requests.len()
    }

    /// Requests the elevator has taken on, carried or still queued.
    pub fn load(&self) -> usize {
        self.active_requests.len() + self.pending_count
    }

    /// Stopped with nothing to do, not even queued work it has yet to pick up.
    pub fn is_idle(&self) -> bool {
        self.motion == MotionState::Stopped && self.direction == Direction::Wait && self.pending_count == 0
    }

    /// Whether the elevator is already going to pass by `floor`.
    pub fn will_stop_at_floor(&self, floor: u8) -> bool {
        if floor == self.floor {
            return true;
        }
        if self.active_requests.iter().any(|request| request.references(floor)) {
            return true;
        }
        match self.direction {
            Direction::Up => floor > self.floor,
            Direction::Down => floor < self.floor,
            Direction::Wait => false,
        }
    }
}
