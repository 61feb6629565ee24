use std::collections::VecDeque;

use shared_resources::direction::{Direction, MotionState};
use shared_resources::elevator_status::ElevatorStatus;
use shared_resources::request::Request;
use shared_resources::ElevatorId;

/// A request the elevator has claimed for its current route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRequest {
    pub request: Request,
    pub boarded: bool,
}

impl ActiveRequest {
    pub fn waiting(request: Request) -> Self {
        ActiveRequest { request, boarded: false }
    }

    pub fn on_board(request: Request) -> Self {
        ActiveRequest { request, boarded: true }
    }

    /// The floor this request still needs the car at.
    pub fn next_floor(&self) -> u8 {
        if self.boarded {
            self.request.target_floor()
        } else {
            self.request.call_floor()
        }
    }
}

/// What happened to the active set while the car stood at a floor.
#[derive(Debug, Default, PartialEq)]
pub struct StopOutcome {
    pub delivered: Vec<Request>,
    pub boarded: Vec<Request>,
}

impl StopOutcome {
    pub fn is_empty(&self) -> bool {
        self.delivered.is_empty() && self.boarded.is_empty()
    }
}

/// Mutable state of one elevator. Only the elevator's own loop holds this.
#[derive(Debug)]
pub struct ElevatorState {
    pub id: ElevatorId,
    pub floor: u8,
    pub direction: Direction,
    pub motion: MotionState,
    pub active: Vec<ActiveRequest>,
    pub pending: VecDeque<Request>,
    pub heading: Option<u8>,
}

impl ElevatorState {
    pub fn new(id: ElevatorId) -> Self {
        ElevatorState {
            id,
            floor: 0,
            direction: Direction::Wait,
            motion: MotionState::Stopped,
            active: Vec::new(),
            pending: VecDeque::new(),
            heading: None,
        }
    }

    pub fn status(&self) -> ElevatorStatus {
        ElevatorStatus {
            id: self.id,
            floor: self.floor,
            direction: self.direction,
            motion: self.motion,
            active_requests: self.active.iter().map(|active| active.request).collect(),
            pending_count: self.pending.len(),
            heading: self.heading,
        }
    }

    /// Moves pending requests waiting at the current floor into the active set.
    ///
    /// A request qualifies when it travels the way the car is going (any
    /// way if the car is waiting) and there is room left. Returns the
    /// requests that boarded, in queue order.
    pub fn take_pickups(&mut self, direction: Direction, capacity: usize) -> Vec<Request> {
        let mut picked = Vec::new();
        let mut remaining = VecDeque::with_capacity(self.pending.len());

        while let Some(request) = self.pending.pop_front() {
            let matches = request.call_floor() == self.floor
                && (request.direction() == direction || direction == Direction::Wait);
            if matches && self.active.len() < capacity {
                self.active.push(ActiveRequest::on_board(request));
                picked.push(request);
            } else {
                remaining.push_back(request);
            }
        }
        self.pending = remaining;
        picked
    }

    /// Completes deliveries and boards waiting passengers at the current floor.
    pub fn serve_floor(&mut self) -> StopOutcome {
        let floor = self.floor;
        let mut outcome = StopOutcome::default();

        self.active.retain_mut(|active| {
            if active.boarded && active.request.target_floor() == floor {
                outcome.delivered.push(active.request);
                return false;
            }
            if !active.boarded && active.request.call_floor() == floor {
                active.boarded = true;
                outcome.boarded.push(active.request);
            }
            true
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(call: u8, target: u8) -> Request {
        Request::between(call, target, 15).unwrap()
    }

    #[test]
    fn pickups_respect_direction_and_floor() {
        let mut state = ElevatorState::new(0);
        state.floor = 5;
        state.pending.push_back(request(5, 9));
        state.pending.push_back(request(5, 1));
        state.pending.push_back(request(6, 9));

        let picked = state.take_pickups(Direction::Up, 8);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].target_floor(), 9);
        assert_eq!(state.pending.len(), 2);
        assert!(state.active[0].boarded);
    }

    #[test]
    fn waiting_car_takes_either_direction() {
        let mut state = ElevatorState::new(0);
        state.floor = 5;
        state.pending.push_back(request(5, 9));
        state.pending.push_back(request(5, 1));

        assert_eq!(state.take_pickups(Direction::Wait, 8).len(), 2);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn pickups_stop_at_capacity() {
        let mut state = ElevatorState::new(0);
        state.floor = 3;
        state.active.push(ActiveRequest::on_board(request(1, 10)));
        for target in 4..8 {
            state.pending.push_back(request(3, target));
        }

        let picked = state.take_pickups(Direction::Up, 3);
        assert_eq!(picked.len(), 2);
        assert_eq!(state.active.len(), 3);
        assert_eq!(state.pending.len(), 2);
        assert_eq!(state.pending[0].target_floor(), 6);
    }

    #[test]
    fn serve_floor_delivers_only_boarded_passengers() {
        let mut state = ElevatorState::new(0);
        state.floor = 4;
        state.active.push(ActiveRequest::on_board(request(1, 4)));
        state.active.push(ActiveRequest::waiting(request(8, 4)));
        state.active.push(ActiveRequest::waiting(request(4, 12)));

        let outcome = state.serve_floor();
        assert_eq!(outcome.delivered.len(), 1);
        assert_eq!(outcome.delivered[0].call_floor(), 1);
        assert_eq!(outcome.boarded.len(), 1);
        assert_eq!(outcome.boarded[0].target_floor(), 12);
        assert_eq!(state.active.len(), 2);
        assert!(!state.active[0].boarded);
        assert!(state.active[1].boarded);
    }

    #[test]
    fn status_is_a_copy() {
        let mut state = ElevatorState::new(2);
        state.active.push(ActiveRequest::waiting(request(3, 7)));
        let status = state.status();
        state.active.clear();
        assert_eq!(status.id, 2);
        assert_eq!(status.active_count(), 1);
    }
}
