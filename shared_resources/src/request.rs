use std::fmt;
use std::time::{Duration, Instant};

use crate::direction::Direction;
use crate::error::RequestError;

/// A passenger's hall call together with the floor they want to reach.
///
/// Requests are plain values: they are copied into an elevator's queues and
/// dropped once the passenger has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request {
    call_floor: u8,
    direction: Direction,
    target_floor: u8,
    created_at: Instant,
}

impl Request {
    pub fn new(
        call_floor: u8,
        direction: Direction,
        target_floor: u8,
        total_floors: u8,
    ) -> Result<Self, RequestError> {
        let request = Request {
            call_floor,
            direction,
            target_floor,
            created_at: Instant::now(),
        };
        request.validate(total_floors)?;
        Ok(request)
    }

    /// Builds a request whose hall direction follows from the two floors.
    pub fn between(call_floor: u8, target_floor: u8, total_floors: u8) -> Result<Self, RequestError> {
        Self::new(
            call_floor,
            Direction::between(call_floor, target_floor),
            target_floor,
            total_floors,
        )
    }

    pub fn validate(&self, total_floors: u8) -> Result<(), RequestError> {
        for floor in [self.call_floor, self.target_floor] {
            if floor >= total_floors {
                return Err(RequestError::InvalidFloor { floor, total_floors });
            }
        }
        if self.call_floor == self.target_floor {
            return Err(RequestError::DegenerateRequest { floor: self.call_floor });
        }
        if Direction::between(self.call_floor, self.target_floor) != self.direction {
            return Err(RequestError::DirectionMismatch {
                call_floor: self.call_floor,
                target_floor: self.target_floor,
                direction: self.direction,
            });
        }
        Ok(())
    }

    pub fn call_floor(&self) -> u8 {
        self.call_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target_floor(&self) -> u8 {
        self.target_floor
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// True if the request stops anywhere near `floor`, as a call or as a target.
    pub fn references(&self, floor: u8) -> bool {
        self.call_floor == floor || self.target_floor == floor
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} ({})",
            self.call_floor,
            self.target_floor,
            self.direction.as_string()
        )
    }
}
