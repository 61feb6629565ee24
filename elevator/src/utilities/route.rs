/// ----- ROUTE PLANNING -----
/// Stateless helpers that decide where the elevator goes next. The
/// elevator sweeps in its current direction until nothing is left ahead,
/// then turns around.

use std::collections::BTreeSet;

use shared_resources::direction::Direction;
use shared_resources::request::Request;

use crate::utilities::elevator_state::ActiveRequest;

/// Direction an idle elevator at `floor` takes for its first request.
pub fn initial_direction(floor: u8, request: &Request) -> Direction {
    match Direction::between(floor, request.call_floor()) {
        Direction::Wait => request.direction(),
        direction => direction,
    }
}

/// Every call and target floor of the active set, in sweep order, without
/// the floor the car is standing at.
pub fn plan_route(floor: u8, direction: Direction, active: &[ActiveRequest]) -> Vec<u8> {
    let floors: BTreeSet<u8> = active
        .iter()
        .flat_map(|active| [active.request.call_floor(), active.request.target_floor()])
        .filter(|&f| f != floor)
        .collect();
    match direction {
        Direction::Down => floors.into_iter().rev().collect(),
        Direction::Up | Direction::Wait => floors.into_iter().collect(),
    }
}

pub fn should_stop_at_floor(floor: u8, direction: Direction, candidate: u8) -> bool {
    direction.is_ahead(floor, candidate)
}

/// Nearest floor ahead that some active request still needs.
/// Equal distances (only possible while waiting) resolve to the lower floor.
pub fn next_stop(floor: u8, direction: Direction, active: &[ActiveRequest]) -> Option<u8> {
    active
        .iter()
        .map(ActiveRequest::next_floor)
        .filter(|&candidate| should_stop_at_floor(floor, direction, candidate))
        .min_by_key(|&candidate| (candidate.abs_diff(floor), candidate))
}

/// True if a passenger boards or leaves at `floor`.
pub fn needs_service_here(floor: u8, active: &[ActiveRequest]) -> bool {
    active.iter().any(|active| active.next_floor() == floor)
}

pub fn further_requests_in_direction(floor: u8, direction: Direction, active: &[ActiveRequest]) -> bool {
    match direction {
        Direction::Up | Direction::Down => active
            .iter()
            .any(|active| direction.is_ahead(floor, active.next_floor())),
        Direction::Wait => false,
    }
}

/// Keeps going while there is work ahead, otherwise turns towards the
/// remaining work, otherwise waits.
pub fn next_direction(floor: u8, last_direction: Direction, active: &[ActiveRequest]) -> Direction {
    if further_requests_in_direction(floor, last_direction, active) {
        return last_direction;
    }
    for direction in [Direction::Up, Direction::Down] {
        if direction != last_direction && further_requests_in_direction(floor, direction, active) {
            return direction;
        }
    }
    Direction::Wait
}
