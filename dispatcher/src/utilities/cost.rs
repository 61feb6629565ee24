/// ----- COST FUNCTION -----
/// Stateless scoring of how well an elevator suits a new request. Lower is
/// better. The dispatcher calls this once per elevator with a snapshot and
/// picks the minimum.

use shared_resources::direction::{Direction, MotionState};
use shared_resources::elevator_status::ElevatorStatus;
use shared_resources::request::Request;

const DISTANCE_COST: i64 = 10;
const IDLE_BONUS: i64 = 50;
const EN_ROUTE_BONUS: i64 = 30;
const REVERSAL_PENALTY: i64 = 100;
const DOORS_OPEN_BONUS: i64 = 1000;
const FULL_PENALTY: i64 = 200;
const ROUTE_ALIGNMENT_BONUS: i64 = 30;

pub fn score(status: &ElevatorStatus, request: &Request, capacity: usize) -> i64 {
    let call_floor = request.call_floor();
    let mut score = DISTANCE_COST * i64::from(status.floor.abs_diff(call_floor));

    if status.is_idle() {
        score -= IDLE_BONUS;
    }

    let en_route = is_en_route(status, request);
    if en_route {
        score -= EN_ROUTE_BONUS;
    }

    if status.direction != Direction::Wait && status.direction != request.direction() {
        score += REVERSAL_PENALTY;
    }

    let doors_open_here = status.floor == call_floor && status.motion == MotionState::DoorsOpen;
    if doors_open_here {
        score -= DOORS_OPEN_BONUS;
    }

    if status.load() >= capacity {
        score += FULL_PENALTY;
    }

    if !en_route && !doors_open_here && status.will_stop_at_floor(call_floor) {
        score -= ROUTE_ALIGNMENT_BONUS;
    }

    score
}

/// Same direction as the request and the call floor not yet passed.
fn is_en_route(status: &ElevatorStatus, request: &Request) -> bool {
    if status.direction != request.direction() {
        return false;
    }
    match status.direction {
        Direction::Up => status.floor <= request.call_floor(),
        Direction::Down => status.floor >= request.call_floor(),
        Direction::Wait => false,
    }
}
