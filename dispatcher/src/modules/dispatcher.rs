/// ----- DISPATCHER MODULE -----
/// Routes each new request to exactly one elevator. Scoring reads the
/// elevators' published snapshots; only the scoring and the hand-over are
/// serialized, the elevators keep running while a request is assigned.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use elevator::ElevatorHandle;
use shared_resources::error::DispatchError;
use shared_resources::occupancy::FloorOccupancy;
use shared_resources::request::Request;
use shared_resources::ElevatorId;

use crate::utilities::cost;

pub struct Dispatcher {
    elevators: Vec<ElevatorHandle>,
    total_floors: u8,
    capacity: usize,
    occupancy: Arc<FloorOccupancy>,
    assign_lock: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        elevators: Vec<ElevatorHandle>,
        total_floors: u8,
        capacity: usize,
        occupancy: Arc<FloorOccupancy>,
    ) -> Self {
        Dispatcher {
            elevators,
            total_floors,
            capacity,
            occupancy,
            assign_lock: Mutex::new(()),
        }
    }

    /// Assigns `request` to the elevator with the lowest cost and returns its
    /// id. Safe to call from several threads at once.
    pub fn handle_request(&self, request: Request) -> Result<ElevatorId, DispatchError> {
        if let Err(err) = request.validate(self.total_floors) {
            warn!(request = %request, error = %err, "request rejected");
            return Err(err.into());
        }

        let _guard = self.assign_lock.lock();

        let mut best: Option<(ElevatorId, i64, &ElevatorHandle)> = None;
        for elevator in &self.elevators {
            let status = elevator.status();
            let score = cost::score(&status, &request, self.capacity);
            debug!(elevator = elevator.id(), score, floor = status.floor, "scored");
            // strict comparison keeps the lowest id on ties
            if best.map_or(true, |(_, best_score, _)| score < best_score) {
                best = Some((elevator.id(), score, elevator));
            }
        }
        let Some((id, score, elevator)) = best else {
            warn!(request = %request, "no elevators to dispatch to");
            return Err(DispatchError::NoElevatorsAvailable);
        };

        self.occupancy.add_passenger(request.call_floor());
        if let Err(err) = elevator.enqueue(request) {
            self.occupancy.remove_passenger(request.call_floor());
            warn!(elevator = id, request = %request, "elevator refused request");
            return Err(err.into());
        }

        info!(elevator = id, score, request = %request, "request assigned");
        Ok(id)
    }

    pub fn elevators(&self) -> &[ElevatorHandle] {
        &self.elevators
    }

    pub fn total_floors(&self) -> u8 {
        self.total_floors
    }

    pub fn occupancy(&self) -> &FloorOccupancy {
        &self.occupancy
    }
}
