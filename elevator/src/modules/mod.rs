use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::debug;

use shared_resources::config::BuildingConfig;
use shared_resources::elevator_status::ElevatorStatus;
use shared_resources::error::ElevatorError;
use shared_resources::occupancy::FloorOccupancy;
use shared_resources::request::Request;
use shared_resources::state_change::StateChange;
use shared_resources::ElevatorId;

use crate::utilities::elevator_state::ElevatorState;

mod doors;
mod fsm;
pub mod timer;

/// Per-elevator slice of the building configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevatorSettings {
    pub capacity: usize,
    pub total_floors: u8,
    pub floor_travel_time: Duration,
    pub door_open_time: Duration,
    pub idle_poll: Duration,
}

impl ElevatorSettings {
    pub fn from_config(config: &BuildingConfig) -> Self {
        ElevatorSettings {
            capacity: config.elevator_capacity,
            total_floors: config.floors(),
            floor_travel_time: config.floor_travel_time(),
            door_open_time: config.door_open_time(),
            idle_poll: config.idle_poll(),
        }
    }
}

/// Channels and shared state every controller is wired to.
#[derive(Clone)]
pub struct ControllerChannels {
    /// Dropping every sender of this channel stops the controller.
    pub shutdown_rx: Receiver<()>,
    pub state_change_tx: Sender<StateChange>,
    pub occupancy: Arc<FloorOccupancy>,
    /// Receives the elevator id when its loop has returned.
    pub exited_tx: Sender<ElevatorId>,
}

/// Cheap handle to a running elevator. The only way other threads talk to it.
#[derive(Clone)]
pub struct ElevatorHandle {
    id: ElevatorId,
    pending_tx: Sender<Request>,
    queued: Arc<AtomicUsize>,
    status: Arc<RwLock<ElevatorStatus>>,
}

impl ElevatorHandle {
    pub fn id(&self) -> ElevatorId {
        self.id
    }

    /// Adds a request to the elevator's pending queue. Never blocks.
    pub fn enqueue(&self, request: Request) -> Result<(), ElevatorError> {
        self.queued.fetch_add(1, Ordering::SeqCst);
        self.pending_tx.send(request).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            ElevatorError::Stopped { id: self.id }
        })
    }

    /// Latest published snapshot. Requests handed over but not yet seen by
    /// the elevator are counted as pending.
    pub fn status(&self) -> ElevatorStatus {
        // counter first: it only drops after the snapshot holding those
        // requests is published, so the sum never comes out short
        let queued = self.queued.load(Ordering::SeqCst);
        let mut status = self.status.read().clone();
        status.pending_count += queued;
        status
    }
}

/// Starts the control loop of elevator `id` on its own thread, at floor 0
/// and idle.
pub fn spawn(
    id: ElevatorId,
    settings: ElevatorSettings,
    channels: ControllerChannels,
) -> io::Result<(ElevatorHandle, JoinHandle<()>)> {
    let (pending_tx, pending_rx) = unbounded();
    let queued = Arc::new(AtomicUsize::new(0));
    let status = Arc::new(RwLock::new(ElevatorStatus::new(id)));

    let controller = fsm::Controller::new(
        ElevatorState::new(id),
        settings,
        fsm::Inbox { pending_rx, queued: Arc::clone(&queued) },
        channels.shutdown_rx,
        channels.state_change_tx,
        Arc::clone(&status),
        channels.occupancy,
    );
    let exited_tx = channels.exited_tx;

    let join_handle = thread::Builder::new()
        .name(format!("elevator-{}", id))
        .spawn(move || {
            controller.main();
            if exited_tx.send(id).is_err() {
                debug!(elevator = id, "nobody waiting for exit");
            }
        })?;

    Ok((ElevatorHandle { id, pending_tx, queued, status }, join_handle))
}
