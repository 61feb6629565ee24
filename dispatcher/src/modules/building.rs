/// ----- BUILDING MODULE -----
/// Owns the fleet: starts one controller thread per elevator, hands out the
/// dispatcher and the elevator handles, and stops everything again.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use elevator::{ControllerChannels, ElevatorHandle, ElevatorSettings};
use shared_resources::config::BuildingConfig;
use shared_resources::error::FleetError;
use shared_resources::occupancy::FloorOccupancy;
use shared_resources::state_change::StateChange;
use shared_resources::ElevatorId;

use super::dispatcher::Dispatcher;

/// Which loops reached a safe point in time and which were left behind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub stopped: Vec<ElevatorId>,
    pub abandoned: Vec<ElevatorId>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.abandoned.is_empty()
    }
}

pub struct Building {
    dispatcher: Arc<Dispatcher>,
    occupancy: Arc<FloorOccupancy>,
    threads: Vec<(ElevatorId, JoinHandle<()>)>,
    shutdown_tx: Sender<()>,
    shutdown_rx: Receiver<()>,
    exited_rx: Receiver<ElevatorId>,
    shutdown_timeout: Duration,
}

impl Building {
    /// Starts `elevators_count` elevators with ids `0..n`, all idle at floor 0.
    pub fn start(config: &BuildingConfig, state_change_tx: Sender<StateChange>) -> Result<Self, FleetError> {
        let total_floors = config.floors();
        let settings = ElevatorSettings::from_config(config);
        let occupancy = Arc::new(FloorOccupancy::new(total_floors));

        let (shutdown_tx, shutdown_rx) = unbounded();
        let (exited_tx, exited_rx) = unbounded();

        let mut handles = Vec::with_capacity(config.elevators_count);
        let mut threads = Vec::with_capacity(config.elevators_count);
        for id in 0..config.elevators_count {
            let channels = ControllerChannels {
                shutdown_rx: shutdown_rx.clone(),
                state_change_tx: state_change_tx.clone(),
                occupancy: Arc::clone(&occupancy),
                exited_tx: exited_tx.clone(),
            };
            // on error shutdown_tx is dropped and the elevators started so far stop
            let (handle, thread) = elevator::spawn(id, settings.clone(), channels)?;
            handles.push(handle);
            threads.push((id, thread));
        }

        info!(
            elevators = config.elevators_count,
            floors = total_floors,
            capacity = config.elevator_capacity,
            "building started"
        );

        let dispatcher = Dispatcher::new(handles, total_floors, config.elevator_capacity, Arc::clone(&occupancy));
        Ok(Building {
            dispatcher: Arc::new(dispatcher),
            occupancy,
            threads,
            shutdown_tx,
            shutdown_rx,
            exited_rx,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn elevators(&self) -> &[ElevatorHandle] {
        self.dispatcher.elevators()
    }

    pub fn elevator(&self, id: ElevatorId) -> Result<&ElevatorHandle, FleetError> {
        self.elevators().get(id).ok_or(FleetError::InvalidElevatorId {
            id,
            count: self.elevators().len(),
        })
    }

    pub fn occupancy(&self) -> Arc<FloorOccupancy> {
        Arc::clone(&self.occupancy)
    }

    /// Disconnects when the building shuts down. Other producers, like the
    /// load source, select on this to stop with the fleet.
    pub fn shutdown_signal(&self) -> Receiver<()> {
        self.shutdown_rx.clone()
    }

    /// Signals every loop to stop and waits up to the configured timeout.
    /// Loops that exit in time are joined, the rest are left detached.
    pub fn shutdown(self) -> ShutdownReport {
        let Building { threads, shutdown_tx, exited_rx, shutdown_timeout, .. } = self;
        info!(timeout_ms = shutdown_timeout.as_millis() as u64, "shutting down building");
        drop(shutdown_tx);

        let deadline = Instant::now() + shutdown_timeout;
        let mut exited = Vec::with_capacity(threads.len());
        while exited.len() < threads.len() {
            match exited_rx.recv_deadline(deadline) {
                Ok(id) => exited.push(id),
                Err(_) => break,
            }
        }

        let mut report = ShutdownReport::default();
        for (id, thread) in threads {
            if exited.contains(&id) || thread.is_finished() {
                if thread.join().is_err() {
                    warn!(elevator = id, "elevator thread panicked");
                }
                report.stopped.push(id);
            } else {
                warn!(elevator = id, "elevator did not stop in time, abandoning it");
                report.abandoned.push(id);
            }
        }
        info!(stopped = report.stopped.len(), abandoned = report.abandoned.len(), "building shut down");
        report
    }
}
