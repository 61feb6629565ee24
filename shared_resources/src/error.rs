//! Error types shared by every crate of the building.

use std::io;

use crate::direction::Direction;
use crate::ElevatorId;

/// Why a request was refused before it reached any elevator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("floor {floor} is outside the building (0..{total_floors})")]
    InvalidFloor { floor: u8, total_floors: u8 },

    #[error("call floor and target floor are both {floor}")]
    DegenerateRequest { floor: u8 },

    #[error("hall direction {direction:?} does not lead from floor {call_floor} to floor {target_floor}")]
    DirectionMismatch {
        call_floor: u8,
        target_floor: u8,
        direction: Direction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElevatorError {
    /// The execution loop of this elevator has exited and no longer accepts work.
    #[error("elevator {id} is stopped")]
    Stopped { id: ElevatorId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("request rejected: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("no elevators available")]
    NoElevatorsAvailable,

    #[error("could not hand over request: {0}")]
    ElevatorStopped(#[from] ElevatorError),
}

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// A collaborator referenced an elevator that does not exist.
    #[error("elevator id {id} is out of range (fleet has {count})")]
    InvalidElevatorId { id: ElevatorId, count: usize },

    #[error("failed to spawn elevator thread: {0}")]
    Spawn(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
