pub mod config;
pub mod direction;
pub mod elevator_status;
pub mod error;
pub mod occupancy;
pub mod request;
pub mod state_change;

pub type ElevatorId = usize;
