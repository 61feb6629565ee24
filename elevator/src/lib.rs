pub mod modules;
pub mod utilities;

pub use modules::{spawn, ControllerChannels, ElevatorHandle, ElevatorSettings};
