pub mod elevator_state;
pub mod route;
