pub mod modules;
pub mod utilities;

pub use modules::building::{Building, ShutdownReport};
pub use modules::dispatcher::Dispatcher;
