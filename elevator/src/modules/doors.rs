/// ----- DOORS MODULE -----
/// Keeps the doors open for the configured time. Direction is left as it
/// was so observers can tell which way the car is about to leave.

use tracing::debug;

use shared_resources::direction::MotionState;

use super::fsm::Controller;
use super::timer::{self, Cancelled};

impl Controller {
    pub(crate) fn open_doors(&mut self) -> Result<(), Cancelled> {
        self.set_state(MotionState::DoorsOpen, self.state.direction);
        debug!(elevator = self.state.id, floor = self.state.floor, "doors open");

        timer::sleep(&self.shutdown_rx, self.settings.door_open_time)?;

        debug!(elevator = self.state.id, floor = self.state.floor, "doors closing");
        Ok(())
    }
}
