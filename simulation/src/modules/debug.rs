use std::io::{stdout, Stdout, Write};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, Receiver};
use crossterm::{cursor, terminal, ExecutableCommand, Result};
use tracing::{debug, error};

use shared_resources::elevator_status::ElevatorStatus;
use shared_resources::error::FleetError;
use shared_resources::occupancy::FloorOccupancy;
use shared_resources::state_change::StateChange;

const REDRAW_PERIOD: Duration = Duration::from_millis(500);

/// Terminal table of every elevator and the waiting passengers per floor,
/// redrawn in place.
pub struct Board {
    stdout: Stdout,
    total_floors: u8,
    elevators: Vec<StateChange>,
    occupancy: Arc<FloorOccupancy>,
    drawn_lines: u16,
}

impl Board {
    pub fn new(total_floors: u8, elevators_count: usize, occupancy: Arc<FloorOccupancy>) -> Self {
        Board {
            stdout: stdout(),
            total_floors,
            elevators: (0..elevators_count)
                .map(|id| StateChange::from_status(&ElevatorStatus::new(id)))
                .collect(),
            occupancy,
            drawn_lines: 0,
        }
    }

    pub fn apply(&mut self, change: StateChange) -> std::result::Result<(), FleetError> {
        let count = self.elevators.len();
        let slot = self
            .elevators
            .get_mut(change.elevator_id)
            .ok_or(FleetError::InvalidElevatorId { id: change.elevator_id, count })?;
        *slot = change;
        Ok(())
    }

    fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(String::from("+-------+------------+------------+------------+------------+"));
        lines.push(String::from("| ELEVATORS                                                 |"));
        lines.push(String::from("+-------+------------+------------+------------+------------+"));
        lines.push(format!(
            "| {0:<5} | {1:<10} | {2:<10} | {3:<10} | {4:<10} |",
            "ID", "FLOOR", "STATE", "DIRECTION", "HEADING"
        ));
        for elevator in &self.elevators {
            let heading = elevator.target_floor_hint.map_or(String::from("-"), |floor| floor.to_string());
            lines.push(String::from("+-------+------------+------------+------------+------------+"));
            lines.push(format!(
                "| {0:<5} | {1:<10} | {2:<10} | {3:<10} | {4:<10} |",
                elevator.elevator_id,
                elevator.floor,
                elevator.motion.as_string(),
                elevator.direction.as_string(),
                heading
            ));
        }
        lines.push(String::from("+-------+------------+------------+------------+------------+"));
        lines.push(String::new());

        lines.push(String::from("+------------+------------+------------------------+"));
        lines.push(String::from("| FLOORS                                          |"));
        lines.push(String::from("+------------+------------+------------------------+"));
        lines.push(format!("| {0:<10} | {1:<10} | {2:<22} |", "FLOOR", "WAITING", "ELEVATORS"));
        for floor in (0..self.total_floors).rev() {
            let here: Vec<String> = self
                .elevators
                .iter()
                .filter(|elevator| elevator.floor == floor)
                .map(|elevator| elevator.elevator_id.to_string())
                .collect();
            lines.push(String::from("+------------+------------+------------------------+"));
            lines.push(format!(
                "| {0:<10} | {1:<10} | {2:<22} |",
                floor,
                self.occupancy.passenger_count(floor),
                here.join(" ")
            ));
        }
        lines.push(String::from("+------------+------------+------------------------+"));
        lines
    }

    pub fn printstatus(&mut self) -> Result<()> {
        if self.drawn_lines > 0 {
            self.stdout.execute(cursor::MoveUp(self.drawn_lines))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

        let lines = self.render();
        for line in &lines {
            writeln!(self.stdout, "{}", line)?;
        }
        self.stdout.flush()?;
        self.drawn_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        Ok(())
    }
}

pub fn main(mut board: Board, state_change_rx: Receiver<StateChange>, shutdown_rx: Receiver<()>) {
    loop {
        select! {
            recv(state_change_rx) -> msg => match msg {
                Ok(change) => {
                    if let Err(err) = board.apply(change) {
                        error!(error = %err, "state change from unknown elevator");
                        continue;
                    }
                },
                Err(_) => break,
            },
            recv(shutdown_rx) -> _ => break,
            default(REDRAW_PERIOD) => {},
        }
        if let Err(err) = board.printstatus() {
            debug!(error = %err, "failed to draw status board");
        }
    }
}
