/// ----- FSM MODULE -----
/// This module is the execution loop driving one elevator. It takes
/// requests off the pending queue, sweeps up and down serving them, picks
/// up passengers it passes on the way and publishes its state after every
/// change.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{select, Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_resources::direction::{Direction, MotionState};
use shared_resources::elevator_status::ElevatorStatus;
use shared_resources::occupancy::FloorOccupancy;
use shared_resources::request::Request;
use shared_resources::state_change::StateChange;

use super::timer::{self, Cancelled};
use super::ElevatorSettings;
use crate::utilities::elevator_state::{ActiveRequest, ElevatorState};
use crate::utilities::route;

/// How a leg of travel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Leg {
    Arrived,
    /// Stopped short to pick somebody up; the route must be planned again.
    PickedUp,
}

/// Receiving end of an elevator's pending queue.
///
/// `queued` counts requests handed over but not yet part of a published
/// snapshot. It is decremented only after that snapshot is out, so readers
/// of the handle never see a request vanish in between.
pub(crate) struct Inbox {
    pub(crate) pending_rx: Receiver<Request>,
    pub(crate) queued: Arc<AtomicUsize>,
}

impl Inbox {
    fn published(&self, count: usize) {
        let _ = self
            .queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(count)));
    }
}

pub(crate) struct Controller {
    pub(crate) state: ElevatorState,
    pub(crate) settings: ElevatorSettings,
    pub(crate) inbox: Inbox,
    pub(crate) shutdown_rx: Receiver<()>,
    pub(crate) state_change_tx: Sender<StateChange>,
    pub(crate) status: Arc<RwLock<ElevatorStatus>>,
    pub(crate) occupancy: Arc<FloorOccupancy>,
    last_change: Option<StateChange>,
}

impl Controller {
    pub(crate) fn new(
        state: ElevatorState,
        settings: ElevatorSettings,
        inbox: Inbox,
        shutdown_rx: Receiver<()>,
        state_change_tx: Sender<StateChange>,
        status: Arc<RwLock<ElevatorStatus>>,
        occupancy: Arc<FloorOccupancy>,
    ) -> Self {
        Controller {
            state,
            settings,
            inbox,
            shutdown_rx,
            state_change_tx,
            status,
            occupancy,
            last_change: None,
        }
    }

    /// Runs until the shutdown signal arrives.
    pub(crate) fn main(mut self) {
        info!(elevator = self.state.id, "elevator started");
        self.publish();
        while self.cycle().is_ok() {}
        info!(
            elevator = self.state.id,
            floor = self.state.floor,
            active = self.state.active.len(),
            "elevator stopped"
        );
    }

    /// One pass of the loop: wait for work if there is none, then drive the
    /// route until the active set is empty.
    pub(crate) fn cycle(&mut self) -> Result<(), Cancelled> {
        if self.state.active.is_empty() {
            match self.wait_for_request()? {
                Some(request) => self.activate(request),
                None => {
                    self.set_state(MotionState::Stopped, Direction::Wait);
                    return Ok(());
                }
            }
        }
        self.execute_route()
    }

    fn wait_for_request(&mut self) -> Result<Option<Request>, Cancelled> {
        if let Some(request) = self.state.pending.pop_front() {
            return Ok(Some(request));
        }
        select! {
            recv(self.shutdown_rx) -> _ => Err(Cancelled),
            recv(self.inbox.pending_rx) -> msg => match msg {
                Ok(request) => {
                    self.state.pending.push_back(request);
                    self.publish();
                    self.inbox.published(1);
                    Ok(self.state.pending.pop_front())
                }
                // every handle is gone, nobody can give us work anymore
                Err(_) => Err(Cancelled),
            },
            default(self.settings.idle_poll) => Ok(None),
        }
    }

    fn activate(&mut self, request: Request) {
        self.state.direction = route::initial_direction(self.state.floor, &request);
        self.state.active.push(ActiveRequest::waiting(request));
        info!(
            elevator = self.state.id,
            floor = self.state.floor,
            request = %request,
            direction = ?self.state.direction,
            "new route"
        );
        self.publish();
    }

    pub(crate) fn execute_route(&mut self) -> Result<(), Cancelled> {
        debug!(
            elevator = self.state.id,
            route = ?route::plan_route(self.state.floor, self.state.direction, &self.state.active),
            "route planned"
        );

        while !self.state.active.is_empty() {
            if timer::is_cancelled(&self.shutdown_rx) {
                return Err(Cancelled);
            }

            if route::needs_service_here(self.state.floor, &self.state.active) {
                self.serve_stop()?;
                continue;
            }

            let next_stop = route::next_stop(self.state.floor, self.state.direction, &self.state.active)
                .or_else(|| {
                    self.state.direction =
                        route::next_direction(self.state.floor, self.state.direction, &self.state.active);
                    route::next_stop(self.state.floor, self.state.direction, &self.state.active)
                });
            let Some(next_stop) = next_stop else {
                warn!(elevator = self.state.id, floor = self.state.floor, "active requests but no stop ahead");
                timer::sleep(&self.shutdown_rx, self.settings.idle_poll)?;
                return Ok(());
            };

            if self.travel_to(next_stop)? == Leg::Arrived {
                self.serve_stop()?;
            }
        }

        self.state.heading = None;
        self.set_state(MotionState::Stopped, Direction::Wait);
        Ok(())
    }

    /// Moves one floor at a time towards `target`. Before each step the
    /// pending queue is checked for passengers waiting right here.
    pub(crate) fn travel_to(&mut self, target: u8) -> Result<Leg, Cancelled> {
        let direction = Direction::between(self.state.floor, target);
        self.state.heading = Some(target);
        self.set_state(MotionState::Moving, direction);

        while self.state.floor != target {
            if self.pick_up_here()? {
                return Ok(Leg::PickedUp);
            }

            timer::sleep(&self.shutdown_rx, self.settings.floor_travel_time)?;

            self.state.floor = match direction {
                Direction::Up => self.state.floor + 1,
                Direction::Down => self.state.floor - 1,
                Direction::Wait => self.state.floor,
            };
            debug!(elevator = self.state.id, floor = self.state.floor, "passing floor");
            self.publish();
        }
        Ok(Leg::Arrived)
    }

    /// Unscheduled stop for pending requests at the current floor.
    fn pick_up_here(&mut self) -> Result<bool, Cancelled> {
        self.drain_pending();
        let picked = self.state.take_pickups(self.state.direction, self.settings.capacity);
        if picked.is_empty() {
            return Ok(false);
        }

        if self.state.direction == Direction::Wait {
            self.state.direction = Direction::between(self.state.floor, picked[0].target_floor());
        }
        self.board(&picked);
        self.open_doors()?;
        Ok(true)
    }

    /// Planned stop: let passengers out, let waiting ones in, decide where to
    /// go next and take along anyone queued here who goes the same way.
    pub(crate) fn serve_stop(&mut self) -> Result<(), Cancelled> {
        self.state.heading = None;
        let outcome = self.state.serve_floor();
        for request in &outcome.delivered {
            info!(
                elevator = self.state.id,
                floor = self.state.floor,
                request = %request,
                waited_ms = request.age().as_millis() as u64,
                "passenger delivered"
            );
        }
        self.board(&outcome.boarded);

        self.state.direction = route::next_direction(self.state.floor, self.state.direction, &self.state.active);

        self.drain_pending();
        let picked = self.state.take_pickups(self.state.direction, self.settings.capacity);
        if self.state.direction == Direction::Wait {
            if let Some(first) = picked.first() {
                self.state.direction = Direction::between(self.state.floor, first.target_floor());
            }
        }
        self.board(&picked);

        // the next leg or the end of the route publishes what follows the doors
        if !outcome.is_empty() || !picked.is_empty() {
            self.open_doors()?;
        }
        Ok(())
    }

    fn board(&self, requests: &[Request]) {
        for request in requests {
            self.occupancy.remove_passenger(request.call_floor());
            info!(
                elevator = self.state.id,
                floor = self.state.floor,
                request = %request,
                "passenger boarded"
            );
        }
    }

    fn drain_pending(&mut self) {
        let before = self.state.pending.len();
        self.state.pending.extend(self.inbox.pending_rx.try_iter());
        let moved = self.state.pending.len() - before;
        if moved > 0 {
            self.publish();
            self.inbox.published(moved);
        }
    }

    pub(crate) fn set_state(&mut self, motion: MotionState, direction: Direction) {
        self.state.motion = motion;
        self.state.direction = direction;
        self.publish();
    }

    /// Replaces the shared snapshot and notifies observers if anything they
    /// can see has changed.
    pub(crate) fn publish(&mut self) {
        let status = self.state.status();
        let change = StateChange::from_status(&status);
        *self.status.write() = status;

        if self.last_change != Some(change) {
            self.last_change = Some(change);
            if self.state_change_tx.send(change).is_err() {
                debug!(elevator = self.state.id, "no state change observer");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::{unbounded, Sender};

    use super::*;

    struct Rig {
        controller: Controller,
        pending_tx: Sender<Request>,
        shutdown_tx: Sender<()>,
        changes: Receiver<StateChange>,
    }

    fn rig(capacity: usize) -> Rig {
        let (pending_tx, pending_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        let (state_change_tx, changes) = unbounded();
        let settings = ElevatorSettings {
            capacity,
            total_floors: 15,
            floor_travel_time: Duration::ZERO,
            door_open_time: Duration::ZERO,
            idle_poll: Duration::from_millis(5),
        };
        let controller = Controller::new(
            ElevatorState::new(0),
            settings,
            Inbox { pending_rx, queued: Arc::new(AtomicUsize::new(0)) },
            shutdown_rx,
            state_change_tx,
            Arc::new(RwLock::new(ElevatorStatus::new(0))),
            Arc::new(FloorOccupancy::new(15)),
        );
        Rig { controller, pending_tx, shutdown_tx, changes }
    }

    fn request(call: u8, target: u8) -> Request {
        Request::between(call, target, 15).unwrap()
    }

    fn door_floors(changes: &Receiver<StateChange>) -> Vec<u8> {
        changes
            .try_iter()
            .filter(|change| change.motion == MotionState::DoorsOpen)
            .map(|change| change.floor)
            .collect()
    }

    #[test]
    fn serves_a_single_request_from_idle() {
        let mut rig = rig(8);
        rig.pending_tx.send(request(4, 10)).unwrap();

        rig.controller.cycle().unwrap();

        assert_eq!(door_floors(&rig.changes), vec![4, 10]);
        assert_eq!(rig.controller.state.floor, 10);
        assert!(rig.controller.state.active.is_empty());
        assert_eq!(rig.controller.state.motion, MotionState::Stopped);
        assert_eq!(rig.controller.state.direction, Direction::Wait);
    }

    #[test]
    fn floors_change_one_at_a_time() {
        let mut rig = rig(8);
        rig.pending_tx.send(request(3, 0)).unwrap();

        rig.controller.cycle().unwrap();

        let floors: Vec<u8> = rig.changes.try_iter().map(|change| change.floor).collect();
        for pair in floors.windows(2) {
            assert!(pair[0].abs_diff(pair[1]) <= 1, "jumped from {} to {}", pair[0], pair[1]);
        }
        assert_eq!(rig.controller.state.floor, 0);
    }

    #[test]
    fn picks_up_on_the_way_without_turning() {
        let mut rig = rig(8);
        rig.controller.state.floor = 2;
        rig.controller.state.direction = Direction::Up;
        rig.controller.state.active.push(ActiveRequest::on_board(request(2, 8)));
        rig.controller.state.pending.push_back(request(5, 9));

        rig.controller.execute_route().unwrap();

        let changes: Vec<StateChange> = rig.changes.try_iter().collect();
        let doors: Vec<u8> = changes
            .iter()
            .filter(|change| change.motion == MotionState::DoorsOpen)
            .map(|change| change.floor)
            .collect();
        assert_eq!(doors, vec![5, 8, 9]);
        assert!(changes
            .iter()
            .take_while(|change| change.floor < 9)
            .all(|change| change.direction != Direction::Down));
    }

    #[test]
    fn request_at_current_floor_boards_immediately() {
        let mut rig = rig(8);
        rig.controller.state.floor = 6;
        rig.pending_tx.send(request(6, 2)).unwrap();

        rig.controller.cycle().unwrap();

        assert_eq!(door_floors(&rig.changes), vec![6, 2]);
        assert_eq!(rig.controller.state.floor, 2);
    }

    #[test]
    fn collects_passenger_before_delivering_them() {
        let mut rig = rig(8);
        rig.pending_tx.send(request(8, 2)).unwrap();

        rig.controller.cycle().unwrap();

        assert_eq!(door_floors(&rig.changes), vec![8, 2]);
    }

    #[test]
    fn full_car_leaves_passengers_pending() {
        let mut rig = rig(1);
        rig.controller.state.floor = 2;
        rig.controller.state.direction = Direction::Up;
        rig.controller.state.active.push(ActiveRequest::on_board(request(2, 8)));
        rig.controller.state.pending.push_back(request(5, 9));

        rig.controller.execute_route().unwrap();

        assert_eq!(door_floors(&rig.changes), vec![8]);
        assert_eq!(rig.controller.state.pending.len(), 1);

        // picked up on the next cycle once the car is free
        rig.controller.cycle().unwrap();
        assert_eq!(door_floors(&rig.changes), vec![5, 9]);
        assert!(rig.controller.state.pending.is_empty());
    }

    #[test]
    fn opposite_direction_waits_for_a_later_route() {
        let mut rig = rig(8);
        rig.controller.state.floor = 2;
        rig.controller.state.direction = Direction::Up;
        rig.controller.state.active.push(ActiveRequest::on_board(request(2, 8)));
        rig.controller.state.pending.push_back(request(5, 1));

        rig.controller.execute_route().unwrap();
        assert_eq!(door_floors(&rig.changes), vec![8]);

        rig.controller.cycle().unwrap();
        assert_eq!(door_floors(&rig.changes), vec![5, 1]);
    }

    #[test]
    fn boarding_empties_the_floor() {
        let mut rig = rig(8);
        rig.controller.occupancy.add_passenger(4);
        rig.pending_tx.send(request(4, 10)).unwrap();

        rig.controller.cycle().unwrap();

        assert_eq!(rig.controller.occupancy.passenger_count(4), 0);
    }

    #[test]
    fn snapshot_follows_the_loop() {
        let mut rig = rig(8);
        rig.pending_tx.send(request(1, 3)).unwrap();
        rig.controller.cycle().unwrap();

        let status = rig.controller.status.read().clone();
        assert_eq!(status.floor, 3);
        assert!(status.is_idle());
        assert_eq!(status.active_count(), 0);
    }

    #[test]
    fn idle_poll_times_out_without_work() {
        let mut rig = rig(8);
        assert_eq!(rig.controller.cycle(), Ok(()));
        assert!(rig.controller.state.active.is_empty());
        assert!(rig.controller.status.read().is_idle());
    }

    #[test]
    fn shutdown_stops_travel_between_floors() {
        let mut rig = rig(8);
        rig.controller.state.direction = Direction::Up;
        rig.controller.state.active.push(ActiveRequest::on_board(request(0, 9)));
        drop(rig.shutdown_tx);

        assert_eq!(rig.controller.execute_route(), Err(Cancelled));
        assert_eq!(rig.controller.state.floor, 0);
        assert_eq!(rig.controller.state.active.len(), 1);
    }

    #[test]
    fn shutdown_while_doors_are_open() {
        let mut rig = rig(8);
        rig.controller.settings.door_open_time = Duration::from_secs(30);
        rig.controller.state.floor = 4;
        rig.controller.state.direction = Direction::Up;
        rig.controller.state.active.push(ActiveRequest::waiting(request(4, 10)));

        let shutdown_tx = rig.shutdown_tx;
        let closer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(shutdown_tx);
        });

        let started = std::time::Instant::now();
        assert_eq!(rig.controller.serve_stop(), Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
        closer.join().unwrap();

        assert_eq!(rig.controller.state.floor, 4);
        assert_eq!(rig.controller.state.motion, MotionState::DoorsOpen);
        assert!(rig.controller.state.active[0].boarded);
        assert_eq!(door_floors(&rig.changes), vec![4]);
    }

    #[test]
    fn drained_requests_are_published_before_they_leave_the_count() {
        let mut rig = rig(8);
        rig.controller.inbox.queued.store(2, Ordering::SeqCst);
        rig.pending_tx.send(request(9, 12)).unwrap();
        rig.pending_tx.send(request(3, 1)).unwrap();

        rig.controller.drain_pending();

        assert_eq!(rig.controller.status.read().pending_count, 2);
        assert_eq!(rig.controller.inbox.queued.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_stopped_event_between_doors_and_the_next_leg() {
        let mut rig = rig(8);
        rig.pending_tx.send(request(4, 10)).unwrap();

        rig.controller.cycle().unwrap();

        let changes: Vec<StateChange> = rig.changes.try_iter().collect();
        let after_first_doors: Vec<MotionState> = changes
            .iter()
            .skip_while(|change| change.motion != MotionState::DoorsOpen)
            .skip(1)
            .map(|change| change.motion)
            .take_while(|&motion| motion != MotionState::DoorsOpen)
            .collect();
        assert!(after_first_doors.iter().all(|&motion| motion == MotionState::Moving));
        let last = changes.last().unwrap();
        assert_eq!((last.motion, last.direction), (MotionState::Stopped, Direction::Wait));
    }

    #[test]
    fn shutdown_while_idle() {
        let mut rig = rig(8);
        drop(rig.shutdown_tx);
        assert_eq!(rig.controller.cycle(), Err(Cancelled));
    }
}
