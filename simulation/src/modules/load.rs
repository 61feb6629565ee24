/// ----- LOAD MODULE -----
/// Random passenger source. Picks a call floor and a different target
/// floor, hands the request to the dispatcher and waits a random interval.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use rand::Rng;
use tracing::{debug, info, warn};

use dispatcher::Dispatcher;
use elevator::modules::timer;
use shared_resources::config::LoadConfig;
use shared_resources::error::RequestError;
use shared_resources::request::Request;

pub fn main(dispatcher: Arc<Dispatcher>, settings: LoadConfig, shutdown_rx: Receiver<()>) {
    let mut rng = rand::rng();
    let total_floors = dispatcher.total_floors();

    if timer::sleep(&shutdown_rx, Duration::from_millis(settings.initial_delay_ms)).is_err() {
        return;
    }

    loop {
        match random_request(&mut rng, total_floors) {
            Ok(request) => match dispatcher.handle_request(request) {
                Ok(id) => debug!(elevator = id, request = %request, "passenger arrived"),
                Err(err) => warn!(request = %request, error = %err, "passenger turned away"),
            },
            Err(err) => warn!(error = %err, "could not create passenger"),
        }

        let interval = rng.random_range(settings.min_interval_ms..=settings.max_interval_ms);
        if timer::sleep(&shutdown_rx, Duration::from_millis(interval)).is_err() {
            break;
        }
    }
    info!("load source stopped");
}

/// Uniform call floor and a uniform target among the other floors.
pub fn random_request(rng: &mut impl Rng, total_floors: u8) -> Result<Request, RequestError> {
    let call_floor = rng.random_range(0..total_floors);
    let mut target_floor = rng.random_range(0..total_floors.saturating_sub(1).max(1));
    if target_floor >= call_floor {
        target_floor += 1;
    }
    Request::between(call_floor, target_floor, total_floors)
}
