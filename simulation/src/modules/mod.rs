use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::unbounded;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dispatcher::Building;
use shared_resources::config::BuildingConfig;

mod debug;
mod load;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // INITIALIZE LOGGING
    // stdout belongs to the status board
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // READ CONFIGURATION
    let config = BuildingConfig::get()?;
    info!(
        floors = config.total_floors,
        elevators = config.elevators_count,
        capacity = config.elevator_capacity,
        "configuration loaded"
    );

    // START ELEVATORS
    let (state_change_tx, state_change_rx) = unbounded();
    let building = Building::start(&config, state_change_tx)?;

    // INITIALIZE THREAD FOR PASSENGER ARRIVALS
    let load_thread = {
        let dispatcher = building.dispatcher();
        let settings = config.load.clone();
        let shutdown_rx = building.shutdown_signal();
        thread::Builder::new()
            .name("load".to_string())
            .spawn(move || load::main(dispatcher, settings, shutdown_rx))?
    };

    // INITIALIZE THREAD FOR THE STATUS BOARD
    let board_thread = {
        let board = debug::Board::new(config.floors(), config.elevators_count, building.occupancy());
        let shutdown_rx = building.shutdown_signal();
        thread::Builder::new()
            .name("debug".to_string())
            .spawn(move || debug::main(board, state_change_rx, shutdown_rx))?
    };

    info!("running, enter q to quit");
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) if line.trim() == "q" => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "failed to read stdin");
                break;
            }
        }
    }

    let report = building.shutdown();
    if !report.is_clean() {
        warn!(abandoned = ?report.abandoned, "some elevators were abandoned");
    }
    for (name, thread) in [("load", load_thread), ("debug", board_thread)] {
        if thread.join().is_err() {
            error!(thread = name, "thread panicked");
        }
    }
    Ok(())
}
