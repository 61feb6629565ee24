use std::time::Duration;

use crossbeam_channel::{select, Receiver, TryRecvError};

/// The fleet asked the loop to stop. Not an error: the loop unwinds to a
/// safe point and exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Any message, or the sender going away, means shut down.
pub fn is_cancelled(shutdown_rx: &Receiver<()>) -> bool {
    !matches!(shutdown_rx.try_recv(), Err(TryRecvError::Empty))
}

/// Sleeps for `duration` unless the shutdown signal arrives first.
pub fn sleep(shutdown_rx: &Receiver<()>, duration: Duration) -> Result<(), Cancelled> {
    if is_cancelled(shutdown_rx) {
        return Err(Cancelled);
    }
    select! {
        recv(shutdown_rx) -> _ => Err(Cancelled),
        default(duration) => Ok(()),
    }
}
