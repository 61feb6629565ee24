use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of passengers waiting on each floor.
///
/// The dispatcher adds a passenger when it accepts a request and the
/// elevator removes them when they board. Everyone else only reads.
#[derive(Debug)]
pub struct FloorOccupancy {
    waiting: Vec<AtomicUsize>,
}

impl FloorOccupancy {
    pub fn new(total_floors: u8) -> Self {
        FloorOccupancy {
            waiting: (0..total_floors).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    pub fn add_passenger(&self, floor: u8) {
        if let Some(count) = self.waiting.get(floor as usize) {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Saturates at zero.
    pub fn remove_passenger(&self, floor: u8) {
        if let Some(count) = self.waiting.get(floor as usize) {
            let _ = count.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        }
    }

    pub fn passenger_count(&self, floor: u8) -> usize {
        self.waiting
            .get(floor as usize)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }

    pub fn total_waiting(&self) -> usize {
        self.waiting.iter().map(|count| count.load(Ordering::SeqCst)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_floor() {
        let occupancy = FloorOccupancy::new(5);
        occupancy.add_passenger(2);
        occupancy.add_passenger(2);
        occupancy.add_passenger(4);
        occupancy.remove_passenger(2);
        assert_eq!(occupancy.passenger_count(2), 1);
        assert_eq!(occupancy.passenger_count(4), 1);
        assert_eq!(occupancy.total_waiting(), 2);
    }

    #[test]
    fn never_goes_negative() {
        let occupancy = FloorOccupancy::new(3);
        occupancy.remove_passenger(1);
        assert_eq!(occupancy.passenger_count(1), 0);
        occupancy.add_passenger(9);
        assert_eq!(occupancy.total_waiting(), 0);
    }
}
