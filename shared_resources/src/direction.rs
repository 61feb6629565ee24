#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Wait,
}

impl Direction {
    /// Direction of travel from `from` to `to`, `Wait` when they are the same floor.
    pub fn between(from: u8, to: u8) -> Self {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::Wait
        }
    }

    /// True if `floor` lies strictly ahead of `from` when travelling this way.
    /// Every other floor is ahead of a waiting car.
    pub fn is_ahead(self, from: u8, floor: u8) -> bool {
        match self {
            Direction::Up => floor > from,
            Direction::Down => floor < from,
            Direction::Wait => floor != from,
        }
    }

    pub fn as_string(self) -> String {
        match self {
            Direction::Up => String::from("up"),
            Direction::Down => String::from("down"),
            Direction::Wait => String::from("wait"),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionState {
    Stopped,
    Moving,
    DoorsOpen,
}

impl MotionState {
    pub fn as_string(self) -> String {
        match self {
            MotionState::Stopped => String::from("stopped"),
            MotionState::Moving => String::from("moving"),
            MotionState::DoorsOpen => String::from("doorsOpen"),
        }
    }
}
