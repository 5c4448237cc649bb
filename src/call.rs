use serde::{Deserialize, Serialize};
use std::fmt;

/// Floors are numbered from 1, matching the buttons a rider sees.
pub type FloorNumber = u32;

/// Travel state of an elevator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Idle,
    Up,
    Down,
}

impl Direction {
    /// Direction that leads from `from` to `to`, `Idle` when they are equal.
    pub fn toward(from: FloorNumber, to: FloorNumber) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    pub fn is_idle(self) -> bool {
        self == Direction::Idle
    }

    /// True when `floor` lies strictly ahead of `current` when travelling this way.
    /// An idle unit has nothing ahead of it.
    pub fn is_ahead(self, current: FloorNumber, floor: FloorNumber) -> bool {
        match self {
            Direction::Up => floor > current,
            Direction::Down => floor < current,
            Direction::Idle => false,
        }
    }

    pub fn as_call(self) -> Option<CallDirection> {
        match self {
            Direction::Up => Some(CallDirection::Up),
            Direction::Down => Some(CallDirection::Down),
            Direction::Idle => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Idle => write!(f, "idle"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Direction of a hall call button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallDirection {
    Up,
    Down,
}

impl CallDirection {
    /// Direction a rider needs to get from `source` to `destination`.
    /// `None` when the two floors are the same.
    pub fn between(source: FloorNumber, destination: FloorNumber) -> Option<Self> {
        Direction::toward(source, destination).as_call()
    }

    pub fn iter() -> impl Iterator<Item = CallDirection> {
        [CallDirection::Up, CallDirection::Down].into_iter()
    }
}

impl From<CallDirection> for Direction {
    fn from(direction: CallDirection) -> Self {
        match direction {
            CallDirection::Up => Direction::Up,
            CallDirection::Down => Direction::Down,
        }
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Direction::from(*self).fmt(f)
    }
}

/// A floor-originated request for any elevator.
///
/// Also used to describe a pickup: the hall call a specific unit has
/// committed to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HallCall {
    pub floor: FloorNumber,
    pub direction: CallDirection,
}

impl HallCall {
    pub fn new(floor: FloorNumber, direction: CallDirection) -> Self {
        Self { floor, direction }
    }

    pub fn up(floor: FloorNumber) -> Self {
        Self::new(floor, CallDirection::Up)
    }

    pub fn down(floor: FloorNumber) -> Self {
        Self::new(floor, CallDirection::Down)
    }

    /// True when `other` lies further along this call's direction,
    /// i.e. a pickup target extended to `other` would be farther away.
    pub fn is_farther(&self, other: FloorNumber) -> bool {
        Direction::from(self.direction).is_ahead(self.floor, other)
    }
}

impl fmt::Display for HallCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floor {} {}", self.floor, self.direction)
    }
}
