use crate::call::{CallDirection, FloorNumber};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub type PassengerId = u32;

/// Timestamps recorded at the exchange boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Journey {
    pub waiting: bool,
    pub wait_start: Instant,
    pub wait_end: Option<Instant>,
    pub ride_start: Option<Instant>,
    pub ride_end: Option<Instant>,
}

#[derive(Debug)]
pub struct Passenger {
    id: PassengerId,
    source: FloorNumber,
    destination: FloorNumber,
    direction: CallDirection,
    journey: Mutex<Journey>,
}

impl Passenger {
    /// Returns `None` when source and destination are the same floor.
    pub fn new(id: PassengerId, source: FloorNumber, destination: FloorNumber, now: Instant) -> Option<Self> {
        let direction = CallDirection::between(source, destination)?;
        Some(Self {
            id,
            source,
            destination,
            direction,
            journey: Mutex::new(Journey {
                waiting: true,
                wait_start: now,
                wait_end: None,
                ride_start: None,
                ride_end: None,
            }),
        })
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn source(&self) -> FloorNumber {
        self.source
    }

    pub fn destination(&self) -> FloorNumber {
        self.destination
    }

    /// Hall button this passenger needs.
    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    pub fn is_waiting(&self) -> bool {
        self.journey.lock().waiting
    }

    pub fn journey(&self) -> Journey {
        *self.journey.lock()
    }

    pub(crate) fn board(&self, now: Instant) {
        let mut journey = self.journey.lock();
        journey.waiting = false;
        journey.wait_end = Some(now);
        journey.ride_start = Some(now);
    }

    pub(crate) fn alight(&self, now: Instant) {
        self.journey.lock().ride_end = Some(now);
    }

    pub fn wait_time(&self) -> Option<Duration> {
        let journey = self.journey.lock();
        journey.wait_end.map(|end| end.duration_since(journey.wait_start))
    }

    pub fn ride_time(&self) -> Option<Duration> {
        let journey = self.journey.lock();
        match (journey.ride_start, journey.ride_end) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    pub fn has_arrived(&self) -> bool {
        self.journey.lock().ride_end.is_some()
    }
}
