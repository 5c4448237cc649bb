//! Wait and ride time aggregation.
//!
//! Durations are kept in milliseconds. Display helpers round to whole
//! seconds, half up.

use crate::call::FloorNumber;
use crate::passenger::{Passenger, PassengerId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub average_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DurationStats {
    pub fn from_millis(samples: &[u64]) -> Option<Self> {
        let min_ms = *samples.iter().min()?;
        let max_ms = *samples.iter().max()?;
        let count = samples.len();
        let total: u64 = samples.iter().sum();
        let average_ms = (total + count as u64 / 2) / count as u64;
        Some(Self { count, average_ms, min_ms, max_ms })
    }

    pub fn average_secs(&self) -> u64 {
        round_secs(self.average_ms)
    }

    pub fn min_secs(&self) -> u64 {
        round_secs(self.min_ms)
    }

    pub fn max_secs(&self) -> u64 {
        round_secs(self.max_ms)
    }
}

pub fn round_secs(ms: u64) -> u64 {
    (ms + 500) / 1000
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassengerRecord {
    pub id: PassengerId,
    pub source: FloorNumber,
    pub destination: FloorNumber,
    /// Offset from the start of the simulation.
    pub created_ms: u64,
    pub wait_ms: Option<u64>,
    pub ride_ms: Option<u64>,
}

impl PassengerRecord {
    pub fn total_ms(&self) -> Option<u64> {
        Some(self.wait_ms? + self.ride_ms?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorWaitStats {
    pub floor: FloorNumber,
    pub wait: Option<DurationStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripStats {
    pub source: FloorNumber,
    pub destination: FloorNumber,
    pub ride: DurationStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub floors: FloorNumber,
    pub total_passengers: usize,
    /// Passengers that never reached their destination.
    pub unserved: usize,
    pub wait_by_floor: Vec<FloorWaitStats>,
    pub ride_by_trip: Vec<TripStats>,
    pub passengers: Vec<PassengerRecord>,
}

impl SimulationReport {
    pub fn from_passengers(floors: FloorNumber, passengers: &[Arc<Passenger>], epoch: Instant) -> Self {
        let records: Vec<PassengerRecord> = passengers
            .iter()
            .map(|p| PassengerRecord {
                id: p.id(),
                source: p.source(),
                destination: p.destination(),
                created_ms: millis(p.journey().wait_start.saturating_duration_since(epoch)),
                wait_ms: p.wait_time().map(millis),
                ride_ms: p.ride_time().map(millis),
            })
            .collect();

        let mut waits: BTreeMap<FloorNumber, Vec<u64>> = BTreeMap::new();
        let mut rides: BTreeMap<(FloorNumber, FloorNumber), Vec<u64>> = BTreeMap::new();
        for record in &records {
            if let Some(wait) = record.wait_ms {
                waits.entry(record.source).or_default().push(wait);
            }
            if let Some(ride) = record.ride_ms {
                rides.entry((record.source, record.destination)).or_default().push(ride);
            }
        }

        let wait_by_floor = (1..=floors)
            .map(|floor| FloorWaitStats {
                floor,
                wait: waits.get(&floor).and_then(|samples| DurationStats::from_millis(samples)),
            })
            .collect();
        let ride_by_trip = rides
            .iter()
            .filter_map(|(&(source, destination), samples)| {
                DurationStats::from_millis(samples).map(|ride| TripStats { source, destination, ride })
            })
            .collect();

        Self {
            floors,
            total_passengers: records.len(),
            unserved: records.iter().filter(|r| r.ride_ms.is_none()).count(),
            wait_by_floor,
            ride_by_trip,
            passengers: records,
        }
    }

    pub fn served(&self) -> usize {
        self.total_passengers - self.unserved
    }
}
