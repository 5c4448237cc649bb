use crate::building::Building;
use crate::call::FloorNumber;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Creates passengers at a fixed rate on random floors.
#[derive(Debug)]
pub struct PassengerProducer {
    building: Arc<Building>,
    rng: StdRng,
    interval: Duration,
    duration: Duration,
}

impl PassengerProducer {
    pub fn new(building: Arc<Building>) -> Self {
        let production = building.config().production.clone();
        let rng = match production.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let per_minute = u64::from(production.people_per_minute.max(1));
        Self {
            building,
            rng,
            interval: Duration::from_millis((60_000 / per_minute).max(1)),
            duration: Duration::from_millis(production.duration_ms),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A uniformly random source and a uniformly random distinct destination.
    pub fn next_trip(&mut self) -> (FloorNumber, FloorNumber) {
        let floors = self.building.config().floors;
        let source = self.rng.gen_range(1..=floors);
        let destination = self.rng.gen_range(1..floors);
        let destination = if destination >= source { destination + 1 } else { destination };
        (source, destination)
    }

    /// Produce until the configured duration has elapsed, then end production.
    /// Returns the number of passengers created.
    pub async fn run(mut self) -> usize {
        let started = Instant::now();
        let mut produced = 0;
        info!(
            "Producing one passenger every {} ms for {} ms",
            self.interval.as_millis(),
            self.duration.as_millis()
        );

        while started.elapsed() < self.duration {
            let (source, destination) = self.next_trip();
            match self.building.add_passenger(source, destination) {
                Ok(_) => produced += 1,
                Err(e) => warn!("Could not add passenger: {}", e),
            }
            sleep(self.interval).await;
        }

        self.building.end_production();
        produced
    }
}
