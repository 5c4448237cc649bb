//! The simulation context.
//!
//! A [`Building`] is built once from a [`SimConfig`] and shared by `Arc`
//! with every unit task and the passenger producer. It owns the floors, the
//! controller and the registry of every passenger created during the run.

use crate::call::{Direction, FloorNumber};
use crate::config::SimConfig;
use crate::dispatch::Controller;
use crate::elevator::ElevatorUnit;
use crate::error::{ConfigError, HandshakeError, RequestError, SimError};
use crate::exchange::{exchange, ExchangeSummary};
use crate::floor::Floor;
use crate::passenger::{Passenger, PassengerId};
use crate::producer::PassengerProducer;
use crate::stats::SimulationReport;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Building {
    config: SimConfig,
    floors: Vec<Floor>,
    controller: Controller,
    passengers: Mutex<Vec<Arc<Passenger>>>,
    next_passenger: AtomicU32,
    epoch: Instant,
}

impl Building {
    /// Validate `config` and build floors, controller and fleet.
    pub fn new(config: SimConfig) -> Result<Arc<Self>, ConfigError> {
        let controller = Controller::new(&config)?;
        let floors = (1..=config.floors).map(Floor::new).collect();
        info!(
            "Building ready: {} floors, {} elevators, default floor {}",
            config.floors, config.elevators, config.default_floor
        );

        Ok(Arc::new(Self {
            config,
            floors,
            controller,
            passengers: Mutex::new(Vec::new()),
            next_passenger: AtomicU32::new(1),
            epoch: Instant::now(),
        }))
    }

    /// Spawn one control task per unit.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.controller
            .units()
            .iter()
            .map(|unit| tokio::spawn(Arc::clone(unit).run(Arc::clone(self))))
            .collect()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn floor(&self, number: FloorNumber) -> Option<&Floor> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        self.floors.get(index)
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    fn check_floor(&self, floor: FloorNumber) -> Result<(), RequestError> {
        if floor < 1 || floor > self.config.floors {
            return Err(RequestError::FloorOutOfRange { floor, floors: self.config.floors });
        }
        Ok(())
    }

    /// Create a passenger waiting at `source` and call an elevator for them.
    pub fn add_passenger(&self, source: FloorNumber, destination: FloorNumber) -> Result<Arc<Passenger>, RequestError> {
        self.check_floor(source)?;
        self.check_floor(destination)?;

        let id: PassengerId = self.next_passenger.fetch_add(1, Ordering::SeqCst);
        let passenger =
            Arc::new(Passenger::new(id, source, destination, Instant::now()).ok_or(RequestError::SameFloor(source))?);
        info!("Passenger {} created on floor {} going to floor {}", id, source, destination);
        self.passengers.lock().push(Arc::clone(&passenger));

        let floor = self.floor(source).ok_or(RequestError::FloorOutOfRange {
            floor: source,
            floors: self.config.floors,
        })?;
        floor.enqueue(Arc::clone(&passenger), &self.controller)?;
        Ok(passenger)
    }

    /// A unit opened its doors at `floor`.
    pub fn alert_floor(
        &self,
        unit: &ElevatorUnit,
        floor: FloorNumber,
        arrival: Direction,
    ) -> Result<ExchangeSummary, HandshakeError> {
        let target = self.floor(floor).ok_or(HandshakeError::UnknownFloor(floor))?;
        exchange(unit, target, arrival, &self.controller, Instant::now())
    }

    /// No more passengers will be created.
    pub fn end_production(&self) {
        info!("Passenger production ended");
        self.controller.shutdown();
    }

    pub fn passengers(&self) -> Vec<Arc<Passenger>> {
        self.passengers.lock().clone()
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport::from_passengers(self.config.floors, &self.passengers(), self.epoch)
    }

    /// Wait until every unit has parked and shut down.
    pub async fn wait_for_completion(&self) -> SimulationReport {
        let mut completion = self.controller.subscribe_completion();
        if let Err(e) = completion.wait_for(|done| *done).await {
            warn!("Completion signal lost: {}", e);
        }
        info!("Simulation complete, {} passengers", self.passengers.lock().len());
        self.report()
    }

    /// Build, start, feed passengers until production ends, and wait for
    /// every unit to park.
    pub async fn run(config: SimConfig) -> Result<SimulationReport, SimError> {
        let building = Building::new(config)?;
        let tasks = building.start();

        let producer = PassengerProducer::new(Arc::clone(&building));
        let produced = tokio::spawn(producer.run());

        let report = building.wait_for_completion().await;
        match produced.await {
            Ok(count) => info!("Producer created {} passengers", count),
            Err(e) => warn!("Producer task failed: {}", e),
        }
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Elevator task failed: {}", e);
            }
        }
        Ok(report)
    }
}
