//! Dispatch controller.
//!
//! The [`Controller`] owns the fleet and the two dispatch policies. New hall
//! calls go to the selector first and to the pending processor when no unit
//! can take them. Units report back when they go idle or start moving so
//! pending calls get picked up, and when they shut down so completion can be
//! detected.

pub mod pending;
pub mod selector;

pub use pending::{build_processor, PendingProcessor, StandardProcessor};
pub use selector::{build_selector, ElevatorSelector, StandardSelector};

use crate::call::{FloorNumber, HallCall};
use crate::config::{Policies, SimConfig, UnitSettings};
use crate::elevator::{Admission, ElevatorUnit, UnitId};
use crate::error::{ConfigError, RequestError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Where a hall call ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Assigned(UnitId),
    Pending,
}

#[derive(Debug)]
pub struct Controller {
    floors: FloorNumber,
    units: Vec<Arc<ElevatorUnit>>,
    selector: Box<dyn ElevatorSelector>,
    pending: Box<dyn PendingProcessor>,
    finished: AtomicUsize,
    completion: watch::Sender<bool>,
}

impl Controller {
    /// Validate `config` and build the fleet through the elevator factory.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let policies = config.validate()?;
        Ok(Self::with_policies(config.elevators, config.unit_settings(), policies))
    }

    pub fn with_policies(elevators: u32, settings: UnitSettings, policies: Policies) -> Self {
        let units = (1..=elevators)
            .map(|id| Arc::new(policies.elevator.build(UnitId(id), settings)))
            .collect();
        let selector = build_selector(policies.selector);
        let pending = build_processor(policies.processor);
        info!(
            "Controller ready with {} elevators, {} selector, {} pending processor",
            elevators,
            selector.name(),
            pending.name()
        );
        let (completion, _) = watch::channel(false);

        Self {
            floors: settings.floors,
            units,
            selector,
            pending,
            finished: AtomicUsize::new(0),
            completion,
        }
    }

    pub fn units(&self) -> &[Arc<ElevatorUnit>] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Result<&Arc<ElevatorUnit>, RequestError> {
        self.units
            .iter()
            .find(|unit| unit.id() == id)
            .ok_or(RequestError::UnknownUnit(id))
    }

    /// Assign a new hall call to a unit, or queue it as pending.
    pub fn route_hall_call(&self, call: HallCall) -> Result<Routing, RequestError> {
        if call.floor < 1 || call.floor > self.floors {
            return Err(RequestError::FloorOutOfRange { floor: call.floor, floors: self.floors });
        }
        if self.pending.is_pending(call) {
            debug!("Call {} is already pending", call);
            return Ok(Routing::Pending);
        }

        if let Some(id) = self.selector.select(&self.units, call) {
            let unit = self.unit(id)?;
            match unit.add_hall_request(call.floor)? {
                Admission::Admitted => return Ok(Routing::Assigned(id)),
                // The unit moved past the floor between selection and admission.
                Admission::Rejected => debug!("Elevator {} lost the race for {}", id, call),
            }
        }

        self.pending.add_pending_call(call);
        Ok(Routing::Pending)
    }

    /// A rider inside unit `id` pressed `floor`.
    pub fn press_car_button(&self, id: UnitId, floor: FloorNumber) -> Result<Admission, RequestError> {
        self.unit(id)?.press_car_button(floor)
    }

    pub fn notify_idle(&self, id: UnitId) -> Option<HallCall> {
        let unit = self.unit(id).ok()?;
        self.pending.begin_pickup(unit)
    }

    pub fn notify_moving(&self, id: UnitId) -> Vec<HallCall> {
        match self.unit(id) {
            Ok(unit) => self.pending.check_pending(unit),
            Err(_) => Vec::new(),
        }
    }

    /// Count a unit that has shut down. Returns true for the call that
    /// completes the fleet, which also publishes the completion signal.
    pub fn notify_finished(&self) -> bool {
        let finished = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("{} of {} elevators finished", finished, self.units.len());
        if finished == self.units.len() {
            info!("All {} elevators finished", finished);
            self.completion.send_replace(true);
            true
        } else {
            false
        }
    }

    /// Ask every unit to finish its work and park.
    pub fn shutdown(&self) {
        info!("Shutting down {} elevators", self.units.len());
        for unit in &self.units {
            unit.stop();
        }
    }

    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        *self.completion.borrow()
    }

    pub fn subscribe_completion(&self) -> watch::Receiver<bool> {
        self.completion.subscribe()
    }

    pub fn pending_calls(&self) -> Vec<HallCall> {
        self.pending.pending_calls()
    }

    pub fn selector(&self) -> &dyn ElevatorSelector {
        self.selector.as_ref()
    }

    pub fn pending(&self) -> &dyn PendingProcessor {
        self.pending.as_ref()
    }
}
