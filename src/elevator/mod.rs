//! Elevator units.
//!
//! An [`ElevatorUnit`] is shared between its own control task
//! ([`control`]) and the dispatch side, which inserts hall requests and
//! commits the unit to pickups from other tasks. All of its mutable state
//! sits behind one mutex so every access is exclusive per unit.
//!
//! Admission rule: an idle unit admits any in-range request and takes its
//! direction from it; a moving unit only admits requests strictly ahead of
//! it. Anything else is logged and dropped.

pub mod control;
pub mod requests;

pub use requests::{RequestKind, StopRequests};

use crate::call::{Direction, FloorNumber, HallCall};
use crate::config::{ElevatorKind, UnitSettings};
use crate::error::RequestError;
use crate::passenger::{Passenger, PassengerId};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of offering a stop to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Against the current direction of travel, or the unit has retired.
    Rejected,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        self == Admission::Admitted
    }
}

/// Point-in-time view of a unit, for selection diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub floor: FloorNumber,
    pub direction: Direction,
    pub pickup: Option<HallCall>,
    pub riders: Vec<PassengerId>,
    pub stops: Vec<FloorNumber>,
    pub running: bool,
    pub retired: bool,
}

#[derive(Debug)]
pub struct UnitState {
    id: UnitId,
    current_floor: FloorNumber,
    direction: Direction,
    running: bool,
    retired: bool,
    riders: Vec<Arc<Passenger>>,
    requests: StopRequests,
    pickup: Option<HallCall>,
    max_capacity: usize,
}

impl UnitState {
    fn new(id: UnitId, settings: &UnitSettings) -> Self {
        Self {
            id,
            current_floor: settings.default_floor,
            direction: Direction::Idle,
            running: true,
            retired: false,
            riders: Vec::with_capacity(settings.max_capacity),
            requests: StopRequests::new(settings.floors),
            pickup: None,
            max_capacity: settings.max_capacity,
        }
    }

    pub fn current_floor(&self) -> FloorNumber {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pickup(&self) -> Option<HallCall> {
        self.pickup
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }

    pub fn has_room(&self) -> bool {
        self.riders.len() < self.max_capacity
    }

    pub fn requests(&self) -> &StopRequests {
        &self.requests
    }

    pub fn stops_remain(&self) -> bool {
        self.requests.any()
    }

    /// Commit the unit to serving `call`, replacing any previous pickup.
    pub(crate) fn set_pickup(&mut self, call: HallCall) {
        debug!("Elevator {} committed to pickup at {}", self.id, call);
        self.pickup = Some(call);
    }

    pub(crate) fn clear_pickup(&mut self) {
        self.pickup = None;
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        if self.direction != direction {
            debug!("Elevator {} direction {} -> {}", self.id, self.direction, direction);
            self.direction = direction;
        }
    }

    /// Go idle unless a stop is outstanding. Returns whether the unit is idle.
    pub(crate) fn settle_idle(&mut self) -> bool {
        if self.stops_remain() {
            return false;
        }
        self.set_direction(Direction::Idle);
        true
    }

    pub(crate) fn set_floor(&mut self, floor: FloorNumber) {
        self.current_floor = floor;
    }

    /// Apply the admission rule. Callers must wake the unit afterwards.
    pub(crate) fn admit(&mut self, kind: RequestKind, floor: FloorNumber) -> Result<Admission, RequestError> {
        let floors = self.requests.floors();
        if floor < 1 || floor > floors {
            return Err(RequestError::FloorOutOfRange { floor, floors });
        }

        let admitted = if self.retired {
            false
        } else if self.direction.is_idle() {
            self.set_direction(Direction::toward(self.current_floor, floor));
            true
        } else {
            self.direction.is_ahead(self.current_floor, floor)
        };

        if !admitted {
            match kind {
                RequestKind::Car => warn!(
                    "Elevator {} ignored rider request for floor {} while going {} at floor {}",
                    self.id, floor, self.direction, self.current_floor
                ),
                RequestKind::Hall => warn!(
                    "Elevator {} ignored floor request for floor {} while going {} at floor {}",
                    self.id, floor, self.direction, self.current_floor
                ),
            }
            if kind == RequestKind::Hall && self.pickup.map(|p| p.floor) == Some(floor) {
                self.pickup = None;
            }
            return Ok(Admission::Rejected);
        }

        self.requests.set(kind, floor);
        match kind {
            RequestKind::Car => info!("Elevator {} rider request added for floor {}", self.id, floor),
            RequestKind::Hall => info!("Elevator {} floor request added for floor {}", self.id, floor),
        }
        Ok(Admission::Admitted)
    }

    pub(crate) fn clear_stop(&mut self, floor: FloorNumber) -> (bool, bool) {
        self.requests.clear(floor)
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
        self.direction = Direction::Idle;
        self.pickup = None;
    }

    /// Closest floor with an outstanding stop, lower floor on a tie.
    pub(crate) fn nearest_stop(&self) -> Option<FloorNumber> {
        let current = self.current_floor;
        self.requests
            .floors_with_stops()
            .min_by_key(|&floor| (floor.abs_diff(current), floor))
    }

    /// Riders whose destination is no longer an outstanding stop press it again.
    pub(crate) fn repress_destinations(&mut self) {
        let unrequested: Vec<FloorNumber> = self
            .riders
            .iter()
            .map(|p| p.destination())
            .filter(|&floor| !self.requests.at(floor))
            .collect();
        for floor in unrequested {
            if let Err(e) = self.admit(RequestKind::Car, floor) {
                warn!("Elevator {} rider destination rejected: {}", self.id, e);
            }
        }
    }

    /// Board a passenger if there is room, pressing their destination.
    pub(crate) fn board(&mut self, passenger: Arc<Passenger>, now: Instant) -> bool {
        if !self.has_room() {
            return false;
        }
        passenger.board(now);
        let destination = passenger.destination();
        info!(
            "Passenger {} entered elevator {} on floor {} ({} riders)",
            passenger.id(),
            self.id,
            self.current_floor,
            self.riders.len() + 1
        );
        self.riders.push(passenger);
        if let Err(e) = self.admit(RequestKind::Car, destination) {
            warn!("Elevator {} rider destination rejected: {}", self.id, e);
        }
        true
    }

    /// Remove every rider whose destination is the current floor.
    pub(crate) fn unload(&mut self, now: Instant) -> Vec<Arc<Passenger>> {
        let floor = self.current_floor;
        let (leaving, staying): (Vec<_>, Vec<_>) = self.riders.drain(..).partition(|p| p.destination() == floor);
        self.riders = staying;
        for passenger in &leaving {
            passenger.alight(now);
            info!(
                "Passenger {} exited elevator {} on floor {} ({} riders)",
                passenger.id(),
                self.id,
                floor,
                self.riders.len()
            );
        }
        leaving
    }

    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            floor: self.current_floor,
            direction: self.direction,
            pickup: self.pickup,
            riders: self.riders.iter().map(|p| p.id()).collect(),
            stops: self.requests.floors_with_stops().collect(),
            running: self.running,
            retired: self.retired,
        }
    }
}

#[derive(Debug)]
pub struct ElevatorUnit {
    id: UnitId,
    kind: ElevatorKind,
    settings: UnitSettings,
    state: Mutex<UnitState>,
    wake: Notify,
}

impl ElevatorKind {
    /// Build a unit of this kind.
    pub fn build(self, id: UnitId, settings: UnitSettings) -> ElevatorUnit {
        match self {
            ElevatorKind::Standard => ElevatorUnit::new(id, self, settings),
        }
    }
}

impl ElevatorUnit {
    fn new(id: UnitId, kind: ElevatorKind, settings: UnitSettings) -> Self {
        info!("Elevator {} created at floor {}", id, settings.default_floor);
        Self {
            id,
            kind,
            settings,
            state: Mutex::new(UnitState::new(id, &settings)),
            wake: Notify::new(),
        }
    }

    pub fn standard(id: UnitId, settings: UnitSettings) -> Self {
        ElevatorKind::Standard.build(id, settings)
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> ElevatorKind {
        self.kind
    }

    pub fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, UnitState> {
        self.state.lock()
    }

    /// Wake the control loop if it is waiting idle. A wake issued while the
    /// loop is busy is kept and consumed by its next idle wait.
    pub(crate) fn wake(&self) {
        self.wake.notify_one();
    }

    /// A rider pressed a destination button inside the cab.
    pub fn press_car_button(&self, floor: FloorNumber) -> Result<Admission, RequestError> {
        self.admit(RequestKind::Car, floor)
    }

    /// The controller assigned a stop for a hall call.
    pub fn add_hall_request(&self, floor: FloorNumber) -> Result<Admission, RequestError> {
        self.admit(RequestKind::Hall, floor)
    }

    /// Commit to `call` and add its floor as a hall request in one step.
    pub fn assign_pickup(&self, call: HallCall) -> Result<Admission, RequestError> {
        let admission = {
            let mut state = self.state.lock();
            state.set_pickup(call);
            state.admit(RequestKind::Hall, call.floor)?
        };
        if admission.is_admitted() {
            self.wake();
        }
        Ok(admission)
    }

    fn admit(&self, kind: RequestKind, floor: FloorNumber) -> Result<Admission, RequestError> {
        let admission = self.state.lock().admit(kind, floor)?;
        if admission.is_admitted() {
            self.wake();
        }
        Ok(admission)
    }

    /// Finish outstanding work, return to the default floor, then terminate.
    pub fn stop(&self) {
        self.state.lock().running = false;
        self.wake();
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn is_retired(&self) -> bool {
        self.state.lock().retired
    }

    pub fn current_floor(&self) -> FloorNumber {
        self.state.lock().current_floor
    }

    pub fn direction(&self) -> Direction {
        self.state.lock().direction
    }

    pub fn pickup(&self) -> Option<HallCall> {
        self.state.lock().pickup
    }

    pub fn rider_count(&self) -> usize {
        self.state.lock().riders.len()
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        self.state.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallDirection;
    use std::time::Duration;

    fn settings() -> UnitSettings {
        UnitSettings {
            floors: 10,
            default_floor: 5,
            door_time: Duration::from_millis(10),
            travel_time: Duration::from_millis(10),
            idle_timeout: Duration::from_millis(100),
            max_capacity: 2,
        }
    }

    #[test]
    fn test_unit_starts_idle_at_default_floor() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        let snapshot = unit.snapshot();
        assert_eq!(snapshot.floor, 5);
        assert_eq!(snapshot.direction, Direction::Idle);
        assert!(snapshot.running);
        assert!(snapshot.stops.is_empty());
        assert!(snapshot.pickup.is_none());
    }

    #[test]
    fn test_idle_admission_sets_direction() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        assert_eq!(unit.press_car_button(8), Ok(Admission::Admitted));
        assert_eq!(unit.direction(), Direction::Up);

        let unit = ElevatorUnit::standard(UnitId(2), settings());
        assert_eq!(unit.add_hall_request(2), Ok(Admission::Admitted));
        assert_eq!(unit.direction(), Direction::Down);
    }

    #[test]
    fn test_moving_unit_only_admits_requests_ahead() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        unit.press_car_button(9).unwrap();

        assert_eq!(unit.press_car_button(7), Ok(Admission::Admitted));
        assert_eq!(unit.press_car_button(5), Ok(Admission::Rejected));
        assert_eq!(unit.press_car_button(3), Ok(Admission::Rejected));
        assert_eq!(unit.add_hall_request(4), Ok(Admission::Rejected));
        assert_eq!(unit.snapshot().stops, vec![7, 9]);
    }

    #[test]
    fn test_out_of_range_floor_is_an_error() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        assert_eq!(
            unit.press_car_button(0),
            Err(RequestError::FloorOutOfRange { floor: 0, floors: 10 })
        );
        assert_eq!(
            unit.add_hall_request(11),
            Err(RequestError::FloorOutOfRange { floor: 11, floors: 10 })
        );
        assert_eq!(unit.direction(), Direction::Idle);
    }

    #[test]
    fn test_rejected_hall_request_drops_matching_pickup() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        unit.press_car_button(9).unwrap();
        unit.lock().set_pickup(HallCall::new(3, CallDirection::Down));

        assert_eq!(unit.add_hall_request(3), Ok(Admission::Rejected));
        assert!(unit.pickup().is_none());
    }

    #[test]
    fn test_boarding_respects_capacity() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        let now = Instant::now();
        let mut state = unit.lock();
        for id in 1..=3 {
            let passenger = Arc::new(Passenger::new(id, 5, 8, now).unwrap());
            let boarded = state.board(passenger, now);
            assert_eq!(boarded, id <= 2);
        }
        assert_eq!(state.rider_count(), 2);
        assert!(state.requests().has(RequestKind::Car, 8));
    }

    #[test]
    fn test_settle_idle_keeps_direction_of_admitted_stop() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());

        // Admitted between the loop's stop check and its idle reset
        unit.add_hall_request(8).unwrap();
        assert!(!unit.lock().settle_idle());
        assert_eq!(unit.direction(), Direction::Up);

        // So a request behind the unit is still refused
        assert_eq!(unit.press_car_button(2), Ok(Admission::Rejected));
        assert_eq!(unit.snapshot().stops, vec![8]);

        let mut state = unit.lock();
        state.clear_stop(8);
        assert!(state.settle_idle());
        assert_eq!(state.direction(), Direction::Idle);
    }

    #[test]
    fn test_stop_clears_running_flag() {
        let unit = ElevatorUnit::standard(UnitId(1), settings());
        unit.stop();
        assert!(!unit.is_running());
        assert!(!unit.is_retired());
    }
}
