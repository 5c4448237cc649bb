use crate::call::{CallDirection, FloorNumber, HallCall};
use crate::dispatch::{Controller, Routing};
use crate::error::RequestError;
use crate::passenger::{Passenger, PassengerId};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::info;

/// Call buttons and waiting queue of one floor.
#[derive(Debug, Default)]
pub struct FloorState {
    pub(crate) up_pressed: bool,
    pub(crate) down_pressed: bool,
    pub(crate) waiting: Vec<Arc<Passenger>>,
}

impl FloorState {
    pub(crate) fn is_pressed(&self, direction: CallDirection) -> bool {
        match direction {
            CallDirection::Up => self.up_pressed,
            CallDirection::Down => self.down_pressed,
        }
    }

    /// Press a call button. Returns true when it was not already pressed,
    /// in which case the caller owns routing the new hall call.
    pub(crate) fn press(&mut self, direction: CallDirection) -> bool {
        let button = match direction {
            CallDirection::Up => &mut self.up_pressed,
            CallDirection::Down => &mut self.down_pressed,
        };
        let newly_pressed = !*button;
        *button = true;
        newly_pressed
    }

    pub(crate) fn clear(&mut self, direction: CallDirection) {
        match direction {
            CallDirection::Up => self.up_pressed = false,
            CallDirection::Down => self.down_pressed = false,
        }
    }

    pub(crate) fn anyone_waiting_for(&self, direction: CallDirection) -> bool {
        self.waiting.iter().any(|p| p.direction() == direction)
    }
}

#[derive(Debug)]
pub struct Floor {
    number: FloorNumber,
    state: Mutex<FloorState>,
}

impl Floor {
    pub fn new(number: FloorNumber) -> Self {
        Self {
            number,
            state: Mutex::new(FloorState::default()),
        }
    }

    pub fn number(&self) -> FloorNumber {
        self.number
    }

    /// Floor-local exclusion. Held for a whole passenger exchange.
    pub(crate) fn lock(&self) -> MutexGuard<'_, FloorState> {
        self.state.lock()
    }

    /// Queue a new passenger and press the button they need.
    ///
    /// When that button was not already lit the new hall call is routed
    /// through `controller` before the floor is released, so an arriving
    /// unit never sees a pressed button without a call behind it.
    pub fn enqueue(&self, passenger: Arc<Passenger>, controller: &Controller) -> Result<Option<Routing>, RequestError> {
        let direction = passenger.direction();
        let mut state = self.state.lock();
        let id = passenger.id();
        state.waiting.push(passenger);
        if !state.press(direction) {
            return Ok(None);
        }
        info!("Passenger {} pressed {} on floor {}", id, direction, self.number);
        controller.route_hall_call(HallCall::new(self.number, direction)).map(Some)
    }

    pub fn is_pressed(&self, direction: CallDirection) -> bool {
        self.state.lock().is_pressed(direction)
    }

    pub fn waiting_count(&self) -> usize {
        self.state.lock().waiting.len()
    }

    pub fn waiting_ids(&self) -> Vec<PassengerId> {
        self.state.lock().waiting.iter().map(|p| p.id()).collect()
    }
}
