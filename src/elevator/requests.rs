use crate::call::{Direction, FloorNumber};
use serde::{Deserialize, Serialize};

/// Which set a stop request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Destination pressed by a rider inside the cab.
    Car,
    /// Stop assigned by the controller for a hall call.
    Hall,
}

/// Outstanding stops of one unit, one flag per floor and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequests {
    car: Vec<bool>,
    hall: Vec<bool>,
}

impl StopRequests {
    pub fn new(floors: FloorNumber) -> Self {
        Self {
            car: vec![false; floors as usize],
            hall: vec![false; floors as usize],
        }
    }

    pub fn floors(&self) -> FloorNumber {
        self.car.len() as FloorNumber
    }

    fn index(floor: FloorNumber) -> usize {
        floor as usize - 1
    }

    /// Callers validate `floor` against [`StopRequests::floors`] first.
    pub fn set(&mut self, kind: RequestKind, floor: FloorNumber) {
        let index = Self::index(floor);
        match kind {
            RequestKind::Car => self.car[index] = true,
            RequestKind::Hall => self.hall[index] = true,
        }
    }

    pub fn has(&self, kind: RequestKind, floor: FloorNumber) -> bool {
        let index = Self::index(floor);
        match kind {
            RequestKind::Car => self.car[index],
            RequestKind::Hall => self.hall[index],
        }
    }

    pub fn at(&self, floor: FloorNumber) -> bool {
        self.has(RequestKind::Car, floor) || self.has(RequestKind::Hall, floor)
    }

    /// Clear both flags for `floor`, returning which were set as `(car, hall)`.
    pub fn clear(&mut self, floor: FloorNumber) -> (bool, bool) {
        let index = Self::index(floor);
        let cleared = (self.car[index], self.hall[index]);
        self.car[index] = false;
        self.hall[index] = false;
        cleared
    }

    pub fn any(&self) -> bool {
        self.car.iter().chain(self.hall.iter()).any(|&set| set)
    }

    pub fn any_ahead(&self, current: FloorNumber, direction: Direction) -> bool {
        self.floors_with_stops().any(|floor| direction.is_ahead(current, floor))
    }

    /// Lowest floor with an outstanding stop.
    pub fn first(&self) -> Option<FloorNumber> {
        self.floors_with_stops().next()
    }

    pub fn floors_with_stops(&self) -> impl Iterator<Item = FloorNumber> + '_ {
        (1..=self.floors()).filter(move |&floor| self.at(floor))
    }
}
