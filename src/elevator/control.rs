//! The unit's control task.
//!
//! Each unit runs [`ElevatorUnit::run`] on its own tokio task for the whole
//! simulation. The unit mutex is only held between suspension points, never
//! across an `.await`, and never while calling into a floor or the
//! controller.

use super::ElevatorUnit;
use crate::building::Building;
use crate::call::{Direction, FloorNumber, HallCall};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

impl ElevatorUnit {
    /// Serve requests until the unit has been stopped, has no stops left and
    /// is parked at its default floor.
    pub async fn run(self: Arc<Self>, building: Arc<Building>) {
        let idle_timeout = self.settings.idle_timeout;
        let default_floor = self.settings.default_floor;
        let mut remaining = idle_timeout;

        loop {
            if !self.lock().stops_remain() {
                building.controller().notify_idle(self.id);
            }

            let (has_stops, floor, running) = {
                let state = self.lock();
                (state.stops_remain(), state.current_floor(), state.running)
            };

            if has_stops {
                remaining = idle_timeout;
                self.travel(&building).await;
                continue;
            }

            if !running {
                if floor == default_floor {
                    let mut state = self.lock();
                    if state.stops_remain() {
                        continue;
                    }
                    state.retire();
                    break;
                }
                info!("Elevator {} stopping, returning to default floor {}", self.id, default_floor);
                self.return_to_default();
                continue;
            }

            if !self.lock().settle_idle() {
                // Admitted since the check above; keep its direction.
                continue;
            }
            let started = Instant::now();
            match timeout(remaining, self.wake.notified()).await {
                Ok(()) => {
                    remaining = remaining.saturating_sub(started.elapsed());
                }
                Err(_) => {
                    remaining = idle_timeout;
                    if floor != default_floor {
                        info!(
                            "Elevator {} idle timeout on floor {}, returning to default floor {}",
                            self.id, floor, default_floor
                        );
                        self.return_to_default();
                    }
                }
            }
        }

        info!("Elevator {} parked at floor {} and shut down", self.id, default_floor);
        building.controller().notify_finished();
    }

    fn return_to_default(&self) {
        let call = HallCall::up(self.settings.default_floor);
        if let Err(e) = self.assign_pickup(call) {
            warn!("Elevator {} could not return to default floor: {}", self.id, e);
        }
    }

    /// Move until no stops remain, reversing at the end of each sweep.
    async fn travel(&self, building: &Building) {
        loop {
            let direction = {
                let mut state = self.lock();
                if !state.stops_remain() {
                    break;
                }
                let current = state.current_floor();
                let direction = state.direction();
                if !direction.is_idle() && state.requests().any_ahead(current, direction) {
                    direction
                } else if state.requests().at(current) {
                    Direction::Idle
                } else {
                    let target = state.nearest_stop().unwrap_or(current);
                    let direction = Direction::toward(current, target);
                    state.set_direction(direction);
                    direction
                }
            };

            if direction.is_idle() {
                self.serve_stop(building).await;
            } else {
                self.sweep(building, direction).await;
            }
        }

        info!("Elevator {} has no requests", self.id);
    }

    /// One pass in `direction`, stopping wherever a request is outstanding.
    async fn sweep(&self, building: &Building, direction: Direction) {
        building.controller().notify_moving(self.id);

        loop {
            let stop_here = {
                let state = self.lock();
                state.requests().at(state.current_floor())
            };
            if stop_here {
                self.serve_stop(building).await;
            }

            let keep_going = {
                let state = self.lock();
                state.stops_remain()
                    && state.direction() == direction
                    && state.requests().any_ahead(state.current_floor(), direction)
            };
            if !keep_going {
                break;
            }

            sleep(self.settings.travel_time).await;

            let mut state = self.lock();
            let next = step(state.current_floor(), direction);
            state.set_floor(next);
            debug!("Elevator {} moved {} to floor {}", self.id, direction, next);
        }
    }

    /// Door cycle at the current floor.
    async fn serve_stop(&self, building: &Building) {
        let (floor, arrival, pickup) = {
            let mut state = self.lock();
            let floor = state.current_floor();
            let (car, hall) = state.clear_stop(floor);
            match (car, hall) {
                (true, true) => info!("Elevator {} rider and floor stop at floor {}", self.id, floor),
                (true, false) => info!("Elevator {} rider stop at floor {}", self.id, floor),
                _ => info!("Elevator {} floor stop at floor {}", self.id, floor),
            }

            let direction = state.direction();
            if !state.stops_remain() {
                state.set_direction(Direction::Idle);
            } else if !direction.is_idle() && !state.requests().any_ahead(floor, direction) {
                let target = state.nearest_stop().unwrap_or(floor);
                state.set_direction(Direction::toward(floor, target));
            }

            let pickup = state.pickup();
            let arrival = match pickup {
                Some(pickup) => Direction::from(pickup.direction),
                None => state.direction(),
            };
            (floor, arrival, pickup)
        };

        info!("Elevator {} doors open on floor {}", self.id, floor);
        match building.alert_floor(self, floor, arrival) {
            Ok(summary) => debug!(
                "Elevator {} exchange on floor {}: {} off, {} on",
                self.id,
                floor,
                summary.alighted.len(),
                summary.boarded.len()
            ),
            Err(e) => warn!("Elevator {} exchange on floor {} failed: {}", self.id, floor, e),
        }
        sleep(self.settings.door_time).await;
        info!("Elevator {} doors close on floor {}", self.id, floor);

        // A pickup committed while the doors were open is served on the next cycle.
        let mut state = self.lock();
        if pickup.map(|p| p.floor) == Some(floor) && state.pickup() == pickup {
            state.clear_pickup();
        }
    }
}

fn step(floor: FloorNumber, direction: Direction) -> FloorNumber {
    match direction {
        Direction::Up => floor + 1,
        Direction::Down => floor.saturating_sub(1),
        Direction::Idle => floor,
    }
}
