//! Passenger exchange between a unit and the floor it stopped at.
//!
//! The floor lock is held for the whole exchange: button clear, offload,
//! boarding, dropping the served call from the pending queue and the
//! re-press. A second unit arriving at the same floor waits
//! for it and then sees the floor in its final state.

use crate::call::{CallDirection, Direction, HallCall};
use crate::dispatch::Controller;
use crate::elevator::ElevatorUnit;
use crate::error::HandshakeError;
use crate::floor::Floor;
use crate::passenger::PassengerId;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

/// What happened during one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeSummary {
    /// Direction the unit boarded for, `None` when nobody could board.
    pub direction: Option<CallDirection>,
    pub alighted: Vec<PassengerId>,
    pub boarded: Vec<PassengerId>,
    /// The call button was pressed again for passengers left behind.
    pub repressed: bool,
}

/// Run the exchange for `unit` stopped at `floor`.
///
/// `arrival` is the unit's pickup direction, else its travel direction. An
/// `Idle` arrival boards in the direction of the first waiting passenger.
pub fn exchange(
    unit: &ElevatorUnit,
    floor: &Floor,
    arrival: Direction,
    controller: &Controller,
    now: Instant,
) -> Result<ExchangeSummary, HandshakeError> {
    let mut floor_state = floor.lock();
    let mut summary = ExchangeSummary::default();

    {
        let mut state = unit.lock();
        if state.current_floor() != floor.number() {
            return Err(HandshakeError::FloorMismatch {
                unit: unit.id(),
                unit_floor: state.current_floor(),
                floor: floor.number(),
            });
        }

        let direction = arrival
            .as_call()
            .or_else(|| floor_state.waiting.first().map(|p| p.direction()));
        if let Some(direction) = direction {
            floor_state.clear(direction);
        }
        summary.direction = direction;

        summary.alighted = state.unload(now).iter().map(|p| p.id()).collect();
        state.repress_destinations();

        if let Some(direction) = direction {
            let mut index = 0;
            while index < floor_state.waiting.len() && state.has_room() {
                if floor_state.waiting[index].direction() != direction {
                    index += 1;
                    continue;
                }
                let passenger = Arc::clone(&floor_state.waiting[index]);
                if !state.board(Arc::clone(&passenger), now) {
                    break;
                }
                floor_state.waiting.remove(index);
                summary.boarded.push(passenger.id());
            }
        }
    }
    // Still under the floor lock, so nobody can press the cleared button
    // and route the call again before it leaves the pending queue.
    if let Some(direction) = summary.direction {
        controller.pending().cancel(HallCall::new(floor.number(), direction));
    }
    unit.wake();

    if let Some(direction) = summary.direction {
        if floor_state.anyone_waiting_for(direction) && floor_state.press(direction) {
            info!(
                "Floor {} {} button pressed again, elevator {} is full",
                floor.number(),
                direction,
                unit.id()
            );
            summary.repressed = true;
            if let Err(e) = controller.route_hall_call(HallCall::new(floor.number(), direction)) {
                warn!("Could not route call from floor {}: {}", floor.number(), e);
            }
        }
    }

    Ok(summary)
}
