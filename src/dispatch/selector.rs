use crate::call::{Direction, HallCall};
use crate::config::SelectorKind;
use crate::elevator::{ElevatorUnit, UnitId, UnitState};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Chooses which unit of the fleet serves a new hall call.
///
/// A selector commits the unit it returns to the call as a pickup. Adding
/// the hall request itself is left to the caller.
pub trait ElevatorSelector: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn select(&self, units: &[Arc<ElevatorUnit>], call: HallCall) -> Option<UnitId>;
}

pub fn build_selector(kind: SelectorKind) -> Box<dyn ElevatorSelector> {
    match kind {
        SelectorKind::Standard => Box::new(StandardSelector),
    }
}

/// Directional selection in three passes over the fleet, in fleet order:
/// units on a matching pickup, then units already moving the right way,
/// then idle units.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardSelector;

impl ElevatorSelector for StandardSelector {
    fn name(&self) -> &'static str {
        "Standard"
    }

    fn select(&self, units: &[Arc<ElevatorUnit>], call: HallCall) -> Option<UnitId> {
        let passes: [(&str, fn(&mut UnitState, HallCall) -> bool); 3] = [
            ("pickup extension", extend_pickup),
            ("in motion", join_in_motion),
            ("idle", take_idle),
        ];

        for (pass, claim) in passes {
            for unit in units {
                let mut state = unit.lock();
                if state.is_retired() {
                    continue;
                }
                if claim(&mut state, call) {
                    debug!("Selector chose elevator {} ({}) for {}", unit.id(), pass, call);
                    return Some(unit.id());
                }
            }
        }

        debug!("Selector found no elevator for {}", call);
        None
    }
}

/// Whether a unit can absorb `call` on its current run, committing it if so.
pub(crate) fn claim_en_route(state: &mut UnitState, call: HallCall) -> bool {
    !state.is_retired() && (extend_pickup(state, call) || join_in_motion(state, call))
}

/// Units already on a pickup heading the same way as the call, that have
/// not passed the call's floor. The pickup target moves to the farther floor.
fn extend_pickup(state: &mut UnitState, call: HallCall) -> bool {
    let direction = Direction::from(call.direction);
    let pickup = match state.pickup() {
        Some(pickup) => pickup,
        None => return false,
    };
    if pickup.direction != call.direction
        || state.direction() != direction
        || !direction.is_ahead(state.current_floor(), call.floor)
    {
        return false;
    }
    if pickup.is_farther(call.floor) {
        state.set_pickup(call);
    }
    true
}

/// Moving units without a pickup, heading the call's way and not past it.
fn join_in_motion(state: &mut UnitState, call: HallCall) -> bool {
    let direction = Direction::from(call.direction);
    if state.pickup().is_some() || state.direction() != direction || !direction.is_ahead(state.current_floor(), call.floor) {
        return false;
    }
    state.set_pickup(call);
    true
}

fn take_idle(state: &mut UnitState, call: HallCall) -> bool {
    if state.pickup().is_some() || !state.direction().is_idle() {
        return false;
    }
    state.set_pickup(call);
    true
}
