use super::selector::claim_en_route;
use crate::call::HallCall;
use crate::config::ProcessorKind;
use crate::elevator::{Admission, ElevatorUnit, RequestKind};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

/// Holds hall calls no unit could take when they were made.
pub trait PendingProcessor: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn add_pending_call(&self, call: HallCall);

    /// Drop `call` once its button has been cleared by a unit serving the
    /// floor. Returns true if it was pending.
    fn cancel(&self, call: HallCall) -> bool;

    /// Hand the oldest pending call to a unit that just went idle.
    fn begin_pickup(&self, unit: &ElevatorUnit) -> Option<HallCall>;

    /// Claim every pending call a unit that just started moving can absorb.
    fn check_pending(&self, unit: &ElevatorUnit) -> Vec<HallCall>;

    fn is_pending(&self, call: HallCall) -> bool;

    /// Snapshot in insertion order.
    fn pending_calls(&self) -> Vec<HallCall>;
}

pub fn build_processor(kind: ProcessorKind) -> Box<dyn PendingProcessor> {
    match kind {
        ProcessorKind::Standard => Box::new(StandardProcessor::default()),
    }
}

#[derive(Debug, Default)]
pub struct StandardProcessor {
    calls: Mutex<VecDeque<HallCall>>,
}

impl PendingProcessor for StandardProcessor {
    fn name(&self) -> &'static str {
        "Standard"
    }

    fn add_pending_call(&self, call: HallCall) {
        let mut calls = self.calls.lock();
        if calls.contains(&call) {
            debug!("Call {} is already pending", call);
            return;
        }
        calls.push_back(call);
        info!("Call {} queued as pending ({} pending)", call, calls.len());
    }

    fn cancel(&self, call: HallCall) -> bool {
        let mut calls = self.calls.lock();
        let before = calls.len();
        calls.retain(|&pending| pending != call);
        let cancelled = calls.len() != before;
        if cancelled {
            debug!("Pending call {} served at the floor ({} pending)", call, calls.len());
        }
        cancelled
    }

    fn begin_pickup(&self, unit: &ElevatorUnit) -> Option<HallCall> {
        let mut calls = self.calls.lock();
        let call = calls.pop_front()?;

        let admission = {
            let mut state = unit.lock();
            if state.is_retired() {
                Ok(Admission::Rejected)
            } else {
                state.set_pickup(call);
                state.admit(RequestKind::Hall, call.floor)
            }
        };

        match admission {
            Ok(Admission::Admitted) => {
                drop(calls);
                unit.wake();
                info!("Elevator {} took pending call {}", unit.id(), call);
                Some(call)
            }
            Ok(Admission::Rejected) => {
                calls.push_front(call);
                None
            }
            Err(e) => {
                warn!("Dropping pending call {}: {}", call, e);
                None
            }
        }
    }

    fn check_pending(&self, unit: &ElevatorUnit) -> Vec<HallCall> {
        let mut calls = self.calls.lock();
        if calls.is_empty() {
            return Vec::new();
        }

        let mut claimed = Vec::new();
        {
            let mut state = unit.lock();
            calls.retain(|&call| {
                let absorbed = claim_en_route(&mut state, call)
                    && matches!(state.admit(RequestKind::Hall, call.floor), Ok(Admission::Admitted));
                if absorbed {
                    claimed.push(call);
                }
                !absorbed
            });
        }
        drop(calls);

        if !claimed.is_empty() {
            unit.wake();
            for call in &claimed {
                info!("Elevator {} absorbed pending call {}", unit.id(), call);
            }
        }
        claimed
    }

    fn is_pending(&self, call: HallCall) -> bool {
        self.calls.lock().contains(&call)
    }

    fn pending_calls(&self) -> Vec<HallCall> {
        self.calls.lock().iter().copied().collect()
    }
}
