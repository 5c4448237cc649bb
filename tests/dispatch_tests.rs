use elevsim::call::{Direction, HallCall};
use elevsim::dispatch::{Controller, Routing};
use elevsim::elevator::{Admission, UnitId};
use elevsim::error::RequestError;
use elevsim::SimConfig;

fn controller(elevators: u32) -> Controller {
    let config = SimConfig {
        floors: 12,
        elevators,
        default_floor: 1,
        ..SimConfig::default()
    };
    Controller::new(&config).expect("valid config")
}

#[test]
fn test_fleet_is_built_in_order() {
    let controller = controller(3);
    let ids: Vec<UnitId> = controller.units().iter().map(|u| u.id()).collect();
    assert_eq!(ids, vec![UnitId(1), UnitId(2), UnitId(3)]);
    assert_eq!(controller.selector().name(), "Standard");
    assert_eq!(controller.pending().name(), "Standard");
    assert!(matches!(controller.unit(UnitId(4)), Err(RequestError::UnknownUnit(UnitId(4)))));
}

#[test]
fn test_idle_unit_takes_call_and_heads_for_it() {
    let controller = controller(2);

    // Pass 3: the first idle unit in fleet order
    let routing = controller.route_hall_call(HallCall::down(6)).unwrap();
    assert_eq!(routing, Routing::Assigned(UnitId(1)));

    let unit = controller.unit(UnitId(1)).unwrap();
    assert_eq!(unit.pickup(), Some(HallCall::down(6)));
    assert_eq!(unit.direction(), Direction::Up);
    assert_eq!(unit.snapshot().stops, vec![6]);

    // The second call skips the committed unit
    let routing = controller.route_hall_call(HallCall::up(3)).unwrap();
    assert_eq!(routing, Routing::Assigned(UnitId(2)));
}

#[test]
fn test_moving_unit_preferred_over_idle_unit() {
    let controller = controller(3);

    // Unit 2 is moving up with a rider and no pickup
    controller.press_car_button(UnitId(2), 9).unwrap();

    // Pass 2 picks the moving unit even though unit 1 is idle and first in order
    let routing = controller.route_hall_call(HallCall::up(5)).unwrap();
    assert_eq!(routing, Routing::Assigned(UnitId(2)));
    let unit = controller.unit(UnitId(2)).unwrap();
    assert_eq!(unit.pickup(), Some(HallCall::up(5)));
    assert_eq!(unit.snapshot().stops, vec![5, 9]);

    assert_eq!(controller.unit(UnitId(1)).unwrap().pickup(), None);
}

#[test]
fn test_pickup_unit_extends_to_farther_floor() {
    let controller = controller(3);

    controller.press_car_button(UnitId(1), 10).unwrap();
    assert_eq!(controller.route_hall_call(HallCall::up(3)).unwrap(), Routing::Assigned(UnitId(1)));

    // Pass 1: same direction, not yet passed, farther than the current target
    assert_eq!(controller.route_hall_call(HallCall::up(5)).unwrap(), Routing::Assigned(UnitId(1)));
    let unit = controller.unit(UnitId(1)).unwrap();
    assert_eq!(unit.pickup(), Some(HallCall::up(5)));

    // A nearer call is claimed without moving the target back
    assert_eq!(controller.route_hall_call(HallCall::up(4)).unwrap(), Routing::Assigned(UnitId(1)));
    assert_eq!(unit.pickup(), Some(HallCall::up(5)));
    assert_eq!(unit.snapshot().stops, vec![3, 4, 5, 10]);
}

#[test]
fn test_unmatched_call_goes_pending_once() {
    let controller = controller(1);
    controller.press_car_button(UnitId(1), 9).unwrap();

    // Moving up, so a down call has no taker
    assert_eq!(controller.route_hall_call(HallCall::down(5)).unwrap(), Routing::Pending);
    assert_eq!(controller.route_hall_call(HallCall::down(5)).unwrap(), Routing::Pending);
    assert_eq!(controller.pending_calls(), vec![HallCall::down(5)]);

    // And the unit never received it as a stop
    assert_eq!(controller.unit(UnitId(1)).unwrap().snapshot().stops, vec![9]);
}

#[test]
fn test_pending_call_is_not_assigned_again() {
    let controller = controller(2);
    controller.pending().add_pending_call(HallCall::up(4));

    // Both units are idle, but the call already waits in the queue
    assert_eq!(controller.route_hall_call(HallCall::up(4)).unwrap(), Routing::Pending);
    assert_eq!(controller.pending_calls(), vec![HallCall::up(4)]);
    assert!(controller.units().iter().all(|unit| unit.pickup().is_none()));

    assert!(controller.pending().cancel(HallCall::up(4)));
    assert!(!controller.pending().cancel(HallCall::up(4)));
    assert_eq!(controller.route_hall_call(HallCall::up(4)).unwrap(), Routing::Assigned(UnitId(1)));
    assert!(controller.pending_calls().is_empty());
}

#[test]
fn test_out_of_range_calls_are_errors() {
    let controller = controller(1);
    assert_eq!(
        controller.route_hall_call(HallCall::up(0)),
        Err(RequestError::FloorOutOfRange { floor: 0, floors: 12 })
    );
    assert_eq!(
        controller.press_car_button(UnitId(1), 13),
        Err(RequestError::FloorOutOfRange { floor: 13, floors: 12 })
    );
    assert!(controller.pending_calls().is_empty());
}

#[test]
fn test_begin_pickup_is_fifo_regardless_of_fit() {
    let controller = controller(3);
    let calls = [HallCall::up(5), HallCall::down(9), HallCall::up(2)];
    for call in calls {
        controller.pending().add_pending_call(call);
    }

    for (index, call) in calls.iter().enumerate() {
        let id = UnitId(index as u32 + 1);
        assert_eq!(controller.notify_idle(id), Some(*call));
        assert_eq!(controller.unit(id).unwrap().pickup(), Some(*call));
    }

    assert!(controller.pending_calls().is_empty());
    assert_eq!(controller.notify_idle(UnitId(1)), None);
}

#[test]
fn test_check_pending_absorbs_every_compatible_call() {
    let controller = controller(2);
    controller.press_car_button(UnitId(1), 10).unwrap();

    for call in [HallCall::up(3), HallCall::down(6), HallCall::up(7), HallCall::up(1)] {
        controller.pending().add_pending_call(call);
    }

    let claimed = controller.notify_moving(UnitId(1));
    assert_eq!(claimed, vec![HallCall::up(3), HallCall::up(7)]);
    assert_eq!(controller.pending_calls(), vec![HallCall::down(6), HallCall::up(1)]);

    let unit = controller.unit(UnitId(1)).unwrap();
    assert_eq!(unit.pickup(), Some(HallCall::up(7)));
    assert_eq!(unit.snapshot().stops, vec![3, 7, 10]);
}

#[test]
fn test_check_pending_on_idle_unit_claims_nothing() {
    let controller = controller(1);
    controller.pending().add_pending_call(HallCall::up(4));

    assert!(controller.notify_moving(UnitId(1)).is_empty());
    assert_eq!(controller.pending_calls(), vec![HallCall::up(4)]);
}

#[test]
fn test_admission_rules_through_controller() {
    let controller = controller(1);

    // Idle admits anything and takes its direction from it
    assert_eq!(controller.press_car_button(UnitId(1), 6), Ok(Admission::Admitted));
    assert_eq!(controller.unit(UnitId(1)).unwrap().direction(), Direction::Up);

    // Moving up only admits floors strictly above
    assert_eq!(controller.press_car_button(UnitId(1), 1), Ok(Admission::Rejected));
    assert_eq!(controller.press_car_button(UnitId(1), 8), Ok(Admission::Admitted));
    assert_eq!(controller.unit(UnitId(1)).unwrap().snapshot().stops, vec![6, 8]);
}

#[test]
fn test_completion_fires_exactly_once() {
    let controller = controller(3);
    let completion = controller.subscribe_completion();

    assert!(!controller.notify_finished());
    assert!(!controller.notify_finished());
    assert!(!controller.is_complete());
    assert!(controller.notify_finished());

    assert_eq!(controller.finished_count(), 3);
    assert!(controller.is_complete());
    assert!(*completion.borrow());
}

#[test]
fn test_shutdown_stops_every_unit() {
    let controller = controller(3);
    controller.shutdown();
    assert!(controller.units().iter().all(|unit| !unit.is_running()));
}
