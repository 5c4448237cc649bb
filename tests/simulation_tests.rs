use elevsim::call::Direction;
use elevsim::elevator::UnitId;
use elevsim::producer::PassengerProducer;
use elevsim::{Building, SimConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn small_config() -> SimConfig {
    let mut config = SimConfig {
        floors: 6,
        elevators: 2,
        door_time_ms: 500,
        travel_time_ms: 500,
        default_floor: 1,
        idle_timeout_ms: 3_000,
        max_capacity: 3,
        ..SimConfig::default()
    };
    config.production.people_per_minute = 60;
    config.production.duration_ms = 20_000;
    config.production.seed = Some(7);
    config
}

#[tokio::test(start_paused = true)]
async fn test_single_trip_then_return_to_default_floor() {
    let config = SimConfig {
        floors: 2,
        elevators: 1,
        max_capacity: 5,
        default_floor: 1,
        door_time_ms: 500,
        travel_time_ms: 500,
        idle_timeout_ms: 15_000,
        ..SimConfig::default()
    };
    let building = Building::new(config).unwrap();
    let tasks = building.start();
    let unit = Arc::clone(building.controller().unit(UnitId(1)).unwrap());

    let passenger = building.add_passenger(1, 2).unwrap();

    // Boards at once, rides one floor, unit goes idle at floor 2
    sleep(Duration::from_secs(5)).await;
    assert!(passenger.has_arrived());
    // One door cycle at floor 1 plus one floor of travel
    assert!(passenger.wait_time().unwrap() < Duration::from_millis(10));
    let ride = passenger.ride_time().unwrap();
    assert!(ride >= Duration::from_millis(1000) && ride < Duration::from_millis(1010));
    assert_eq!(unit.current_floor(), 2);
    assert_eq!(unit.direction(), Direction::Idle);
    assert_eq!(unit.rider_count(), 0);

    // After the idle timeout it heads back to the default floor
    sleep(Duration::from_secs(20)).await;
    assert_eq!(unit.current_floor(), 1);
    assert_eq!(unit.direction(), Direction::Idle);
    assert!(unit.pickup().is_none());

    building.end_production();
    let report = building.wait_for_completion().await;
    assert_eq!(report.total_passengers, 1);
    assert_eq!(report.unserved, 0);
    assert!(unit.is_retired());

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_second_passenger_served_after_full_unit_leaves() {
    let config = SimConfig {
        floors: 5,
        elevators: 1,
        max_capacity: 1,
        default_floor: 1,
        ..SimConfig::default()
    };
    let building = Building::new(config).unwrap();
    let tasks = building.start();

    let first = building.add_passenger(1, 4).unwrap();
    let second = building.add_passenger(1, 5).unwrap();

    building.end_production();
    let report = building.wait_for_completion().await;

    assert_eq!(report.unserved, 0);
    assert!(first.has_arrived());
    assert!(second.has_arrived());
    assert!(second.wait_time().unwrap() > first.wait_time().unwrap());
    assert!(building.controller().pending_calls().is_empty());

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_seeded_run_serves_everyone_within_capacity() {
    let config = small_config();
    let capacity = config.max_capacity;
    let building = Building::new(config).unwrap();
    let tasks = building.start();

    let monitor = {
        let building = Arc::clone(&building);
        tokio::spawn(async move {
            let mut most = 0;
            while !building.controller().is_complete() {
                for unit in building.controller().units() {
                    most = most.max(unit.rider_count());
                }
                sleep(Duration::from_millis(50)).await;
            }
            most
        })
    };

    let produced = PassengerProducer::new(Arc::clone(&building)).run().await;
    let report = building.wait_for_completion().await;

    assert!((19..=21).contains(&produced));
    assert_eq!(report.total_passengers, produced);
    assert_eq!(report.unserved, 0);
    assert!(monitor.await.unwrap() <= capacity);

    // Completion means every unit parked and nothing is left behind
    let controller = building.controller();
    assert_eq!(controller.finished_count(), 2);
    assert!(controller.pending_calls().is_empty());
    for unit in controller.units() {
        assert!(unit.is_retired());
        assert_eq!(unit.current_floor(), 1);
        assert_eq!(unit.rider_count(), 0);
    }
    for floor in 1..=6 {
        assert_eq!(building.floor(floor).unwrap().waiting_count(), 0);
    }

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_same_trips() {
    let building = Building::new(small_config()).unwrap();
    let mut a = PassengerProducer::new(Arc::clone(&building));
    let mut b = PassengerProducer::new(Arc::clone(&building));

    for _ in 0..50 {
        let trip = a.next_trip();
        assert_eq!(trip, b.next_trip());
        assert_ne!(trip.0, trip.1);
        assert!((1..=6).contains(&trip.0));
        assert!((1..=6).contains(&trip.1));
    }
    assert_eq!(a.interval(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_run_end_to_end() {
    let mut config = small_config();
    config.production.duration_ms = 5_000;

    let report = Building::run(config).await.unwrap();
    assert!(report.total_passengers >= 4);
    assert_eq!(report.unserved, 0);
    assert_eq!(report.wait_by_floor.len(), 6);
    assert!(report.passengers.iter().all(|p| p.total_ms().is_some()));
}

#[tokio::test(start_paused = true)]
async fn test_retired_units_are_never_selected() {
    let config = SimConfig { floors: 4, elevators: 2, ..SimConfig::default() };
    let building = Building::new(config).unwrap();
    let tasks = building.start();

    building.end_production();
    building.wait_for_completion().await;
    for task in tasks {
        task.await.unwrap();
    }

    let routing = building.controller().route_hall_call(elevsim::HallCall::up(2)).unwrap();
    assert_eq!(routing, elevsim::Routing::Pending);
    assert_eq!(building.controller().finished_count(), 2);
}
