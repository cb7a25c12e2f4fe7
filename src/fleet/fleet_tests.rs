/*
 * Unit tests for the fleet
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - test_nearest_idle_car_is_assigned
 * - test_en_route_call_reorders_stops
 * - test_passed_floor_goes_to_idle_car
 * - test_no_cars_registered
 * - test_failed_call_leaves_no_pending_entry
 * - test_invalid_floors_are_rejected
 * - test_unknown_car_is_rejected
 * - test_repeated_hall_call_keeps_request
 * - test_ride_from_hall_call_to_destination
 * - test_immediate_arrival_reported_on_next_advance
 * - test_advance_steps_cars_in_id_order
 * - test_request_committed_to_one_car_only
 * - test_fleet_invariants_under_random_calls
 * - test_turnaround_keeps_other_cars_hall_call
 * - test_served_requests_are_not_kept_forever
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod fleet_tests {
    use crate::config::Config;
    use crate::error::DispatchError;
    use crate::fleet::{Fleet, RequestStatus, SERVED_HISTORY};
    use crate::shared::CallDirection::{Down, Up};
    use crate::shared::Direction;
    use crate::shared::{ArrivalEvent, CarId, DoorState};

    fn setup_fleet(floors: &[i32]) -> Fleet {
        let mut fleet = Fleet::new(&Config::default());
        for floor in floors {
            fleet.register_car(*floor).unwrap();
        }
        fleet
    }

    fn advance_until_arrival(fleet: &mut Fleet, max_ticks: u32) -> ArrivalEvent {
        for _ in 0..max_ticks {
            if let Some(event) = fleet.advance().first() {
                return *event;
            }
        }
        panic!("no arrival within {} ticks", max_ticks);
    }

    #[test]
    fn test_nearest_idle_car_is_assigned() {
        // Purpose: Cars at 0 and 10, up call at 3 goes to the car at 0

        // Arrange
        let mut fleet = setup_fleet(&[0, 10]);

        // Act
        let id = fleet.submit_hall_call(3, Up).unwrap();

        // Assert
        assert_eq!(fleet.request_status(id), Some(RequestStatus::Assigned(CarId(0))));
        assert_eq!(fleet.car(CarId(0)).unwrap().stops(), vec![3]);
        assert!(fleet.car(CarId(1)).unwrap().stops().is_empty());
    }

    #[test]
    fn test_en_route_call_reorders_stops() {
        // Purpose: A car going up to 8 picks up an up call at 4 first

        // Arrange
        let mut fleet = setup_fleet(&[0]);
        fleet.submit_car_call(CarId(0), 8).unwrap();

        // Act
        let id = fleet.submit_hall_call(4, Up).unwrap();

        // Assert
        assert_eq!(fleet.request_status(id), Some(RequestStatus::Assigned(CarId(0))));
        assert_eq!(fleet.car(CarId(0)).unwrap().stops(), vec![4, 8]);
    }

    #[test]
    fn test_passed_floor_goes_to_idle_car() {
        // Purpose: A car at 5 going up to 8 has passed floor 4, the idle car takes the call

        // Arrange
        let mut fleet = setup_fleet(&[0]);
        fleet.submit_car_call(CarId(0), 8).unwrap();
        for _ in 0..5 {
            fleet.advance();
        }
        fleet.register_car(10).unwrap();
        assert_eq!(fleet.car(CarId(0)).unwrap().position(), 5);

        // Act
        let id = fleet.submit_hall_call(4, Up).unwrap();

        // Assert
        assert_eq!(fleet.request_status(id), Some(RequestStatus::Assigned(CarId(1))));
        assert_eq!(fleet.car(CarId(0)).unwrap().stops(), vec![8]);
    }

    #[test]
    fn test_no_cars_registered() {
        // Purpose: A hall call with no registered cars fails

        // Arrange
        let mut fleet = setup_fleet(&[]);

        // Act
        let result = fleet.submit_hall_call(3, Up);

        // Assert
        assert_eq!(result, Err(DispatchError::NoCarsAvailable));
    }

    #[test]
    fn test_failed_call_leaves_no_pending_entry() {
        // Purpose: A rejected call can be submitted again once a car exists

        // Arrange
        let mut fleet = setup_fleet(&[]);
        let _ = fleet.submit_hall_call(3, Up);

        // Act
        let pending_after_failure = fleet.station(3).unwrap().pending_request(Up);
        fleet.register_car(0).unwrap();
        let retry = fleet.submit_hall_call(3, Up);

        // Assert
        assert_eq!(pending_after_failure, None);
        assert!(retry.is_ok());
        assert_eq!(fleet.car(CarId(0)).unwrap().stops(), vec![3]);
    }

    #[test]
    fn test_invalid_floors_are_rejected() {
        // Purpose: Floors outside the building never reach a car

        // Arrange
        let mut fleet = setup_fleet(&[0]);

        // Act
        let hall = fleet.submit_hall_call(11, Down);
        let cab = fleet.submit_car_call(CarId(0), -1);
        let register = fleet.register_car(42);

        // Assert
        assert_eq!(hall, Err(DispatchError::InvalidFloor { floor: 11, min: 0, max: 10 }));
        assert_eq!(cab, Err(DispatchError::InvalidFloor { floor: -1, min: 0, max: 10 }));
        assert!(register.is_err());
        assert!(fleet.car(CarId(0)).unwrap().stops().is_empty());
        assert_eq!(fleet.cars().len(), 1);
    }

    #[test]
    fn test_unknown_car_is_rejected() {
        // Purpose: A car call for an unregistered car fails immediately

        // Arrange
        let mut fleet = setup_fleet(&[0]);

        // Act
        let result = fleet.submit_car_call(CarId(3), 5);

        // Assert
        assert_eq!(result, Err(DispatchError::UnknownCar(CarId(3))));
    }

    #[test]
    fn test_repeated_hall_call_keeps_request() {
        // Purpose: Pressing a pending button again returns the same request without re-scoring

        // Arrange
        let mut fleet = setup_fleet(&[0, 10]);
        let first = fleet.submit_hall_call(6, Down).unwrap();

        // Act
        let second = fleet.submit_hall_call(6, Down).unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(fleet.car(CarId(1)).unwrap().stops(), vec![6]);
        assert!(fleet.car(CarId(0)).unwrap().stops().is_empty());
    }

    #[test]
    fn test_ride_from_hall_call_to_destination() {
        // Purpose: Hall call, arrival clears the station, rider's car call is served

        // Arrange
        let mut fleet = setup_fleet(&[0]);
        let hall = fleet.submit_hall_call(3, Up).unwrap();

        // Act
        let pickup = advance_until_arrival(&mut fleet, 10);
        let pending_after_pickup = fleet.station(3).unwrap().pending_request(Up);
        let ride = fleet.submit_car_call(pickup.car_id, 7).unwrap();
        let dropoff = advance_until_arrival(&mut fleet, 20);

        // Assert
        assert_eq!(pickup, ArrivalEvent { car_id: CarId(0), floor: 3, direction: Direction::Idle });
        assert_eq!(pending_after_pickup, None);
        assert_eq!(fleet.request_status(hall), Some(RequestStatus::Served(CarId(0))));
        assert_eq!(dropoff.floor, 7);
        assert_eq!(fleet.request_status(ride), Some(RequestStatus::Served(CarId(0))));
    }

    #[test]
    fn test_immediate_arrival_reported_on_next_advance() {
        // Purpose: A call at an idle car's floor is answered at once and reported by the next tick

        // Arrange
        let mut fleet = setup_fleet(&[2]);

        // Act
        let id = fleet.submit_hall_call(2, Down).unwrap();
        let status = fleet.request_status(id);
        let events = fleet.advance();

        // Assert
        assert_eq!(status, Some(RequestStatus::Served(CarId(0))));
        assert_eq!(
            events,
            vec![ArrivalEvent { car_id: CarId(0), floor: 2, direction: Direction::Idle }]
        );
        assert_eq!(fleet.car(CarId(0)).unwrap().door_state(), DoorState::Open);
    }

    #[test]
    fn test_advance_steps_cars_in_id_order() {
        // Purpose: Arrivals within one tick are reported in car id order

        // Arrange
        let mut fleet = setup_fleet(&[5, 0]);
        fleet.submit_car_call(CarId(1), 1).unwrap();
        fleet.submit_car_call(CarId(0), 6).unwrap();

        // Act
        let events = fleet.advance();

        // Assert
        let cars: Vec<CarId> = events.iter().map(|event| event.car_id).collect();
        assert_eq!(cars, vec![CarId(0), CarId(1)]);
        assert_eq!(fleet.tick(), 1);
    }

    #[test]
    fn test_request_committed_to_one_car_only() {
        // Purpose: Each hall call lands in exactly one car's stops

        // Arrange
        let mut fleet = setup_fleet(&[0, 5, 10]);

        // Act
        for floor in [1, 4, 7, 9] {
            fleet.submit_hall_call(floor, Up).unwrap();
        }

        // Assert
        for floor in [1, 4, 7, 9] {
            let holders = fleet
                .cars()
                .iter()
                .filter(|car| car.stops().contains(&floor))
                .count();
            assert_eq!(holders, 1, "floor {} held by {} cars", floor, holders);
        }
    }

    #[test]
    fn test_fleet_invariants_under_random_calls() {
        // Purpose: Every car keeps its invariants on every tick and all calls are eventually served

        // Arrange
        let mut fleet = setup_fleet(&[0, 5, 10]);
        let mut seed: u64 = 0xe1e7;
        let mut next = move |bound: u64| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };
        let mut submitted = Vec::new();

        // Act + Assert
        for tick in 0..3000 {
            if tick < 800 && next(2) == 0 {
                let floor = next(11) as i32;
                let id = match next(3) {
                    0 => fleet.submit_hall_call(floor, Up),
                    1 => fleet.submit_hall_call(floor, Down),
                    _ => fleet.submit_car_call(CarId(next(3) as u32), floor),
                };
                submitted.push(id.unwrap());
            }

            let before: Vec<(i32, DoorState)> = fleet
                .cars()
                .iter()
                .map(|car| (car.position(), car.door_state()))
                .collect();
            fleet.advance();

            for (car, (position, door)) in fleet.cars().iter().zip(before) {
                let moved = (car.position() - position).abs();
                assert!(moved <= 1);
                if moved == 1 {
                    assert_eq!(door, DoorState::Closed);
                }
                assert_eq!(car.direction() == Direction::Idle, !car.has_stops());
            }
        }

        assert!(fleet.is_idle());
        assert_eq!(fleet.open_requests(), 0);
        for id in submitted {
            assert!(!matches!(fleet.request_status(id), Some(RequestStatus::Assigned(_))));
        }
    }

    #[test]
    fn test_turnaround_keeps_other_cars_hall_call() {
        // Purpose: A car reversing at a floor clears only the direction it leaves in

        // Arrange
        let mut fleet = setup_fleet(&[3, 6]);
        fleet.submit_car_call(CarId(0), 5).unwrap();
        fleet.submit_car_call(CarId(0), 1).unwrap();
        fleet.submit_car_call(CarId(1), 6).unwrap(); // holds car 1's doors open at 6
        let up = fleet.submit_hall_call(5, Up).unwrap();
        assert_eq!(fleet.request_status(up), Some(RequestStatus::Assigned(CarId(1))));

        // Act
        fleet.advance();
        let events = fleet.advance();
        let pending_after_turnaround = fleet.station(5).unwrap().pending_request(Up);
        let status_after_turnaround = fleet.request_status(up);
        let pickup = loop {
            match fleet.advance().into_iter().find(|event| event.car_id == CarId(1)) {
                Some(event) => break event,
                None => assert!(fleet.tick() < 30, "car 1 never reached floor 5"),
            }
        };

        // Assert
        assert_eq!(
            events,
            vec![ArrivalEvent { car_id: CarId(0), floor: 5, direction: Direction::Down }]
        );
        assert_eq!(fleet.car(CarId(0)).unwrap().stops(), vec![1]);
        assert_eq!(pending_after_turnaround, Some(up));
        assert_eq!(status_after_turnaround, Some(RequestStatus::Assigned(CarId(1))));
        assert_eq!(pickup.floor, 5);
        assert_eq!(fleet.request_status(up), Some(RequestStatus::Served(CarId(1))));
        assert_eq!(fleet.station(5).unwrap().pending_request(Up), None);
    }

    #[test]
    fn test_served_requests_are_not_kept_forever() {
        // Purpose: A long run only remembers the most recent served requests

        // Arrange
        let mut fleet = setup_fleet(&[0]);
        let mut ids = Vec::new();

        // Act
        for ride in 0..1000 {
            let floor = if ride % 2 == 0 { 5 } else { 0 };
            ids.push(fleet.submit_car_call(CarId(0), floor).unwrap());
            for _ in 0..50 {
                if fleet.is_idle() {
                    break;
                }
                fleet.advance();
            }
        }

        // Assert
        assert_eq!(fleet.open_requests(), 0);
        assert_eq!(fleet.request_status(ids[0]), None);
        assert_eq!(
            fleet.request_status(ids[ids.len() - SERVED_HISTORY]),
            Some(RequestStatus::Served(CarId(0)))
        );
        assert_eq!(
            fleet.request_status(ids[999]),
            Some(RequestStatus::Served(CarId(0)))
        );
    }
}
