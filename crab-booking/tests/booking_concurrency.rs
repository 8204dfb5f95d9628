//! 并发准入测试
//!
//! 大量用户同时抢同一个 (日期, 时段)，有效预订总人数不得超过容量。
//! 通知 worker 不启动，队列很快被填满：确认入队失败不影响预订。
//! 时段删除/改时间与预订并发时，活跃预订不得指向已删除或已改时间的时段。

use chrono::Duration;
use crab_booking::booking::{BookingError, local_today};
use crab_booking::{Config, ServerState};
use shared::models::{
    BookingRequest, RestaurantConfigUpdate, TimeslotCreate, TimeslotUpdate, UserUpsert,
};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};

const CAPACITY: u32 = 20;
const USERS: i64 = 60;
const RACE_ROUNDS: i64 = 100;

fn setup() -> (ServerState, i64) {
    let state = ServerState::in_memory(Config::for_tests("/tmp/crab-booking-test")).unwrap();
    state
        .catalog
        .update_restaurant_config(RestaurantConfigUpdate {
            total_capacity: Some(CAPACITY),
            restaurant_name: Some("Le Crabe".into()),
            ..Default::default()
        })
        .unwrap();
    let slot = state
        .catalog
        .create_timeslot(TimeslotCreate {
            start_time: "19:30".into(),
            is_active: Some(true),
        })
        .unwrap();
    for id in 1..=USERS {
        state
            .users
            .upsert(
                id,
                UserUpsert {
                    email: format!("guest{id}@example.com"),
                    first_name: format!("Guest{id}"),
                    last_name: "Test".into(),
                    phone: None,
                    role: None,
                },
            )
            .unwrap();
    }
    (state, slot.id)
}

fn request(slot: i64, guests: i64) -> BookingRequest {
    BookingRequest {
        timeslot_id: Some(slot),
        reservation_date: Some((local_today() + Duration::days(30)).format("%Y-%m-%d").to_string()),
        number_of_guests: Some(guests),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_single_guest_bookings_fill_exactly_to_capacity() {
    let (state, slot) = setup();
    let state = Arc::new(state);

    let handles: Vec<_> = (1..=USERS)
        .map(|user_id| {
            let state = state.clone();
            tokio::task::spawn_blocking(move || state.admission.book(user_id, request(slot, 1)))
        })
        .collect();

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(BookingError::CapacityExceeded { available }) => {
                assert_eq!(available, 0);
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, CAPACITY as i64);
    assert_eq!(rejected, USERS - CAPACITY as i64);

    let date = local_today() + Duration::days(30);
    let available = state.projector.project(date, 1).unwrap()[0].timeslots[0].available_places;
    assert_eq!(available, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_mixed_party_sizes_never_exceed_capacity() {
    let (state, slot) = setup();
    let state = Arc::new(state);

    let handles: Vec<_> = (1..=USERS)
        .map(|user_id| {
            let state = state.clone();
            let guests = 1 + user_id % 4;
            tokio::task::spawn_blocking(move || {
                state
                    .admission
                    .book(user_id, request(slot, guests))
                    .map(|view| view.reservation.number_of_guests)
            })
        })
        .collect();

    let mut seated = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(guests) => seated += guests,
            Err(BookingError::CapacityExceeded { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(seated <= CAPACITY);

    let date = local_today() + Duration::days(30);
    let live: u32 = state
        .admission
        .list_all(Some(date), Some(slot))
        .unwrap()
        .iter()
        .map(|view| view.reservation.number_of_guests)
        .sum();
    assert_eq!(live, seated);

    let available = state.projector.project(date, 1).unwrap()[0].timeslots[0].available_places;
    assert_eq!(available, CAPACITY - seated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_user_racing_gets_one_reservation() {
    let (state, slot) = setup();
    let state = Arc::new(state);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let state = state.clone();
            tokio::task::spawn_blocking(move || state.admission.book(7, request(slot, 2)))
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(BookingError::DuplicateBooking) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(state.admission.list_for_user(7).unwrap().len(), 1);
}

/// Fresh active timeslot per round: 10:00, 10:01, ...
fn race_slot(state: &ServerState, round: i64) -> i64 {
    state
        .catalog
        .create_timeslot(TimeslotCreate {
            start_time: format!("{:02}:{:02}", 10 + round / 60, round % 60),
            is_active: Some(true),
        })
        .unwrap()
        .id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_timeslot_racing_booking_never_orphans_reservations() {
    let (state, _) = setup();
    let state = Arc::new(state);

    let mut booked = 0;
    let mut deleted = 0;
    for round in 0..RACE_ROUNDS {
        let slot = race_slot(&state, round);
        let user_id = 1 + round % USERS;
        let barrier = Arc::new(Barrier::new(2));

        let booking = {
            let state = state.clone();
            let barrier = barrier.clone();
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                state.admission.book(user_id, request(slot, 2))
            })
        };
        let deletion = {
            let state = state.clone();
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                state.catalog.delete_timeslot(slot)
            })
        };

        match (booking.await.unwrap(), deletion.await.unwrap()) {
            (Ok(_), Err(BookingError::TimeslotInUse(_))) => booked += 1,
            (Err(BookingError::TimeslotNotFound(_)), Ok(())) => deleted += 1,
            (book, delete) => panic!(
                "round {round}: book {:?}, delete {:?}",
                book.map(|view| view.reservation.id),
                delete
            ),
        }
    }
    assert_eq!(booked + deleted, RACE_ROUNDS);

    let existing: HashSet<i64> = state
        .catalog
        .list_timeslots()
        .unwrap()
        .iter()
        .map(|slot| slot.id)
        .collect();
    let live = state.admission.list_all(None, None).unwrap();
    assert_eq!(live.len() as i64, booked);
    for view in &live {
        assert!(existing.contains(&view.reservation.timeslot_id));
        assert!(view.timeslot.is_some());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_moving_timeslot_racing_booking_keeps_booked_time() {
    let (state, _) = setup();
    let state = Arc::new(state);

    for round in 0..RACE_ROUNDS {
        let slot = race_slot(&state, round);
        let user_id = 1 + round % USERS;
        let barrier = Arc::new(Barrier::new(2));
        let new_time = format!("{:02}:{:02}", 14 + round / 60, round % 60);

        let booking = {
            let state = state.clone();
            let barrier = barrier.clone();
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                state.admission.book(user_id, request(slot, 2))
            })
        };
        let moving = {
            let state = state.clone();
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                state.catalog.update_timeslot(
                    slot,
                    TimeslotUpdate {
                        start_time: Some(new_time),
                        ..Default::default()
                    },
                )
            })
        };

        let view = booking.await.unwrap().unwrap();
        match moving.await.unwrap() {
            // 改时间在预订之前提交：预订使用新时间
            Ok(_) => {}
            Err(BookingError::TimeslotInUse(_)) => {}
            Err(other) => panic!("round {round}: unexpected error: {other}"),
        }

        let stored = state.catalog.get_timeslot(slot).unwrap();
        let booked_at = view.timeslot.unwrap().start_time;
        assert_eq!(booked_at, stored.start_time, "round {round}");
    }
}
