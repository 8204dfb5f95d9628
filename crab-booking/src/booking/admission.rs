//! Reservation Admission Controller
//!
//! 账本的唯一写入方。一次预订的流程：
//!
//! ```text
//! validate → timeslot active? → user known? → config loaded?
//!     └─ lock(date, timeslot)
//!          ├─ consumed + guests > capacity ? → CapacityExceeded
//!          ├─ user already booked slot ?     → DuplicateBooking
//!          └─ ledger.insert_with_slot        → TimeslotNotFound / TimeslotInactive
//!     └─ unlock
//! enqueue confirmation (fire-and-forget)
//! ```
//!
//! 检查与写入在同一把时段锁内完成，因此同一 (日期, 时段) 的并发预订
//! 总人数不会超过容量。取消操作不加锁：它只会释放容量。
//!
//! 时段在写事务内重新读取：与时段删除并发时二者只有一个成功，
//! 返回结果和确认邮件使用写入时的 start_time。

use super::catalog::CatalogService;
use super::error::{BookingError, BookingResult};
use super::ledger::{CapacityLedger, LedgerFilter, NewReservation};
use super::locks::SlotLocks;
use super::users::UserDirectory;
use crate::notify::{ConfirmationRequest, NotifyHandle};
use chrono::NaiveDate;
use shared::models::{
    BookingRequest, Reservation, ReservationView, Timeslot, TimeslotSummary, UserSummary,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Today in the server's local timezone
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Validated booking input
#[derive(Debug, Clone, Copy)]
struct BookingInput {
    timeslot_id: i64,
    date: NaiveDate,
    guests: u32,
}

#[derive(Debug, Clone)]
pub struct ReservationAdmissionController {
    ledger: CapacityLedger,
    catalog: Arc<CatalogService>,
    users: UserDirectory,
    locks: Arc<SlotLocks>,
    notifier: Option<NotifyHandle>,
    allow_past_dates: bool,
}

impl ReservationAdmissionController {
    pub fn new(
        ledger: CapacityLedger,
        catalog: Arc<CatalogService>,
        users: UserDirectory,
        locks: Arc<SlotLocks>,
    ) -> Self {
        Self {
            ledger,
            catalog,
            users,
            locks,
            notifier: None,
            allow_past_dates: false,
        }
    }

    pub fn with_notifier(mut self, notifier: NotifyHandle) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn allow_past_dates(mut self, allow: bool) -> Self {
        self.allow_past_dates = allow;
        self
    }

    /// Admit a reservation for `user_id` or reject it without side effects
    pub fn book(&self, user_id: i64, request: BookingRequest) -> BookingResult<ReservationView> {
        let input = self.validate(request)?;

        let slot = self.catalog.get_timeslot(input.timeslot_id)?;
        if !slot.is_active {
            return Err(BookingError::TimeslotInactive(slot.id));
        }
        let user = self.users.get(user_id)?;
        let config = self.catalog.restaurant_config()?;
        let capacity = config.total_capacity;

        let (reservation, slot) = self.locks.with_slot((input.date, slot.id), || {
            let consumed = self.ledger.consumed_guests(input.date, slot.id)?;
            if consumed.saturating_add(input.guests) > capacity {
                let available = capacity.saturating_sub(consumed);
                tracing::info!(
                    user_id,
                    date = %input.date,
                    timeslot_id = slot.id,
                    requested = input.guests,
                    available,
                    "Booking rejected: capacity exceeded"
                );
                return Err(BookingError::CapacityExceeded { available });
            }
            if self
                .ledger
                .has_live_reservation(user_id, input.date, slot.id)?
            {
                tracing::info!(
                    user_id,
                    date = %input.date,
                    timeslot_id = slot.id,
                    "Booking rejected: duplicate"
                );
                return Err(BookingError::DuplicateBooking);
            }
            self.ledger.insert_with_slot(NewReservation {
                user: UserSummary::from(&user),
                timeslot_id: slot.id,
                reservation_date: input.date,
                number_of_guests: input.guests,
            })
        })?;

        tracing::info!(
            reservation_id = reservation.id,
            user_id,
            date = %reservation.reservation_date,
            timeslot_id = slot.id,
            guests = reservation.number_of_guests,
            "Reservation created"
        );

        if let Some(notifier) = &self.notifier {
            notifier.enqueue(ConfirmationRequest {
                to_email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                restaurant_name: config.restaurant_name.clone(),
                reservation_id: reservation.id,
                reservation_date: reservation.reservation_date,
                start_time: slot.start_time,
                number_of_guests: reservation.number_of_guests,
            });
        }

        Ok(ReservationView {
            timeslot: Some(TimeslotSummary::from(&slot)),
            reservation,
        })
    }

    fn validate(&self, request: BookingRequest) -> BookingResult<BookingInput> {
        let (Some(timeslot_id), Some(raw_date), Some(guests)) = (
            request.timeslot_id,
            request.reservation_date.filter(|d| !d.trim().is_empty()),
            request.number_of_guests,
        ) else {
            return Err(BookingError::validation(
                "timeslot_id, reservation_date and number_of_guests are required",
            ));
        };

        if guests < 1 {
            return Err(BookingError::validation(
                "number_of_guests must be at least 1",
            ));
        }
        let guests = u32::try_from(guests)
            .map_err(|_| BookingError::validation("number_of_guests is too large"))?;

        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|_| {
            BookingError::validation(format!(
                "Invalid reservation_date: {raw_date} (expected YYYY-MM-DD)"
            ))
        })?;
        if !self.allow_past_dates && date < local_today() {
            return Err(BookingError::PastDate(date));
        }

        Ok(BookingInput {
            timeslot_id,
            date,
            guests,
        })
    }

    /// Administrative hard delete; returns the removed reservation
    pub fn cancel(&self, id: i64) -> BookingResult<ReservationView> {
        let removed = self.ledger.remove(id)?;
        tracing::info!(
            reservation_id = id,
            date = %removed.reservation_date,
            timeslot_id = removed.timeslot_id,
            guests = removed.number_of_guests,
            "Reservation deleted"
        );
        let slots = self.slot_map()?;
        Ok(join(removed, &slots))
    }

    /// Administrative soft cancel
    pub fn mark_cancelled(&self, id: i64) -> BookingResult<ReservationView> {
        let cancelled = self.ledger.mark_cancelled(id)?;
        tracing::info!(reservation_id = id, "Reservation cancelled");
        let slots = self.slot_map()?;
        Ok(join(cancelled, &slots))
    }

    /// Live reservations of one user
    pub fn list_for_user(&self, user_id: i64) -> BookingResult<Vec<ReservationView>> {
        self.list(LedgerFilter {
            user_id: Some(user_id),
            ..Default::default()
        })
    }

    /// All live reservations, optionally narrowed to a date and/or timeslot
    pub fn list_all(
        &self,
        date: Option<NaiveDate>,
        timeslot_id: Option<i64>,
    ) -> BookingResult<Vec<ReservationView>> {
        self.list(LedgerFilter {
            user_id: None,
            date,
            timeslot_id,
        })
    }

    /// Ordered by date, then timeslot start time, then id
    fn list(&self, filter: LedgerFilter) -> BookingResult<Vec<ReservationView>> {
        let slots = self.slot_map()?;
        let mut views: Vec<ReservationView> = self
            .ledger
            .list_live(filter)?
            .into_iter()
            .map(|r| join(r, &slots))
            .collect();
        views.sort_by_key(|v| {
            (
                v.reservation.reservation_date,
                v.timeslot.as_ref().map(|t| t.start_time),
                v.reservation.id,
            )
        });
        Ok(views)
    }

    fn slot_map(&self) -> BookingResult<HashMap<i64, Timeslot>> {
        Ok(self
            .catalog
            .list_timeslots()?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }
}

fn join(reservation: Reservation, slots: &HashMap<i64, Timeslot>) -> ReservationView {
    ReservationView {
        timeslot: slots.get(&reservation.timeslot_id).map(TimeslotSummary::from),
        reservation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::storage::BookingStorage;
    use chrono::Duration;
    use shared::models::{RestaurantConfigUpdate, TimeslotCreate, TimeslotUpdate, UserUpsert};

    struct Fixture {
        controller: ReservationAdmissionController,
        catalog: Arc<CatalogService>,
        ledger: CapacityLedger,
        slot: Timeslot,
    }

    fn fixture(capacity: u32) -> Fixture {
        let storage = BookingStorage::open_in_memory().unwrap();
        let ledger = CapacityLedger::new(storage.clone());
        let catalog = Arc::new(CatalogService::new(storage.clone()).unwrap());
        let users = UserDirectory::new(storage);

        catalog
            .update_restaurant_config(RestaurantConfigUpdate {
                total_capacity: Some(capacity),
                restaurant_name: Some("Le Crabe".into()),
                ..Default::default()
            })
            .unwrap();
        let slot = catalog
            .create_timeslot(TimeslotCreate {
                start_time: "19:00".into(),
                is_active: Some(true),
            })
            .unwrap();
        for id in 1..=5 {
            users
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

        let controller = ReservationAdmissionController::new(
            ledger.clone(),
            catalog.clone(),
            users,
            Arc::new(SlotLocks::new()),
        );
        Fixture {
            controller,
            catalog,
            ledger,
            slot,
        }
    }

    fn tomorrow() -> NaiveDate {
        local_today() + Duration::days(1)
    }

    fn request(slot: i64, date: NaiveDate, guests: i64) -> BookingRequest {
        BookingRequest {
            timeslot_id: Some(slot),
            reservation_date: Some(date.format("%Y-%m-%d").to_string()),
            number_of_guests: Some(guests),
        }
    }

    #[test]
    fn test_book_within_capacity() {
        let f = fixture(10);
        let view = f
            .controller
            .book(1, request(f.slot.id, tomorrow(), 4))
            .unwrap();

        assert_eq!(view.reservation.number_of_guests, 4);
        assert_eq!(view.reservation.user.email, "guest1@example.com");
        assert_eq!(view.timeslot.unwrap().id, f.slot.id);
        assert_eq!(f.ledger.consumed_guests(tomorrow(), f.slot.id).unwrap(), 4);
    }

    #[test]
    fn test_capacity_exceeded_reports_remaining() {
        let f = fixture(10);
        f.controller.book(1, request(f.slot.id, tomorrow(), 4)).unwrap();
        f.controller.book(2, request(f.slot.id, tomorrow(), 3)).unwrap();

        let err = f
            .controller
            .book(3, request(f.slot.id, tomorrow(), 4))
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityExceeded { available: 3 }));
        assert_eq!(f.ledger.consumed_guests(tomorrow(), f.slot.id).unwrap(), 7);

        // 恰好填满是允许的
        f.controller.book(3, request(f.slot.id, tomorrow(), 3)).unwrap();
        assert_eq!(f.ledger.consumed_guests(tomorrow(), f.slot.id).unwrap(), 10);
    }

    #[test]
    fn test_duplicate_booking_rejected_and_released_by_cancel() {
        let f = fixture(10);
        let first = f
            .controller
            .book(1, request(f.slot.id, tomorrow(), 2))
            .unwrap();
        let err = f
            .controller
            .book(1, request(f.slot.id, tomorrow(), 2))
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateBooking));

        // 另一天不算重复
        f.controller
            .book(1, request(f.slot.id, tomorrow() + Duration::days(1), 2))
            .unwrap();

        f.controller.mark_cancelled(first.reservation.id).unwrap();
        f.controller.book(1, request(f.slot.id, tomorrow(), 2)).unwrap();
    }

    #[test]
    fn test_capacity_checked_before_duplicate() {
        let f = fixture(4);
        f.controller.book(1, request(f.slot.id, tomorrow(), 4)).unwrap();
        let err = f
            .controller
            .book(1, request(f.slot.id, tomorrow(), 1))
            .unwrap_err();
        assert!(matches!(err, BookingError::CapacityExceeded { available: 0 }));
    }

    #[test]
    fn test_validation_failures() {
        let f = fixture(10);
        let cases = [
            BookingRequest::default(),
            request(f.slot.id, tomorrow(), 0),
            request(f.slot.id, tomorrow(), -2),
            BookingRequest {
                reservation_date: Some("14/01/2030".into()),
                ..request(f.slot.id, tomorrow(), 2)
            },
        ];
        for case in cases {
            assert!(matches!(
                f.controller.book(1, case),
                Err(BookingError::Validation(_))
            ));
        }
        assert!(f.ledger.list_live(LedgerFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_past_date_policy() {
        let f = fixture(10);
        let yesterday = local_today() - Duration::days(1);
        assert!(matches!(
            f.controller.book(1, request(f.slot.id, yesterday, 2)),
            Err(BookingError::PastDate(_))
        ));

        // 当天可以预订
        f.controller.book(1, request(f.slot.id, local_today(), 2)).unwrap();

        let permissive = f.controller.clone().allow_past_dates(true);
        permissive.book(2, request(f.slot.id, yesterday, 2)).unwrap();
    }

    #[test]
    fn test_unknown_or_inactive_timeslot() {
        let f = fixture(10);
        assert!(matches!(
            f.controller.book(1, request(999, tomorrow(), 2)),
            Err(BookingError::TimeslotNotFound(999))
        ));

        f.catalog
            .update_timeslot(
                f.slot.id,
                TimeslotUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matches!(
            f.controller.book(1, request(f.slot.id, tomorrow(), 2)),
            Err(BookingError::TimeslotInactive(_))
        ));
    }

    #[test]
    fn test_unknown_user() {
        let f = fixture(10);
        assert!(matches!(
            f.controller.book(77, request(f.slot.id, tomorrow(), 2)),
            Err(BookingError::UserNotFound(77))
        ));
    }

    #[test]
    fn test_capacity_reduction_keeps_existing() {
        let f = fixture(10);
        f.controller.book(1, request(f.slot.id, tomorrow(), 8)).unwrap();
        f.catalog
            .update_restaurant_config(RestaurantConfigUpdate {
                total_capacity: Some(5),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(f.controller.list_all(None, None).unwrap().len(), 1);
        assert!(matches!(
            f.controller.book(2, request(f.slot.id, tomorrow(), 1)),
            Err(BookingError::CapacityExceeded { available: 0 })
        ));
    }

    #[test]
    fn test_cancel_returns_snapshot_and_frees_seats() {
        let f = fixture(4);
        let booked = f
            .controller
            .book(1, request(f.slot.id, tomorrow(), 4))
            .unwrap();

        let removed = f.controller.cancel(booked.reservation.id).unwrap();
        assert_eq!(removed.reservation.id, booked.reservation.id);
        assert_eq!(removed.reservation.user.first_name, "Guest1");
        assert_eq!(removed.timeslot, booked.timeslot);

        assert!(matches!(
            f.controller.cancel(booked.reservation.id),
            Err(BookingError::ReservationNotFound(_))
        ));
        f.controller.book(2, request(f.slot.id, tomorrow(), 4)).unwrap();
    }

    #[test]
    fn test_listing_order() {
        let f = fixture(20);
        let lunch = f
            .catalog
            .create_timeslot(TimeslotCreate {
                start_time: "12:00".into(),
                is_active: None,
            })
            .unwrap();
        let later = tomorrow() + Duration::days(2);

        f.controller.book(1, request(f.slot.id, later, 2)).unwrap();
        f.controller.book(1, request(f.slot.id, tomorrow(), 2)).unwrap();
        f.controller.book(1, request(lunch.id, tomorrow(), 2)).unwrap();
        f.controller.book(2, request(lunch.id, tomorrow(), 2)).unwrap();

        let mine = f.controller.list_for_user(1).unwrap();
        let keys: Vec<(NaiveDate, i64)> = mine
            .iter()
            .map(|v| (v.reservation.reservation_date, v.reservation.timeslot_id))
            .collect();
        assert_eq!(
            keys,
            vec![
                (tomorrow(), lunch.id),
                (tomorrow(), f.slot.id),
                (later, f.slot.id)
            ]
        );

        let lunch_tomorrow = f.controller.list_all(Some(tomorrow()), Some(lunch.id)).unwrap();
        assert_eq!(lunch_tomorrow.len(), 2);
    }

    #[test]
    fn test_confirmation_enqueued_after_commit() {
        let f = fixture(10);
        let (handle, mut rx) = NotifyHandle::channel(4);
        let controller = f.controller.clone().with_notifier(handle);

        let view = controller
            .book(3, request(f.slot.id, tomorrow(), 2))
            .unwrap();
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.reservation_id, view.reservation.id);
        assert_eq!(sent.to_email, "guest3@example.com");
        assert_eq!(sent.restaurant_name, "Le Crabe");
        assert_eq!(sent.start_time.format("%H:%M").to_string(), "19:00");

        // 队列关闭不影响预订
        drop(rx);
        controller
            .book(4, request(f.slot.id, tomorrow(), 2))
            .unwrap();
    }
}
