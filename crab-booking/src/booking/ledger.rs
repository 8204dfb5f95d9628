//! Capacity Ledger
//!
//! 预订的唯一记录系统。回答 "某 (日期, 时段) 已占用多少座位"、
//! "某用户是否已有活跃预订"，并提供写入/删除/软取消。
//!
//! `insert` 不做任何容量检查；检查由
//! [`ReservationAdmissionController`](super::admission::ReservationAdmissionController)
//! 在持有时段锁时完成。`insert` 只在同一写事务内确认时段仍存在且启用：
//! redb 写事务互斥，因此与 [`CatalogService::delete_timeslot`] 不会交错。
//!
//! [`CatalogService::delete_timeslot`]: super::catalog::CatalogService::delete_timeslot

use super::error::{BookingError, BookingResult};
use super::storage::{BookingStorage, RESERVATION_SEQ, StorageError};
use chrono::NaiveDate;
use shared::models::{Reservation, Timeslot, UserSummary};
use shared::util::now_millis;

/// Reservation to be appended
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user: UserSummary,
    pub timeslot_id: i64,
    pub reservation_date: NaiveDate,
    pub number_of_guests: u32,
}

/// Filter for listing live reservations
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerFilter {
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub timeslot_id: Option<i64>,
}

impl LedgerFilter {
    fn matches(&self, r: &Reservation) -> bool {
        self.user_id.is_none_or(|id| r.user_id == id)
            && self.date.is_none_or(|d| r.reservation_date == d)
            && self.timeslot_id.is_none_or(|id| r.timeslot_id == id)
    }
}

#[derive(Debug, Clone)]
pub struct CapacityLedger {
    storage: BookingStorage,
}

impl CapacityLedger {
    pub fn new(storage: BookingStorage) -> Self {
        Self { storage }
    }

    /// Sum of guests over live reservations for (date, timeslot); 0 when none
    pub fn consumed_guests(&self, date: NaiveDate, timeslot_id: i64) -> BookingResult<u32> {
        Ok(self.storage.consumed_guests(date, timeslot_id)?)
    }

    pub fn has_live_reservation(
        &self,
        user_id: i64,
        date: NaiveDate,
        timeslot_id: i64,
    ) -> BookingResult<bool> {
        Ok(self
            .storage
            .live_reservation_for_user(user_id, date, timeslot_id)?
            .is_some())
    }

    /// Append a live reservation
    pub fn insert(&self, new: NewReservation) -> BookingResult<Reservation> {
        self.insert_with_slot(new).map(|(reservation, _)| reservation)
    }

    /// Append a live reservation; also returns the timeslot as committed with it
    ///
    /// Fails with `TimeslotNotFound` / `TimeslotInactive` if the timeslot was
    /// deleted or deactivated after the caller looked it up.
    pub fn insert_with_slot(&self, new: NewReservation) -> BookingResult<(Reservation, Timeslot)> {
        let txn = self.storage.begin_write()?;
        let slot = self
            .storage
            .get_timeslot_txn(&txn, new.timeslot_id)?
            .ok_or(BookingError::TimeslotNotFound(new.timeslot_id))?;
        if !slot.is_active {
            return Err(BookingError::TimeslotInactive(slot.id));
        }
        let id = self.storage.next_id(&txn, RESERVATION_SEQ)?;
        let now = now_millis();
        let reservation = Reservation {
            id,
            user_id: new.user.id,
            timeslot_id: new.timeslot_id,
            reservation_date: new.reservation_date,
            number_of_guests: new.number_of_guests,
            is_cancelled: false,
            created_at: now,
            updated_at: now,
            user: new.user,
        };
        self.storage.store_reservation(&txn, &reservation)?;
        self.storage.index_live(&txn, &reservation)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(
            reservation_id = id,
            date = %reservation.reservation_date,
            timeslot_id = reservation.timeslot_id,
            guests = reservation.number_of_guests,
            "Reservation inserted"
        );
        Ok((reservation, slot))
    }

    /// Hard delete; returns the removed record
    pub fn remove(&self, id: i64) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;
        let reservation = self
            .storage
            .get_reservation_txn(&txn, id)?
            .ok_or(BookingError::ReservationNotFound(id))?;
        if reservation.is_live() {
            self.storage.unindex_live(&txn, &reservation)?;
        }
        self.storage.delete_reservation(&txn, id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(reservation_id = id, "Reservation removed");
        Ok(reservation)
    }

    /// Soft cancel; the record stays for history but stops counting
    pub fn mark_cancelled(&self, id: i64) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;
        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, id)?
            .filter(Reservation::is_live)
            .ok_or(BookingError::ReservationNotFound(id))?;
        self.storage.unindex_live(&txn, &reservation)?;
        reservation.is_cancelled = true;
        reservation.updated_at = now_millis();
        self.storage.store_reservation(&txn, &reservation)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(reservation_id = id, "Reservation marked cancelled");
        Ok(reservation)
    }

    pub fn get(&self, id: i64) -> BookingResult<Option<Reservation>> {
        Ok(self.storage.get_reservation(id)?)
    }

    /// Live reservations matching the filter (storage order)
    pub fn list_live(&self, filter: LedgerFilter) -> BookingResult<Vec<Reservation>> {
        Ok(self
            .storage
            .all_reservations()?
            .into_iter()
            .filter(|r| r.is_live() && filter.matches(r))
            .collect())
    }

    pub fn count_live_for_timeslot(&self, timeslot_id: i64) -> BookingResult<usize> {
        Ok(self
            .list_live(LedgerFilter {
                timeslot_id: Some(timeslot_id),
                ..Default::default()
            })?
            .len())
    }
}
