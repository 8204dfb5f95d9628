//! redb-based storage layer for the booking ledger and catalog
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `reservations` | `reservation_id` | `Reservation` | System of record (live and soft-cancelled) |
//! | `slot_guests` | `(date, timeslot_id, reservation_id)` | `u32` | 活跃预订的人数索引 (容量统计) |
//! | `user_slots` | `(user_id, date, timeslot_id)` | `reservation_id` | 活跃预订的用户索引 (重复检查) |
//! | `timeslots` | `timeslot_id` | `Timeslot` | Timeslot catalog |
//! | `restaurant_config` | `"current"` | `RestaurantConfig` | Capacity + restaurant profile |
//! | `users` | `user_id` | `UserProfile` | Local user directory |
//! | `sequence_counter` | name | `u64` | ID allocation |
//!
//! Only live reservations have entries in `slot_guests` and `user_slots`;
//! every write that changes liveness touches the record and both indexes
//! in the same write transaction.
//!
//! Dates are stored as `YYYY-MM-DD` strings, which sort chronologically.

use chrono::NaiveDate;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Reservation, RestaurantConfig, Timeslot, UserProfile};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for reservations: key = reservation_id, value = JSON-serialized Reservation
const RESERVATIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("reservations");

/// Table for live guest counts: key = (date, timeslot_id, reservation_id), value = guests
const SLOT_GUESTS_TABLE: TableDefinition<(&str, i64, i64), u32> =
    TableDefinition::new("slot_guests");

/// Table for live user bookings: key = (user_id, date, timeslot_id), value = reservation_id
const USER_SLOTS_TABLE: TableDefinition<(i64, &str, i64), i64> =
    TableDefinition::new("user_slots");

/// Table for timeslots: key = timeslot_id, value = JSON-serialized Timeslot
const TIMESLOTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("timeslots");

/// Table for the restaurant configuration: single key, value = JSON-serialized RestaurantConfig
const CONFIG_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("restaurant_config");

/// Table for user profiles: key = user_id, value = JSON-serialized UserProfile
const USERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Table for sequence counters: key = counter name, value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const CONFIG_KEY: &str = "current";
pub const RESERVATION_SEQ: &str = "reservation";
pub const TIMESLOT_SEQ: &str = "timeslot";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Failures that may succeed if the whole operation is retried
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transaction(_) | StorageError::Commit(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// `YYYY-MM-DD` key for a calendar date
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Booking storage backed by redb
#[derive(Clone)]
pub struct BookingStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for BookingStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingStorage").finish_non_exhaustive()
    }
}

impl BookingStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the reservation is on disk.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway instances)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
            let _ = write_txn.open_table(SLOT_GUESTS_TABLE)?;
            let _ = write_txn.open_table(USER_SLOTS_TABLE)?;
            let _ = write_txn.open_table(TIMESLOTS_TABLE)?;
            let _ = write_txn.open_table(CONFIG_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Increment and return the named counter (within transaction)
    pub fn next_id(&self, txn: &WriteTransaction, counter: &str) -> StorageResult<i64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(counter)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(counter, next)?;
        Ok(next as i64)
    }

    // ========== Reservation Operations ==========

    /// Store a reservation record (within transaction)
    pub fn store_reservation(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(RESERVATIONS_TABLE)?;
        let value = serde_json::to_vec(reservation)?;
        table.insert(reservation.id, value.as_slice())?;
        Ok(())
    }

    /// Get a reservation by id
    pub fn get_reservation(&self, id: i64) -> StorageResult<Option<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a reservation by id (within transaction)
    pub fn get_reservation_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Reservation>> {
        let table = txn.open_table(RESERVATIONS_TABLE)?;
        let result = match table.get(id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(result)
    }

    /// Remove a reservation record (within transaction)
    pub fn delete_reservation(&self, txn: &WriteTransaction, id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(RESERVATIONS_TABLE)?;
        table.remove(id)?;
        Ok(())
    }

    /// Get all reservation records, live or not
    pub fn all_reservations(&self) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;

        let mut reservations = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            reservations.push(serde_json::from_slice(value.value())?);
        }
        Ok(reservations)
    }

    // ========== Live Index Operations ==========

    /// Add a reservation to both live indexes (within transaction)
    pub fn index_live(&self, txn: &WriteTransaction, reservation: &Reservation) -> StorageResult<()> {
        let date = date_key(reservation.reservation_date);
        {
            let mut guests = txn.open_table(SLOT_GUESTS_TABLE)?;
            guests.insert(
                (date.as_str(), reservation.timeslot_id, reservation.id),
                reservation.number_of_guests,
            )?;
        }
        let mut users = txn.open_table(USER_SLOTS_TABLE)?;
        users.insert(
            (reservation.user_id, date.as_str(), reservation.timeslot_id),
            reservation.id,
        )?;
        Ok(())
    }

    /// Drop a reservation from both live indexes (within transaction)
    pub fn unindex_live(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<()> {
        let date = date_key(reservation.reservation_date);
        {
            let mut guests = txn.open_table(SLOT_GUESTS_TABLE)?;
            guests.remove((date.as_str(), reservation.timeslot_id, reservation.id))?;
        }
        let mut users = txn.open_table(USER_SLOTS_TABLE)?;
        let owner = users
            .get((reservation.user_id, date.as_str(), reservation.timeslot_id))?
            .map(|guard| guard.value());
        if owner == Some(reservation.id) {
            users.remove((reservation.user_id, date.as_str(), reservation.timeslot_id))?;
        }
        Ok(())
    }

    /// Sum of live guests for (date, timeslot)
    pub fn consumed_guests(&self, date: NaiveDate, timeslot_id: i64) -> StorageResult<u32> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOT_GUESTS_TABLE)?;

        let key = date_key(date);
        let range_start = (key.as_str(), timeslot_id, i64::MIN);
        let range_end = (key.as_str(), timeslot_id, i64::MAX);

        let mut total: u32 = 0;
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            total = total.saturating_add(value.value());
        }
        Ok(total)
    }

    /// Live reservation id held by a user for (date, timeslot)
    pub fn live_reservation_for_user(
        &self,
        user_id: i64,
        date: NaiveDate,
        timeslot_id: i64,
    ) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_SLOTS_TABLE)?;
        let key = date_key(date);
        Ok(table
            .get((user_id, key.as_str(), timeslot_id))?
            .map(|guard| guard.value()))
    }

    /// Number of live reservations referencing a timeslot (within transaction)
    pub fn live_count_for_timeslot_txn(
        &self,
        txn: &WriteTransaction,
        timeslot_id: i64,
    ) -> StorageResult<usize> {
        let table = txn.open_table(SLOT_GUESTS_TABLE)?;
        let mut count = 0;
        for result in table.iter()? {
            let (key, _value) = result?;
            if key.value().1 == timeslot_id {
                count += 1;
            }
        }
        Ok(count)
    }

    // ========== Timeslot Operations ==========

    /// Store a timeslot (within transaction)
    pub fn store_timeslot(&self, txn: &WriteTransaction, slot: &Timeslot) -> StorageResult<()> {
        let mut table = txn.open_table(TIMESLOTS_TABLE)?;
        let value = serde_json::to_vec(slot)?;
        table.insert(slot.id, value.as_slice())?;
        Ok(())
    }

    /// Get a timeslot by id
    pub fn get_timeslot(&self, id: i64) -> StorageResult<Option<Timeslot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TIMESLOTS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a timeslot by id (within transaction)
    pub fn get_timeslot_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Timeslot>> {
        let table = txn.open_table(TIMESLOTS_TABLE)?;
        let result = match table.get(id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(result)
    }

    /// Get all timeslots (unordered)
    pub fn all_timeslots(&self) -> StorageResult<Vec<Timeslot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TIMESLOTS_TABLE)?;

        let mut slots = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            slots.push(serde_json::from_slice(value.value())?);
        }
        Ok(slots)
    }

    /// Remove a timeslot (within transaction)
    pub fn delete_timeslot(&self, txn: &WriteTransaction, id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(TIMESLOTS_TABLE)?;
        table.remove(id)?;
        Ok(())
    }

    // ========== Restaurant Config Operations ==========

    /// Get the restaurant configuration
    pub fn get_config(&self) -> StorageResult<Option<RestaurantConfig>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONFIG_TABLE)?;
        match table.get(CONFIG_KEY)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Replace the restaurant configuration
    pub fn store_config(&self, config: &RestaurantConfig) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CONFIG_TABLE)?;
            let value = serde_json::to_vec(config)?;
            table.insert(CONFIG_KEY, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== User Operations ==========

    /// Get a user profile by id
    pub fn get_user(&self, id: i64) -> StorageResult<Option<UserProfile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a user profile
    pub fn store_user(&self, user: &UserProfile) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(USERS_TABLE)?;
            let value = serde_json::to_vec(user)?;
            table.insert(user.id, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}
