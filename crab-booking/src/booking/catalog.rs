//! Timeslot catalog and restaurant configuration
//!
//! 时段目录读多写少；餐厅配置缓存在内存中，运营方修改时整体替换。
//! 管理操作通过 `write_lock` 串行化，避免重复 start_time。
//!
//! 被活跃预订引用的时段不能删除，也不能修改 start_time (只能启用/停用)。
//! 引用检查与写入在同一个 redb 写事务内完成，与
//! [`CapacityLedger::insert`](super::ledger::CapacityLedger::insert) 互斥。

use super::error::{BookingError, BookingResult};
use super::storage::{BookingStorage, StorageError, TIMESLOT_SEQ};
use parking_lot::{Mutex, RwLock};
use shared::models::{
    RestaurantConfig, RestaurantConfigUpdate, Timeslot, TimeslotCreate, TimeslotUpdate,
    parse_start_time,
};
use shared::util::now_millis;
use std::sync::Arc;

#[derive(Debug)]
pub struct CatalogService {
    storage: BookingStorage,
    config: RwLock<Option<Arc<RestaurantConfig>>>,
    write_lock: Mutex<()>,
}

impl CatalogService {
    /// Create the service and load the persisted configuration (if any)
    pub fn new(storage: BookingStorage) -> BookingResult<Self> {
        let config = storage.get_config()?.map(Arc::new);
        if let Some(cfg) = &config {
            tracing::info!(
                capacity = cfg.total_capacity,
                version = cfg.version,
                "Restaurant configuration loaded"
            );
        } else {
            tracing::warn!("No restaurant configuration yet, bookings will fail until one is set");
        }
        Ok(Self {
            storage,
            config: RwLock::new(config),
            write_lock: Mutex::new(()),
        })
    }

    // ========== Timeslots ==========

    /// All timeslots ordered by start time
    pub fn list_timeslots(&self) -> BookingResult<Vec<Timeslot>> {
        let mut slots = self.storage.all_timeslots()?;
        slots.sort_by_key(|s| (s.start_time, s.id));
        Ok(slots)
    }

    /// Active timeslots ordered by start time
    pub fn list_active(&self) -> BookingResult<Vec<Timeslot>> {
        let mut slots = self.list_timeslots()?;
        slots.retain(|s| s.is_active);
        Ok(slots)
    }

    pub fn get_timeslot(&self, id: i64) -> BookingResult<Timeslot> {
        self.storage
            .get_timeslot(id)?
            .ok_or(BookingError::TimeslotNotFound(id))
    }

    pub fn create_timeslot(&self, payload: TimeslotCreate) -> BookingResult<Timeslot> {
        let start_time = parse_start_time(&payload.start_time).ok_or_else(|| {
            BookingError::validation(format!("Invalid start_time: {}", payload.start_time))
        })?;

        let _guard = self.write_lock.lock();
        self.ensure_unique_start(start_time, None)?;

        let txn = self.storage.begin_write()?;
        let now = now_millis();
        let slot = Timeslot {
            id: self.storage.next_id(&txn, TIMESLOT_SEQ)?,
            start_time,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.storage.store_timeslot(&txn, &slot)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(timeslot_id = slot.id, start_time = %slot.start_time, "Timeslot created");
        Ok(slot)
    }

    /// Update start time and/or active flag
    ///
    /// Deactivating never touches existing reservations. Moving the start
    /// time of a slot that live reservations reference is refused.
    pub fn update_timeslot(&self, id: i64, payload: TimeslotUpdate) -> BookingResult<Timeslot> {
        let start_time = payload
            .start_time
            .map(|raw| {
                parse_start_time(&raw)
                    .ok_or_else(|| BookingError::validation(format!("Invalid start_time: {raw}")))
            })
            .transpose()?;

        let _guard = self.write_lock.lock();
        let txn = self.storage.begin_write()?;
        let mut slot = self
            .storage
            .get_timeslot_txn(&txn, id)?
            .ok_or(BookingError::TimeslotNotFound(id))?;

        if let Some(start_time) = start_time.filter(|t| *t != slot.start_time) {
            let live = self.storage.live_count_for_timeslot_txn(&txn, id)?;
            if live > 0 {
                tracing::warn!(timeslot_id = id, live, "Refusing to move timeslot in use");
                return Err(BookingError::TimeslotInUse(id));
            }
            self.ensure_unique_start(start_time, Some(id))?;
            slot.start_time = start_time;
        }
        if let Some(active) = payload.is_active {
            slot.is_active = active;
        }
        slot.updated_at = now_millis();

        self.storage.store_timeslot(&txn, &slot)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(timeslot_id = id, is_active = slot.is_active, "Timeslot updated");
        Ok(slot)
    }

    /// Delete a timeslot that no live reservation references
    pub fn delete_timeslot(&self, id: i64) -> BookingResult<()> {
        let _guard = self.write_lock.lock();
        let txn = self.storage.begin_write()?;
        if self.storage.get_timeslot_txn(&txn, id)?.is_none() {
            return Err(BookingError::TimeslotNotFound(id));
        }

        let live = self.storage.live_count_for_timeslot_txn(&txn, id)?;
        if live > 0 {
            tracing::warn!(timeslot_id = id, live, "Refusing to delete timeslot in use");
            return Err(BookingError::TimeslotInUse(id));
        }

        self.storage.delete_timeslot(&txn, id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(timeslot_id = id, "Timeslot deleted");
        Ok(())
    }

    fn ensure_unique_start(
        &self,
        start_time: chrono::NaiveTime,
        except: Option<i64>,
    ) -> BookingResult<()> {
        let clash = self
            .storage
            .all_timeslots()?
            .into_iter()
            .any(|s| s.start_time == start_time && Some(s.id) != except);
        if clash {
            return Err(BookingError::TimeslotTimeExists(
                start_time.format("%H:%M").to_string(),
            ));
        }
        Ok(())
    }

    // ========== Restaurant Config ==========

    /// Current configuration snapshot
    pub fn restaurant_config(&self) -> BookingResult<Arc<RestaurantConfig>> {
        self.config.read().clone().ok_or(BookingError::ConfigMissing)
    }

    /// Apply an operator update; bumps `version`
    ///
    /// Lowering capacity below what is already booked is allowed; existing
    /// reservations stay and remaining seats clamp at 0.
    pub fn update_restaurant_config(
        &self,
        update: RestaurantConfigUpdate,
    ) -> BookingResult<Arc<RestaurantConfig>> {
        if update.total_capacity == Some(0) {
            return Err(BookingError::validation("total_capacity must be at least 1"));
        }
        if update
            .restaurant_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(BookingError::validation("restaurant_name cannot be empty"));
        }

        let _guard = self.write_lock.lock();
        let current = self.config.read().clone();
        let next = match current {
            Some(cfg) => RestaurantConfig {
                total_capacity: update.total_capacity.unwrap_or(cfg.total_capacity),
                restaurant_name: update
                    .restaurant_name
                    .unwrap_or_else(|| cfg.restaurant_name.clone()),
                phone: update.phone.unwrap_or_else(|| cfg.phone.clone()),
                address: update.address.unwrap_or_else(|| cfg.address.clone()),
                description: update.description.or_else(|| cfg.description.clone()),
                version: cfg.version + 1,
                updated_at: now_millis(),
            },
            None => RestaurantConfig {
                total_capacity: update.total_capacity.ok_or_else(|| {
                    BookingError::validation("total_capacity is required")
                })?,
                restaurant_name: update.restaurant_name.ok_or_else(|| {
                    BookingError::validation("restaurant_name is required")
                })?,
                phone: update.phone.unwrap_or_default(),
                address: update.address.unwrap_or_default(),
                description: update.description,
                version: 1,
                updated_at: now_millis(),
            },
        };

        self.storage.store_config(&next)?;
        let next = Arc::new(next);
        *self.config.write() = Some(next.clone());

        tracing::info!(
            capacity = next.total_capacity,
            version = next.version,
            "Restaurant configuration updated"
        );
        Ok(next)
    }

    /// Write `seed` only when no configuration exists yet
    ///
    /// A seed without capacity or name is ignored.
    pub fn seed_restaurant_config(&self, seed: RestaurantConfigUpdate) -> BookingResult<bool> {
        if self.config.read().is_some()
            || seed.total_capacity.is_none()
            || seed.restaurant_name.is_none()
        {
            return Ok(false);
        }
        self.update_restaurant_config(seed)?;
        Ok(true)
    }
}
