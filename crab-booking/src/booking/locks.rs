//! Per-slot admission locks
//!
//! 每个 (日期, 时段) 一把互斥锁，保证 "读取已占用 → 检查 → 写入" 原子化。
//! 不同 key 之间互不阻塞。

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// (reservation_date, timeslot_id)
pub type SlotKey = (NaiveDate, i64);

#[derive(Debug, Default)]
pub struct SlotLocks {
    locks: DashMap<SlotKey, Arc<Mutex<()>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the mutex guarding a slot
    ///
    /// The DashMap shard guard is released before the caller locks the
    /// returned mutex, so waiting on one slot never blocks lookups of others.
    pub fn handle(&self, key: SlotKey) -> Arc<Mutex<()>> {
        self.locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the slot's mutex
    pub fn with_slot<T>(&self, key: SlotKey, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(key);
        let _guard = lock.lock();
        f()
    }

    /// Drop entries nobody is holding; returns how many were removed
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
