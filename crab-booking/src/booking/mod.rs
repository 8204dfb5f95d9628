//! 预订核心
//!
//! # 模块结构
//!
//! - [`storage`] - redb 存储 (预订、索引、时段、配置、用户)
//! - [`ledger`] - Capacity Ledger，预订记录系统
//! - [`locks`] - 按 (日期, 时段) 分片的准入锁
//! - [`catalog`] - 时段目录 + 餐厅配置
//! - [`users`] - 本地用户目录
//! - [`admission`] - 预订准入控制器 (账本唯一写入方)
//! - [`projector`] - 可用座位投影
//! - [`locale`] - 日期/星期显示

pub mod admission;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod locale;
pub mod locks;
pub mod projector;
pub mod storage;
pub mod users;

pub use admission::{ReservationAdmissionController, local_today};
pub use catalog::CatalogService;
pub use error::{BookingError, BookingResult};
pub use ledger::{CapacityLedger, LedgerFilter, NewReservation};
pub use locale::DisplayLocale;
pub use locks::SlotLocks;
pub use projector::AvailabilityProjector;
pub use storage::{BookingStorage, StorageError};
pub use users::UserDirectory;
