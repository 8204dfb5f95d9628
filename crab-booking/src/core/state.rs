use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::auth::JwtService;
use crate::booking::{
    AvailabilityProjector, BookingStorage, CapacityLedger, CatalogService,
    ReservationAdmissionController, SlotLocks, UserDirectory,
};
use crate::core::{BackgroundTasks, Config, Result, TaskKind};
use crate::notify::{
    ConfirmationRequest, ConfirmationSender, ConsoleSender, DEFAULT_RESEND_API_URL,
    NotificationWorker, NotifyHandle, ResendSender,
};

/// 空闲时段锁清理间隔
const LOCK_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

const DEFAULT_FROM_EMAIL: &str = "Restaurant App <onboarding@resend.dev>";

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | BookingStorage | redb 存储 |
/// | catalog | Arc<CatalogService> | 时段目录 + 餐厅配置 |
/// | users | UserDirectory | 本地用户目录 |
/// | locks | Arc<SlotLocks> | (日期, 时段) 准入锁 |
/// | admission | ReservationAdmissionController | 预订准入 (账本唯一写入方) |
/// | projector | AvailabilityProjector | 可用座位投影 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    pub storage: BookingStorage,
    pub catalog: Arc<CatalogService>,
    pub users: UserDirectory,
    pub locks: Arc<SlotLocks>,
    pub admission: ReservationAdmissionController,
    pub projector: AvailabilityProjector,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 通知队列消费端，由 [`start_background_tasks`](Self::start_background_tasks) 取走
    notify_rx: Arc<Mutex<Option<mpsc::Receiver<ConfirmationRequest>>>>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 创建 `<work_dir>/database/`
    /// 2. 打开 `booking.redb`
    /// 3. 组装各服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        tracing::info!(path = %db_path.display(), "Opening booking database");
        let storage = BookingStorage::open(&db_path)?;
        Self::with_storage(config.clone(), storage)
    }

    /// 使用内存数据库 (测试用)
    pub fn in_memory(config: Config) -> Result<Self> {
        let storage = BookingStorage::open_in_memory()?;
        Self::with_storage(config, storage)
    }

    /// 基于已打开的存储组装服务
    pub fn with_storage(config: Config, storage: BookingStorage) -> Result<Self> {
        let ledger = CapacityLedger::new(storage.clone());
        let catalog = Arc::new(CatalogService::new(storage.clone())?);
        if catalog.seed_restaurant_config(config.restaurant_seed.clone())? {
            tracing::info!("Restaurant configuration seeded from environment");
        }

        let users = UserDirectory::new(storage.clone());
        let locks = Arc::new(SlotLocks::new());
        let (notifier, notify_rx) = NotifyHandle::channel(config.notify_queue_size);

        let admission = ReservationAdmissionController::new(
            ledger.clone(),
            catalog.clone(),
            users.clone(),
            locks.clone(),
        )
        .with_notifier(notifier)
        .allow_past_dates(config.allow_past_dates);

        let projector = AvailabilityProjector::new(ledger, catalog.clone(), config.display_locale);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config,
            storage,
            catalog,
            users,
            locks,
            admission,
            projector,
            jwt_service,
            notify_rx: Arc::new(Mutex::new(Some(notify_rx))),
        })
    }

    /// 构建确认邮件发送器
    ///
    /// 配置了 `RESEND_API_KEY` 时使用 Resend，否则打印到控制台。
    fn confirmation_sender(&self) -> Result<Arc<dyn ConfirmationSender>> {
        let locale = self.config.display_locale;
        match &self.config.resend_api_key {
            Some(api_key) => {
                let api_url = self
                    .config
                    .resend_api_url
                    .as_deref()
                    .unwrap_or(DEFAULT_RESEND_API_URL);
                let from = self.config.from_email.as_deref().unwrap_or(DEFAULT_FROM_EMAIL);
                Ok(Arc::new(ResendSender::new(api_url, api_key, from, locale)?))
            }
            None => Ok(Arc::new(ConsoleSender::new(locale))),
        }
    }

    /// 启动后台任务
    ///
    /// - `notification_worker` - 发送预订确认
    /// - `slot_lock_prune` - 每 5 分钟清理空闲时段锁
    pub fn start_background_tasks(&self) -> Result<BackgroundTasks> {
        let mut tasks = BackgroundTasks::new();

        match self.notify_rx.lock().take() {
            Some(rx) => {
                let worker = NotificationWorker::new(self.confirmation_sender()?);
                let token = tasks.shutdown_token();
                tasks.spawn("notification_worker", TaskKind::Worker, async move {
                    worker.run(rx, token).await;
                });
            }
            None => tracing::warn!("Notification worker already started"),
        }

        let locks = self.locks.clone();
        tasks.spawn_periodic("slot_lock_prune", LOCK_PRUNE_INTERVAL, move || {
            let pruned = locks.prune_idle();
            if pruned > 0 {
                tracing::debug!(pruned, remaining = locks.len(), "Pruned idle slot locks");
            }
        });

        tasks.log_summary();
        Ok(tasks)
    }
}
