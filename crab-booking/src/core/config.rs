use crate::auth::JwtConfig;
use crate::booking::DisplayLocale;
use crate::booking::projector::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::core::Result;
use shared::models::RestaurantConfigUpdate;
use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/crab/booking | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | AVAILABILITY_DAYS | 7 | 可用座位默认查询天数 |
/// | ALLOW_PAST_DATES | false | 是否允许预订过去日期 |
/// | DISPLAY_LOCALE | fr | 星期/日期显示语言 (fr, en) |
/// | DEFAULT_CAPACITY | (无) | 首次启动时写入的餐厅容量 |
/// | RESTAURANT_NAME | (无) | 首次启动时写入的餐厅名称 |
/// | RESTAURANT_PHONE | (无) | 首次启动时写入的电话 |
/// | RESTAURANT_ADDRESS | (无) | 首次启动时写入的地址 |
/// | RESEND_API_KEY | (无) | 设置后通过 Resend 发送确认邮件 (兼容旧名 RESEND_API) |
/// | RESEND_API_URL | https://api.resend.com | Resend API 地址 |
/// | FROM_EMAIL | Restaurant App <onboarding@resend.dev> | 确认邮件发件人 |
/// | NOTIFY_QUEUE_SIZE | 256 | 通知队列容量 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。日志变量 (`LOG_LEVEL`, `LOG_DIR`,
/// `LOG_JSON`) 在加载配置之前由 [`setup_environment`](crate::setup_environment) 读取。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/crab HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 预订 ===
    /// `GET /api/availability` 未指定 days 时的窗口长度
    pub availability_days: u32,
    pub allow_past_dates: bool,
    pub display_locale: DisplayLocale,
    /// 首次启动写入的餐厅配置 (已有配置时忽略)
    pub restaurant_seed: RestaurantConfigUpdate,

    // === 通知 ===
    pub resend_api_key: Option<String>,
    pub resend_api_url: Option<String>,
    pub from_email: Option<String>,
    pub notify_queue_size: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/crab/booking".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::from_env()?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            availability_days: std::env::var("AVAILABILITY_DAYS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .map(|d| d.clamp(1, MAX_WINDOW_DAYS))
                .unwrap_or(DEFAULT_WINDOW_DAYS),
            allow_past_dates: std::env::var("ALLOW_PAST_DATES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            display_locale: std::env::var("DISPLAY_LOCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            restaurant_seed: RestaurantConfigUpdate {
                total_capacity: std::env::var("DEFAULT_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                restaurant_name: non_empty_var("RESTAURANT_NAME"),
                phone: non_empty_var("RESTAURANT_PHONE"),
                address: non_empty_var("RESTAURANT_ADDRESS"),
                ..Default::default()
            },

            resend_api_key: non_empty_var("RESEND_API_KEY").or_else(|| non_empty_var("RESEND_API")),
            resend_api_url: non_empty_var("RESEND_API_URL"),
            from_email: non_empty_var("FROM_EMAIL"),
            notify_queue_size: std::env::var("NOTIFY_QUEUE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(256),
        })
    }

    /// 测试用配置：固定 JWT 密钥，不读取环境变量
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            jwt: JwtConfig::with_secret("test-secret-that-is-long-enough-for-hs256"),
            environment: "test".into(),
            availability_days: DEFAULT_WINDOW_DAYS,
            allow_past_dates: false,
            display_locale: DisplayLocale::Fr,
            restaurant_seed: RestaurantConfigUpdate::default(),
            resend_api_key: None,
            resend_api_url: None,
            from_email: None,
            notify_queue_size: 16,
        }
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
            .join("database")
            .join("booking.redb")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
