//! 预订确认通知
//!
//! 准入成功后，控制器把 [`ConfirmationRequest`] 放入有界 mpsc 通道，
//! 由 [`NotificationWorker`] 在后台发送。发送失败只记录日志，
//! 不影响已经提交的预订。
//!
//! # 发送方式
//!
//! - [`ResendSender`] - Resend HTTP API (配置了 `RESEND_API_KEY` 时)
//! - [`ConsoleSender`] - 打印到控制台 (开发环境)

mod console;
mod resend;
mod worker;

pub use console::ConsoleSender;
pub use resend::{DEFAULT_RESEND_API_URL, ResendSender};
pub use worker::NotificationWorker;

use crate::booking::DisplayLocale;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tokio::sync::mpsc;

/// Everything needed to render one confirmation email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub to_email: String,
    pub first_name: String,
    pub last_name: String,
    pub restaurant_name: String,
    pub reservation_id: i64,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub number_of_guests: u32,
}

impl ConfirmationRequest {
    pub fn subject(&self, locale: DisplayLocale) -> String {
        match locale {
            DisplayLocale::Fr => format!("Confirmation de votre réservation - {}", self.restaurant_name),
            DisplayLocale::En => format!("Your reservation is confirmed - {}", self.restaurant_name),
        }
    }

    /// Plain-text body
    pub fn text_body(&self, locale: DisplayLocale) -> String {
        let date = locale.long_date(self.reservation_date);
        let time = self.start_time.format("%H:%M");
        match locale {
            DisplayLocale::Fr => format!(
                "Bonjour {} {},\n\n\
                 Votre réservation n°{} est confirmée.\n\
                 Date : {}\n\
                 Heure : {}\n\
                 Nombre de personnes : {}\n\n\
                 À bientôt chez {} !",
                self.first_name,
                self.last_name,
                self.reservation_id,
                date,
                time,
                self.number_of_guests,
                self.restaurant_name
            ),
            DisplayLocale::En => format!(
                "Hello {} {},\n\n\
                 Your reservation #{} is confirmed.\n\
                 Date: {}\n\
                 Time: {}\n\
                 Guests: {}\n\n\
                 See you soon at {}!",
                self.first_name,
                self.last_name,
                self.reservation_id,
                date,
                time,
                self.number_of_guests,
                self.restaurant_name
            ),
        }
    }

    /// HTML body (the text body wrapped in paragraphs)
    pub fn html_body(&self, locale: DisplayLocale) -> String {
        let paragraphs: String = self
            .text_body(locale)
            .split("\n\n")
            .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
            .collect();
        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">{paragraphs}</div>"
        )
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivery backend for confirmation emails
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, request: &ConfirmationRequest) -> Result<(), NotifyError>;
}

/// Producer side of the confirmation queue
#[derive(Debug, Clone)]
pub struct NotifyHandle {
    tx: mpsc::Sender<ConfirmationRequest>,
}

impl NotifyHandle {
    /// Create a bounded queue
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ConfirmationRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Fire-and-forget enqueue; returns whether the request was accepted
    pub fn enqueue(&self, request: ConfirmationRequest) -> bool {
        let reservation_id = request.reservation_id;
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(reservation_id, "Notification queue full, confirmation dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(reservation_id, "Notification worker stopped, confirmation dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ConfirmationRequest {
        ConfirmationRequest {
            to_email: "lea@example.com".into(),
            first_name: "Léa".into(),
            last_name: "Martin".into(),
            restaurant_name: "Le <Crabe>".into(),
            reservation_id: 42,
            reservation_date: NaiveDate::from_ymd_opt(2030, 1, 13).unwrap(),
            start_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            number_of_guests: 4,
        }
    }

    #[test]
    fn test_french_body() {
        let body = request().text_body(DisplayLocale::Fr);
        assert!(body.contains("Votre réservation n°42 est confirmée."));
        assert!(body.contains("dimanche 13 janvier 2030"));
        assert!(body.contains("Heure : 19:30"));
        assert!(body.contains("Nombre de personnes : 4"));
    }

    #[test]
    fn test_html_is_escaped() {
        let html = request().html_body(DisplayLocale::En);
        assert!(html.contains("Le &lt;Crabe&gt;"));
        assert!(!html.contains("<Crabe>"));
    }

    #[tokio::test]
    async fn test_enqueue_full_queue_drops() {
        let (handle, mut rx) = NotifyHandle::channel(1);
        assert!(handle.enqueue(request()));
        assert!(!handle.enqueue(request()));

        assert_eq!(rx.recv().await.unwrap().reservation_id, 42);
        drop(rx);
        assert!(!handle.enqueue(request()));
    }
}
