//! 通知后台 Worker
//!
//! 从 mpsc 通道消费 ConfirmationRequest，通过 ConfirmationSender 发送。
//! 通道关闭或收到 shutdown 信号时退出。

use super::{ConfirmationRequest, ConfirmationSender};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct NotificationWorker {
    sender: Arc<dyn ConfirmationSender>,
}

impl NotificationWorker {
    pub fn new(sender: Arc<dyn ConfirmationSender>) -> Self {
        Self { sender }
    }

    /// 运行 worker（阻塞直到通道关闭或 shutdown）
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<ConfirmationRequest>,
        shutdown: CancellationToken,
    ) {
        tracing::info!(sender = self.sender.name(), "📧 Notification worker started");

        loop {
            let request = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification worker received shutdown signal");
                    break;
                }
                request = rx.recv() => match request {
                    Some(request) => request,
                    None => {
                        tracing::info!("Notification channel closed, worker stopping");
                        break;
                    }
                },
            };
            self.deliver(&request).await;
        }
    }

    async fn deliver(&self, request: &ConfirmationRequest) {
        match self.sender.send(request).await {
            Ok(()) => {
                tracing::info!(
                    reservation_id = request.reservation_id,
                    to = %request.to_email,
                    "Reservation confirmation sent"
                );
            }
            Err(e) => {
                tracing::error!(
                    reservation_id = request.reservation_id,
                    error = %e,
                    "Failed to send reservation confirmation"
                );
            }
        }
    }
}
