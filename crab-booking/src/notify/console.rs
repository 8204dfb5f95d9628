//! Console sender for development: prints the email instead of sending it.

use super::{ConfirmationRequest, ConfirmationSender, NotifyError};
use crate::booking::DisplayLocale;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct ConsoleSender {
    locale: DisplayLocale,
}

impl ConsoleSender {
    pub fn new(locale: DisplayLocale) -> Self {
        Self { locale }
    }
}

#[async_trait]
impl ConfirmationSender for ConsoleSender {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, request: &ConfirmationRequest) -> Result<(), NotifyError> {
        tracing::info!(
            to = %request.to_email,
            reservation_id = request.reservation_id,
            "📧 Reservation confirmation (console mode)"
        );
        println!("\n==================== RESERVATION CONFIRMATION ====================");
        println!("To: {}", request.to_email);
        println!("Subject: {}", request.subject(self.locale));
        println!("------------------------------------------------------------------");
        println!("{}", request.text_body(self.locale));
        println!("==================================================================\n");
        Ok(())
    }
}
