//! Resend HTTP API sender
//!
//! `POST {api_url}/emails` with a bearer API key.

use super::{ConfirmationRequest, ConfirmationSender, NotifyError};
use crate::booking::DisplayLocale;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
    text: String,
}

#[derive(Debug, Clone)]
pub struct ResendSender {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    locale: DisplayLocale,
}

impl ResendSender {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        locale: DisplayLocale,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from: from.into(),
            locale,
        })
    }
}

#[async_trait]
impl ConfirmationSender for ResendSender {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, request: &ConfirmationRequest) -> Result<(), NotifyError> {
        let body = SendEmail {
            from: &self.from,
            to: [&request.to_email],
            subject: request.subject(self.locale),
            html: request.html_body(self.locale),
            text: request.text_body(self.locale),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
