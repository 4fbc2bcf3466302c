//! Chat notification delivery
//!
//! [`TelegramBot`] posts plain-text messages to one chat through the Bot API.
//! [`send_message`] wraps any [`Notifier`] with outcome logging and the
//! configured [`DeliveryPolicy`].

use crate::config::{Config, DeliveryPolicy};
use crate::error::{DeliveryError, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Something that can put a line of text in front of the student
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured chat
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Telegram Bot API client bound to a single chat
pub struct TelegramBot {
    http_client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramBot {
    /// Create a bot from the loaded configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {e}"),
            key: None,
        })?;

        Ok(Self {
            http_client,
            api_base: config.telegram_api_base.clone(),
            token: config.credentials.telegram_token.clone(),
            chat_id: config.credentials.telegram_chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn notify(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable {
                // reqwest includes the URL, which contains the bot token
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        // The Bot API answers errors with a JSON body too; fall back to the
        // status line if it does not.
        let body = response.json::<BotApiResponse>().await.ok();

        match body {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiResponse { description, .. }) => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }
            .into()),
            None => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: status
                    .canonical_reason()
                    .unwrap_or("unreadable response")
                    .to_string(),
            }
            .into()),
        }
    }
}

/// Send `text` through `notifier`, logging the outcome
///
/// With [`DeliveryPolicy::Swallow`] a failed send is logged and `Ok(())` is
/// returned; with [`DeliveryPolicy::Propagate`] the failure is logged and
/// returned to the caller.
pub async fn send_message(
    notifier: &dyn Notifier,
    text: &str,
    policy: DeliveryPolicy,
) -> Result<()> {
    match notifier.notify(text).await {
        Ok(()) => {
            info!(message = text, "notification sent");
            Ok(())
        }
        Err(e) => {
            error!(message = text, error = %e, "notification not sent");
            match policy {
                DeliveryPolicy::Swallow => Ok(()),
                DeliveryPolicy::Propagate => Err(e),
            }
        }
    }
}
