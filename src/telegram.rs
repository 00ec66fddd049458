//! Outbound delivery through the Telegram Bot API.

use crate::config::TelegramConfig;
use crate::error::DeliveryError;
use crate::types::{Destination, FormatHint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Anything that can post a text message to a chat destination.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
        hint: FormatHint,
    ) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramSender {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramSender {
    pub fn new(config: &TelegramConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DeliveryError::Transport)?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
        hint: FormatHint,
    ) -> Result<(), DeliveryError> {
        let body = SendMessageRequest {
            chat_id: &destination.chat_id,
            text,
            parse_mode: hint.parse_mode(),
        };

        // The request URL embeds the bot token, so strip it from every error.
        let resp = self
            .client
            .post(self.endpoint(&destination.bot_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let description = resp
                .json::<ApiReply>()
                .await
                .ok()
                .and_then(|r| r.description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                description,
            });
        }

        let reply: ApiReply = resp
            .json()
            .await
            .map_err(|e| DeliveryError::Decode(e.without_url()))?;
        if !reply.ok {
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                description: reply.description.unwrap_or_else(|| "request not ok".into()),
            });
        }

        tracing::debug!(chat_id = %destination.chat_id, "telegram message sent");
        Ok(())
    }
}
