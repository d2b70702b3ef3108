use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::LineConfig;
use crate::errors::{ShopcrabError, ShopcrabResult};
use crate::line::flex::ReplyMessage;
use crate::utils::http::{ERROR_BODY_LIMIT, limited_text};

/// The reply API accepts at most five messages per reply token.
pub const MAX_REPLY_MESSAGES: usize = 5;

/// Delivers a reply addressed by a single-use reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, messages: &[ReplyMessage])
    -> ShopcrabResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [ReplyMessage],
}

pub struct LineClient {
    client: Client,
    channel_token: String,
    api_base: String,
}

impl LineClient {
    pub fn new(config: &LineConfig, client: Client) -> Self {
        Self {
            client,
            channel_token: config.channel_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.api_base)
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn send_reply(
        &self,
        reply_token: &str,
        messages: &[ReplyMessage],
    ) -> ShopcrabResult<()> {
        if messages.is_empty() || messages.len() > MAX_REPLY_MESSAGES {
            return Err(ShopcrabError::Delivery {
                status: 0,
                message: format!(
                    "reply must carry 1..={} messages, got {}",
                    MAX_REPLY_MESSAGES,
                    messages.len()
                ),
            });
        }

        let resp = self
            .client
            .post(self.reply_url())
            .bearer_auth(&self.channel_token)
            .json(&ReplyRequest {
                reply_token,
                messages,
            })
            .send()
            .await
            .map_err(|e| ShopcrabError::Delivery {
                status: 0,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = limited_text(resp, ERROR_BODY_LIMIT)
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ShopcrabError::Delivery {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        debug!("line reply delivered: messages={}", messages.len());
        Ok(())
    }
}

/// Pull `message` (and any `details`) out of an error body, falling back to
/// the raw text.
fn api_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    let Some(message) = json["message"].as_str() else {
        return body.to_string();
    };
    let details: Vec<String> = json["details"]
        .as_array()
        .map(|d| {
            d.iter()
                .filter_map(|item| {
                    let msg = item["message"].as_str()?;
                    Some(match item["property"].as_str() {
                        Some(prop) => format!("{}: {}", prop, msg),
                        None => msg.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    if details.is_empty() {
        message.to_string()
    } else {
        format!("{} ({})", message, details.join("; "))
    }
}
