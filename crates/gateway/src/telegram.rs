//! Thin Telegram Bot API client.
//!
//! Long-polls `getUpdates` and renders outbound instructions through
//! `sendMessage`/`forwardMessage`.  Only the handful of payload fields
//! the engine needs are deserialized.

use std::time::Duration;

use serde::Deserialize;

use tb_domain::config::TelegramConfig;
use tb_domain::error::{Error, Result};

use crate::engine::Inbound;
use crate::outbound::ChatTransport;

const API_URL: &str = "https://api.telegram.org";

pub struct TelegramTransport {
    base: String,
    poll_timeout_s: u64,
    client: reqwest::Client,
}

impl TelegramTransport {
    /// Build a client for `token`.  The HTTP timeout leaves headroom
    /// over the long-poll timeout so idle polls don't error out.
    pub fn new(token: &str, cfg: &TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.poll_timeout_s + 10))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            base: format!("{API_URL}/bot{token}"),
            poll_timeout_s: cfg.poll_timeout_s,
            client,
        })
    }

    /// Fetch the next batch of updates after `offset`.  Returns the new
    /// offset and the text messages found.
    pub async fn poll(&self, offset: i64) -> Result<(i64, Vec<Inbound>)> {
        let url = format!("{}/getUpdates", self.base);
        let resp: ApiResponse<Vec<Update>> = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("timeout", self.poll_timeout_s as i64)])
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let updates = api_result(resp)?;

        let mut next_offset = offset;
        let mut messages = Vec::new();
        for update in updates {
            next_offset = next_offset.max(update.update_id + 1);
            let Some(message) = update.message else { continue };
            let (Some(from), Some(text)) = (message.from, message.text) else {
                continue;
            };
            messages.push(Inbound {
                user_id: from.id,
                chat: message.chat.id,
                message_id: message.message_id,
                text,
            });
        }

        Ok((next_offset, messages))
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<()> {
        let url = format!("{}/{method}", self.base);
        let resp: ApiResponse<serde_json::Value> = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        api_result(resp).map(|_| ())
    }
}

#[async_trait::async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat: i64, text: &str) -> Result<()> {
        self.call(
            "sendMessage",
            serde_json::json!({ "chat_id": chat, "text": text }),
        )
        .await
    }

    async fn send_text_with_link(&self, chat: i64, text: &str, url: &str) -> Result<()> {
        // Telegram links the URL automatically when it is on its own line.
        self.call(
            "sendMessage",
            serde_json::json!({ "chat_id": chat, "text": format!("{text}\n{url}") }),
        )
        .await
    }

    async fn forward(&self, from_chat: i64, to_chat: i64, message_id: i64) -> Result<()> {
        self.call(
            "forwardMessage",
            serde_json::json!({
                "chat_id": to_chat,
                "from_chat_id": from_chat,
                "message_id": message_id,
            }),
        )
        .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

fn api_result<T>(resp: ApiResponse<T>) -> Result<T> {
    if !resp.ok {
        return Err(Error::Transport(
            resp.description.unwrap_or_else(|| "telegram error".into()),
        ));
    }
    resp.result
        .ok_or_else(|| Error::Transport("telegram response missing result".into()))
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    from: Option<User>,
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_parses() {
        let raw = serde_json::json!({
            "ok": true,
            "result": [
                {
                    "update_id": 7,
                    "message": {
                        "message_id": 3,
                        "from": { "id": 42, "is_bot": false },
                        "chat": { "id": 42, "type": "private" },
                        "text": "/start"
                    }
                },
                { "update_id": 8 }
            ]
        });
        let resp: ApiResponse<Vec<Update>> = serde_json::from_value(raw).unwrap();
        let updates = api_result(resp).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].update_id, 7);
        let msg = updates[0].message.as_ref().unwrap();
        assert_eq!(msg.text.as_deref(), Some("/start"));
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn api_error_surfaces_description() {
        let resp: ApiResponse<Vec<Update>> = serde_json::from_value(serde_json::json!({
            "ok": false,
            "description": "Unauthorized"
        }))
        .unwrap();
        let err = api_result(resp).unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }
}
