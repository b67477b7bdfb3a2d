//! Telegram Bot channel — long polling + message sending via Bot API.

use async_trait::async_trait;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

use attesta_core::{Error, LinkButton, Result, Transport};

/// Telegram Bot API client. Clones share the HTTP client; only the
/// polling instance advances the update offset.
#[derive(Clone)]
pub struct TelegramChannel {
    token: String,
    poll_interval: u64,
    client: reqwest::Client,
    last_update_id: i64,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>, poll_interval: u64) -> Self {
        Self {
            token: token.into(),
            poll_interval,
            client: reqwest::Client::new(),
            last_update_id: 0,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    /// Get updates using long polling.
    pub async fn get_updates(&mut self) -> Result<Vec<TelegramUpdate>> {
        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&[
                ("offset", (self.last_update_id + 1).to_string()),
                ("timeout", "30".into()),
                ("allowed_updates", "[\"message\",\"callback_query\"]".into()),
            ])
            .send()
            .await
            .map_err(|e| Error::Telegram(format!("getUpdates failed: {e}")))?;

        let body: TelegramApiResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| Error::Telegram(format!("invalid getUpdates response: {e}")))?;

        if !body.ok {
            return Err(Error::Telegram(format!(
                "getUpdates error: {}",
                body.description.unwrap_or_default()
            )));
        }

        let updates = body.result.unwrap_or_default();
        if let Some(last) = updates.last() {
            self.last_update_id = last.update_id;
        }
        Ok(updates)
    }

    /// Send an HTML-formatted text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call_send(serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        }))
        .await
    }

    /// Send a message with an inline keyboard attached.
    pub async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<()> {
        self.call_send(serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "reply_markup": { "inline_keyboard": &keyboard.rows },
        }))
        .await
    }

    async fn call_send(&self, body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Telegram(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::Telegram(format!("invalid send response: {e}")))?;

        if !result.ok {
            let description = result.description.unwrap_or_default();
            // 4xx means this particular chat rejected the message (blocked
            // bot, unknown chat id) — skippable without retry.
            return match result.error_code {
                Some(code) if (400..500).contains(&code) => Err(Error::Recipient(description)),
                _ => Err(Error::Telegram(format!("send failed: {description}"))),
            };
        }
        Ok(())
    }

    /// Acknowledge a callback query so the client stops the spinner.
    pub async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        let _ = self
            .client
            .post(self.api_url("answerCallbackQuery"))
            .json(&serde_json::json!({ "callback_query_id": callback_id }))
            .send()
            .await;
        Ok(())
    }

    /// Get bot info; used as a startup connectivity check.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| Error::Telegram(format!("getMe failed: {e}")))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| Error::Telegram(format!("invalid getMe response: {e}")))?;
        body.result
            .ok_or_else(|| Error::Telegram("no bot info".into()))
    }

    /// Start the polling loop — returns a stream of raw updates.
    pub fn start_polling(self) -> TelegramUpdateStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut channel = self;
            tracing::info!("telegram polling loop started");

            loop {
                match channel.get_updates().await {
                    Ok(updates) => {
                        for update in updates {
                            if tx.send(update).is_err() {
                                tracing::info!("telegram polling stopped (receiver dropped)");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("telegram polling error: {e}");
                        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(channel.poll_interval)).await;
            }
        });

        TelegramUpdateStream { rx }
    }
}

/// Stream of incoming Telegram updates from polling.
pub struct TelegramUpdateStream {
    rx: tokio::sync::mpsc::UnboundedReceiver<TelegramUpdate>,
}

impl Stream for TelegramUpdateStream {
    type Item = TelegramUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Unpin for TelegramUpdateStream {}

#[async_trait]
impl Transport for TelegramChannel {
    async fn send(&self, chat_id: i64, text: &str, button: Option<&LinkButton>) -> Result<()> {
        match button {
            Some(button) => {
                let keyboard =
                    InlineKeyboard::single(InlineButton::url(&button.label, &button.url));
                self.send_with_keyboard(chat_id, text, &keyboard).await
            }
            None => self.send_message(chat_id, text).await,
        }
    }
}

/// Inline keyboard layout: rows of buttons.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn single(button: InlineButton) -> Self {
        Self {
            rows: vec![vec![button]],
        }
    }

    pub fn row(buttons: Vec<InlineButton>) -> Self {
        Self { rows: vec![buttons] }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineButton {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
        }
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
    pub callback_query: Option<TelegramCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramCallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    pub message: Option<TelegramMessage>,
    pub data: Option<String>,
}
