//! Bot dispatcher — feeds polling updates into the registration flow
//! and renders its replies back through the channel.

use std::time::Duration;

use futures::StreamExt;

use attesta_channels::{InlineButton, InlineKeyboard, TelegramChannel, TelegramUpdateStream};
use attesta_db::Store;

use crate::registration::{Registration, Reply};

pub struct BotDispatcher {
    channel: TelegramChannel,
    registration: Registration<Store>,
}

impl BotDispatcher {
    pub fn new(channel: TelegramChannel, store: Store, conversation_ttl: Duration) -> Self {
        Self {
            channel,
            registration: Registration::new(store, conversation_ttl),
        }
    }

    /// Consume the update stream until it closes. Per-update failures are
    /// logged and never crash the loop.
    pub async fn run(mut self, mut updates: TelegramUpdateStream) {
        tracing::info!("bot dispatcher started");
        while let Some(update) = updates.next().await {
            self.registration.evict_stale();

            if let Some(cb) = update.callback_query {
                let _ = self.channel.answer_callback(&cb.id).await;
                let chat_id = cb.message.as_ref().map(|m| m.chat.id).unwrap_or(cb.from.id);
                if let Some(data) = cb.data.as_deref() {
                    if let Some(reply) = self.registration.on_callback(chat_id, data).await {
                        self.deliver(chat_id, reply).await;
                    }
                }
                continue;
            }

            let Some(msg) = update.message else { continue };
            if msg.from.as_ref().is_some_and(|u| u.is_bot) {
                continue;
            }
            let Some(text) = msg.text.as_deref() else { continue };
            let chat_id = msg.chat.id;
            let text = text.trim();

            let reply = if text.starts_with("/start") {
                let first_name = msg
                    .from
                    .as_ref()
                    .map(|u| u.first_name.as_str())
                    .unwrap_or("");
                Some(self.registration.start(chat_id, first_name).await)
            } else {
                self.registration.on_message(chat_id, text).await
            };

            if let Some(reply) = reply {
                self.deliver(chat_id, reply).await;
            }
        }
        tracing::info!("bot dispatcher stopped (stream closed)");
    }

    async fn deliver(&self, chat_id: i64, reply: Reply) {
        let result = match reply {
            Reply::Text(text) => self.channel.send_message(chat_id, &text).await,
            Reply::RoleKeyboard(text) => {
                let keyboard = InlineKeyboard::row(vec![
                    InlineButton::callback("🎓 Студент", "role_student"),
                    InlineButton::callback("👨‍🏫 Куратор", "role_curator"),
                ]);
                self.channel.send_with_keyboard(chat_id, &text, &keyboard).await
            }
        };
        if let Err(e) = result {
            tracing::warn!(chat_id, "bot reply failed: {e}");
        }
    }
}
