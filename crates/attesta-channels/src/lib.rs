//! # Attesta Channels
//!
//! Outbound/inbound messaging transports. Telegram is the only channel;
//! it implements `attesta_core::Transport` for the notification pipeline
//! and exposes a long-polling update stream for the bot dispatcher.

pub mod telegram;

pub use telegram::{
    InlineButton, InlineKeyboard, TelegramChannel, TelegramUpdate, TelegramUpdateStream,
};
