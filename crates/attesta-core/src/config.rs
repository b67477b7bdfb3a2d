//! Attesta configuration system.
//!
//! TOML file with per-field serde defaults, so a minimal config only
//! needs `database_url`, the bot token, and the auth secrets.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestaConfig {
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

impl Default for AttestaConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            gateway: GatewayConfig::default(),
            auth: AuthConfig::default(),
            bot: BotConfig::default(),
            reminders: ReminderConfig::default(),
        }
    }
}

impl AttestaConfig {
    /// Load config from a TOML file, then apply environment overrides
    /// (`DATABASE_URL`, `BOT_TOKEN`).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            self.bot.token = token;
        }
    }
}

/// HTTP gateway bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Token signing and role registration secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret")]
    pub secret_key: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    #[serde(default)]
    pub admin_key: String,
    #[serde(default)]
    pub curator_key: String,
}

fn default_secret() -> String {
    "attesta-dev-secret".into()
}
fn default_token_ttl() -> i64 {
    1440
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret(),
            token_ttl_minutes: default_token_ttl(),
            admin_key: String::new(),
            curator_key: String::new(),
        }
    }
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Idle registration conversations older than this are dropped.
    #[serde(default = "default_conversation_ttl")]
    pub conversation_ttl_minutes: u64,
}

fn default_poll_interval() -> u64 {
    1
}
fn default_conversation_ttl() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            poll_interval: default_poll_interval(),
            conversation_ttl_minutes: default_conversation_ttl(),
        }
    }
}

/// Reminder scan schedule and delivery pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// 5-field cron expression for the daily scan, local time.
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Day offsets that trigger a reminder.
    #[serde(default = "default_offsets")]
    pub offsets_days: Vec<i64>,
    /// Pause between consecutive outbound messages.
    #[serde(default = "default_send_delay")]
    pub send_delay_secs: u64,
}

fn default_cron() -> String {
    "0 9 * * *".into()
}
fn default_offsets() -> Vec<i64> {
    vec![1, 3]
}
fn default_send_delay() -> u64 {
    10
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            offsets_days: default_offsets(),
            send_delay_secs: default_send_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: AttestaConfig = toml::from_str("database_url = \"postgres://x\"").unwrap();
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.reminders.offsets_days, vec![1, 3]);
        assert_eq!(config.reminders.cron, "0 9 * * *");
        assert_eq!(config.reminders.send_delay_secs, 10);
    }

    #[test]
    fn explicit_values_win() {
        let toml = r#"
            database_url = "postgres://x"
            [reminders]
            cron = "30 7 * * *"
            offsets_days = [1, 2, 7]
        "#;
        let config: AttestaConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.reminders.cron, "30 7 * * *");
        assert_eq!(config.reminders.offsets_days, vec![1, 2, 7]);
    }
}
