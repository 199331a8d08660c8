//! Telegram bot credentials.

use std::fmt;

use super::ConfigError;

/// Environment variable holding the bot token
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the destination chat id
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Bot token and destination chat, loaded once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    bot_token: String,
    chat_id: String,
}

impl TelegramCredentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Read both credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read both credentials through `lookup`; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };

        let bot_token = require(BOT_TOKEN_ENV)?;
        let chat_id = require(CHAT_ID_ENV)?;
        Ok(Self::new(bot_token, chat_id))
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
