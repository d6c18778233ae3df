//! Trusted relay credentials.
//!
//! # Security
//! - Loaded ONLY from environment variables, once per process
//! - Never logged, serialized or echoed to a client
//! - Which variable is missing is reported to the operator log only

use std::fmt;

use thiserror::Error;

/// Environment variable holding the bot credential.
pub const BOT_TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable holding the destination channel id.
pub const CHANNEL_ID_ENV_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretsError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

/// Credential and destination for the external messaging API.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    bot_credential: String,
    destination_channel_id: String,
}

impl RelayConfig {
    pub fn new(bot_credential: impl Into<String>, destination_channel_id: impl Into<String>) -> Self {
        Self {
            bot_credential: bot_credential.into(),
            destination_channel_id: destination_channel_id.into(),
        }
    }

    /// Read both secrets from the environment.
    pub fn from_env() -> Result<Self, SecretsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both secrets through `lookup`; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(SecretsError::Missing(name))
        };
        Ok(Self::new(read(BOT_TOKEN_ENV_VAR)?, read(CHANNEL_ID_ENV_VAR)?))
    }

    pub(crate) fn bot_credential(&self) -> &str {
        &self.bot_credential
    }

    pub fn destination_channel_id(&self) -> &str {
        &self.destination_channel_id
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_credential", &"<redacted>")
            .field("destination_channel_id", &"<redacted>")
            .finish()
    }
}
