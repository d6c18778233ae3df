//! contact-guard relay server.
//!
//! ```text
//!   browser form ──▶ guard (client half) ──POST──▶ ┌──────────────────────────┐
//!                                                  │  relay                   │
//!                                                  │  validator → formatter   │──▶ messaging API
//!                                                  │  → transport             │
//!                                                  └──────────────────────────┘
//! ```
//!
//! Configuration is read from the TOML file named by `CONTACT_GUARD_CONFIG`
//! (defaults when unset); secrets come from `TELEGRAM_BOT_TOKEN` and
//! `TELEGRAM_CHAT_ID`.

use contact_guard::config::loader::load_from_env;
use contact_guard::lifecycle;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    lifecycle::run(config).await?;
    Ok(())
}
