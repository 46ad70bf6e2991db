//! Bot settings
//!
//! Loads the settings and prints them.

use anyhow::Context;
use tracing::info;

use bot_settings::{get_settings, utils::logging};

fn main() -> anyhow::Result<()> {
    logging::init_logging("warn");
    info!("Starting {}", bot_settings::info());

    let settings = get_settings().context("failed to load settings")?;

    println!("settings:\n{}", settings.to_pretty_json()?);
    println!("tgbot.token: {}", settings.tgbot.token());
    println!("db.url: {}", settings.db.url()?);

    Ok(())
}
