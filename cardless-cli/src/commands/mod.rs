//! CLI command implementations

pub mod accounts;
pub mod institutions;
pub mod requisitions;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use cardless_core::{CardlessClient, Config};

/// Connect using the `CARDLESS_*` environment variables
pub fn get_client() -> Result<CardlessClient> {
    let config = Config::from_env()?;
    debug!(base_url = %config.base_url, "Connecting");
    Ok(CardlessClient::connect(&config)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
