//! Application configuration: environment variables, `.env`, and `config.toml`.

/// Database configuration and connection management
pub mod database;

/// Mechanic roster and service catalog from config.toml
pub mod shop;

use crate::errors::Result;
use tracing::info;

pub use shop::ShopConfig;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Settings loaded once at startup and shared with the bot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shop catalog (mechanics, services, name)
    pub shop: ShopConfig,
}

/// Loads the application configuration.
///
/// The config file path comes from `GARAGE_BUDDY_CONFIG`, defaulting to `./config.toml`.
/// Secrets such as the bot token are read where they are used, not stored here.
///
/// # Errors
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path =
        std::env::var("GARAGE_BUDDY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let shop = shop::load_shop_config(&path)?;
    info!(
        "Loaded shop '{}' with {} mechanics and {} services",
        shop.name,
        shop.mechanics.len(),
        shop.services.len()
    );
    Ok(AppConfig { shop })
}
