use dotenvy::dotenv;
use garage_buddy::{
    bot::{self, BotData},
    config,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the shop catalog
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Run the bot. The token is read here, directly before use, and never stored.
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(&token, BotData::new(db, app_config.shop)).await
}
