//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `GarageBuddy` application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (customers, vehicles, parts, orders, revenue)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::ShopConfig,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the shop catalog.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Mechanic roster and service catalog
    pub shop: ShopConfig,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, shop: ShopConfig) -> Self {
        Self { database, shop }
    }
}

/// Replies with the error text when the error was caused by the user's input and
/// swallows it. Anything else is handed back to the framework's error handler.
pub(crate) async fn reply_user_error(
    ctx: poise::Context<'_, BotData, Error>,
    err: Error,
) -> Result<()> {
    if err.is_user_error() {
        ctx.say(format!("❌ {err}")).await?;
        Ok(())
    } else {
        Err(err)
    }
}

/// Parses a date typed as `2026-03-31` or `31/03/2026`.
pub(crate) fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .map_err(|_| Error::validation(format!("'{input}' is not a date (use YYYY-MM-DD)")))
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .say("❌ Something went wrong while talking to the database. Please try again.")
                .await
            {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::dashboard(),
        commands::customer(),
        commands::vehicle(),
        commands::part(),
        commands::order(),
        commands::revenue(),
    ]
}

/// Connects to Discord and serves commands until the client stops.
///
/// # Errors
/// Returns an error if the client cannot be built or the gateway connection fails.
#[instrument(skip(token, data))]
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
