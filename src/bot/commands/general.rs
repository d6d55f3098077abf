//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} - GarageBuddy Help**\n\
            Orders are referenced by their number (OS #).\n\n\
            **Service Orders**\n\
            • `/order open <customer_id> <vehicle_id> <service> ...` - Opens a new order.\n\
            • `/order list [status] [search]` - Lists orders, optionally filtered.\n\
            • `/order info <number>` - Shows an order with its parts and history.\n\
            • `/order status <number> <status> [note]` - Moves an order to any status.\n\
            • `/order finalize <number> <total> [part1 qty1 ...] [notes]` - Closes and bills an order.\n\
            • `/order delete <number>` - Deletes an order.\n\n\
            **Records**\n\
            • `/customer add|list|search|update|delete`\n\
            • `/vehicle add|list|update|delete`\n\
            • `/part add|list|low_stock|restock|update|delete`\n\n\
            **Reports**\n\
            • `/dashboard` - Shop overview.\n\
            • `/revenue [period] [start] [end]` - Revenue of finalized orders.\n\n\
            **Utility**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.",
            ctx.data().shop.name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
